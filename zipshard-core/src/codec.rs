use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use time::{OffsetDateTime, PrimitiveDateTime};
use zip::write::FileOptions;
use zip::{AesMode, CompressionMethod, DateTime};

/// Entry codec used when files are first written; merge keeps it as-is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    Store,
    #[default]
    Deflate,
    Zstd,
}

impl Codec {
    pub fn method(self) -> CompressionMethod {
        match self {
            Codec::Store => CompressionMethod::Stored,
            Codec::Deflate => CompressionMethod::Deflated,
            Codec::Zstd => CompressionMethod::Zstd,
        }
    }

    fn level(self, level: i32) -> Option<i64> {
        match self {
            Codec::Store => None,
            Codec::Deflate => Some(i64::from(level.clamp(0, 9))),
            Codec::Zstd => Some(i64::from(level.clamp(1, 22))),
        }
    }
}

/// Entry options shared by chunk archives and the direct writer. Every
/// entry gets the same AES-256 password when one is supplied.
pub fn entry_options<'k>(
    codec: Codec,
    level: i32,
    password: Option<&'k str>,
    meta: Option<&Metadata>,
) -> FileOptions<'k, 'static, ()> {
    let mut opts = FileOptions::<'k, 'static, ()>::default()
        .compression_method(codec.method())
        .compression_level(codec.level(level));

    if let Some(md) = meta {
        opts = opts.large_file(md.len() >= u64::from(u32::MAX));
        if let Some(mode) = mode_from(md) {
            opts = opts.unix_permissions(mode);
        }
        if let Some(ts) = mtime_from(md) {
            opts = opts.last_modified_time(ts);
        }
    }

    match password {
        Some(pw) => opts.with_aes_encryption(AesMode::Aes256, pw),
        None => opts,
    }
}

fn mode_from(_md: &Metadata) -> Option<u32> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Some(_md.permissions().mode() & 0o7777)
    }
    #[cfg(not(unix))]
    {
        None
    }
}

fn mtime_from(md: &Metadata) -> Option<DateTime> {
    let modified = md.modified().ok()?;
    let at = OffsetDateTime::from(modified);
    DateTime::try_from(PrimitiveDateTime::new(at.date(), at.time())).ok()
}
