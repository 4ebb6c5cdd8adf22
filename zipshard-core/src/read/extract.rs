use crate::error::{Result, ShardError};
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;
use zip::result::ZipError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// ZIP container, AES-encrypted or plain.
    Zip,
    Gzip,
    Bzip2,
}

impl ArchiveFormat {
    /// Chosen strictly by extension; anything else is refused.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "zip" => Ok(ArchiveFormat::Zip),
            "gz" => Ok(ArchiveFormat::Gzip),
            "bz2" => Ok(ArchiveFormat::Bzip2),
            _ => Err(ShardError::UnsupportedFormat(ext)),
        }
    }
}

/// Extracts `archive` into `dest` and returns the files written.
///
/// ZIP entries are decrypted with `password` when they are encrypted; a
/// rejected password surfaces as [`ShardError::WrongPassword`]. The
/// single-stream formats decompress into one file named after the archive
/// minus its suffix.
pub fn extract(archive: &Path, dest: &Path, password: Option<&str>) -> Result<Vec<PathBuf>> {
    let format = ArchiveFormat::from_path(archive)?;
    fs::create_dir_all(dest)?;
    tracing::info!(archive = %archive.display(), ?format, "extracting");
    match format {
        ArchiveFormat::Zip => extract_zip(archive, dest, password),
        ArchiveFormat::Gzip => {
            let f = BufReader::new(File::open(archive)?);
            decompress_stream(flate2::read::MultiGzDecoder::new(f), archive, dest)
        }
        ArchiveFormat::Bzip2 => {
            let f = BufReader::new(File::open(archive)?);
            decompress_stream(bzip2::read::MultiBzDecoder::new(f), archive, dest)
        }
    }
}

fn decrypt_error(e: ZipError) -> ShardError {
    match e {
        ZipError::InvalidPassword => ShardError::WrongPassword,
        ZipError::UnsupportedArchive(msg) if msg == ZipError::PASSWORD_REQUIRED => {
            ShardError::PasswordRequired
        }
        other => ShardError::Zip(other),
    }
}

fn extract_zip(archive: &Path, dest: &Path, password: Option<&str>) -> Result<Vec<PathBuf>> {
    let mut ar = ZipArchive::new(BufReader::new(File::open(archive)?))?;
    let mut written = Vec::with_capacity(ar.len());

    for i in 0..ar.len() {
        let encrypted = ar.by_index_raw(i)?.encrypted();
        let mut entry = match (encrypted, password) {
            (true, None) => return Err(ShardError::PasswordRequired),
            (true, Some(pw)) => ar.by_index_decrypt(i, pw.as_bytes()).map_err(decrypt_error)?,
            (false, _) => ar.by_index(i).map_err(decrypt_error)?,
        };

        let Some(rel) = entry.enclosed_name() else {
            tracing::warn!(name = %String::from_utf8_lossy(entry.name_raw()), "unsafe entry path; skipped");
            continue;
        };
        let outp = dest.join(rel);

        if entry.is_dir() {
            fs::create_dir_all(&outp)?;
            continue;
        }
        if let Some(parent) = outp.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&outp)?;
        io::copy(&mut entry, &mut out)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outp, fs::Permissions::from_mode(mode & 0o7777))?;
            }
        }
        written.push(outp);
    }
    Ok(written)
}

fn decompress_stream<R: Read>(mut dec: R, archive: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let stem = archive.file_stem().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("no file name: {}", archive.display()),
        )
    })?;
    let outp = dest.join(stem);
    let mut out = File::create(&outp)?;
    io::copy(&mut dec, &mut out)?;
    Ok(vec![outp])
}
