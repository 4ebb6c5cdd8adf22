use crate::domain::{Device, DeviceClass, FragmentRecord};
use crate::error::{Result, ShardError};
use crate::fragment::registry::FragmentLog;
use crate::options::SplitOptions;
use crate::storage::copy_to_device;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// `<stem>.partNNN`, 1-based and zero-padded to three digits.
pub fn part_name(archive: &Path, index: u32) -> Result<String> {
    let stem = archive
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("archive has no usable file name: {}", archive.display()),
            )
        })?;
    Ok(format!("{stem}.part{index:03}"))
}

/// Index encoded in a part file name, the inverse of [`part_name`]. Past 999
/// the padding no longer keeps names in numeric order, so callers sort on this.
pub fn part_index(name: &str) -> Option<u32> {
    let (_, digits) = name.rsplit_once(".part")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// One operator choice: put the next `bytes` of the archive on `device`.
/// `None` or `Some(0)` means everything that is left.
#[derive(Clone, Debug)]
pub struct Assignment {
    pub device: Device,
    pub bytes: Option<i64>,
}

#[derive(Copy, Clone, Debug)]
pub struct SplitProgress {
    pub total: u64,
    pub remaining: u64,
    pub part_index: u32,
}

/// Supplies assignments one at a time, typically by prompting an operator.
pub trait AssignmentSource {
    /// The next assignment, or `None` to stop fragmenting.
    fn next_assignment(&mut self, progress: &SplitProgress) -> Result<Option<Assignment>>;

    /// The assignment was refused; another one will be requested.
    fn rejected(&mut self, _assignment: &Assignment, _reason: &str) {}

    /// Copying to the device failed; another assignment will be requested
    /// for the same byte range.
    fn copy_failed(&mut self, _assignment: &Assignment, _error: &ShardError) {}

    fn copied(&mut self, _record: &FragmentRecord, _bytes: u64) {}
}

fn check(a: &Assignment, remaining: u64) -> std::result::Result<u64, &'static str> {
    if a.device.class() != DeviceClass::UsbLike {
        return Err("only FAT32/exFAT devices can hold fragments");
    }
    match a.bytes {
        None | Some(0) => Ok(remaining),
        Some(n) if n < 0 => Err("size must be positive"),
        Some(n) => Ok((n as u64).min(remaining)),
    }
}

fn cut_part(src: &mut File, offset: u64, len: u64, part: &Path) -> Result<()> {
    src.seek(SeekFrom::Start(offset))?;
    let mut out = File::create(part)?;
    let n = io::copy(&mut src.by_ref().take(len), &mut out)?;
    if n != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("archive ended after {n} of {len} bytes at offset {offset}"),
        )
        .into());
    }
    out.sync_all()?;
    Ok(())
}

/// Cuts `archive` into consecutive fragments, one per accepted assignment,
/// copies each to its device and records it in `log`.
///
/// A failed copy leaves the cursor and the registry untouched; the part
/// file stays in the staging directory until a retry overwrites it. The
/// run is not atomic: fragments registered before an interruption stay
/// registered.
pub fn split(
    archive: &Path,
    log: &mut dyn FragmentLog,
    source: &mut dyn AssignmentSource,
    opts: &SplitOptions,
) -> Result<Vec<FragmentRecord>> {
    let total = fs::metadata(archive)?.len();
    let filename = archive
        .file_name()
        .and_then(|s| s.to_str())
        .map(str::to_owned)
        .ok_or_else(|| ShardError::ArchiveNotFound(archive.to_path_buf()))?;
    let staging: PathBuf = match (&opts.staging_dir, archive.parent()) {
        (Some(dir), _) => dir.clone(),
        (None, Some(p)) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&staging)?;

    info!(archive = %archive.display(), total, "fragmenting archive");
    let mut src = File::open(archive)?;
    let mut cursor = 0u64;
    let mut part_index = 1u32;
    let mut records = Vec::new();

    while cursor < total {
        let progress = SplitProgress {
            total,
            remaining: total - cursor,
            part_index,
        };
        let Some(assignment) = source.next_assignment(&progress)? else {
            warn!(remaining = progress.remaining, "fragmentation stopped early");
            return Err(ShardError::SplitIncomplete {
                remaining: progress.remaining,
            });
        };
        let len = match check(&assignment, progress.remaining) {
            Ok(len) => len,
            Err(reason) => {
                debug!(device = %assignment.device, reason, "assignment rejected");
                source.rejected(&assignment, reason);
                continue;
            }
        };

        let part = staging.join(part_name(archive, part_index)?);
        cut_part(&mut src, cursor, len, &part)?;

        match copy_to_device(&part, &assignment.device) {
            Ok(dest) => {
                if let Err(e) = fs::remove_file(&part) {
                    warn!(part = %part.display(), error = %e, "could not delete local fragment");
                }
                let record = FragmentRecord {
                    filename: filename.clone(),
                    path: dest,
                };
                log.append(record.clone())?;
                info!(part = part_index, bytes = len, path = %record.path.display(), "fragment stored");
                source.copied(&record, len);
                records.push(record);
                cursor += len;
                part_index += 1;
            }
            Err(e) => {
                warn!(device = %assignment.device, error = %e, "fragment copy failed");
                source.copy_failed(&assignment, &e);
            }
        }
    }

    Ok(records)
}
