use crate::error::{Result, ShardError};
use crate::fragment::reassemble::reassemble;
use crate::fragment::registry::FragmentLog;
use crate::read::extract::extract;
use std::path::{Path, PathBuf};

/// Restores a backup from a local archive file.
pub fn restore_local(archive: &Path, dest: &Path, password: Option<&str>) -> Result<Vec<PathBuf>> {
    if !archive.exists() {
        return Err(ShardError::ArchiveNotFound(archive.to_path_buf()));
    }
    let files = extract(archive, dest, password)?;
    tracing::info!(dest = %dest.display(), files = files.len(), "restore completed");
    Ok(files)
}

/// Restores a fragmented backup: rebuilds the archive from the registry
/// into a work directory, extracts it, and discards the rebuilt copy.
pub fn restore_fragments(
    log: &dyn FragmentLog,
    filename: &str,
    dest: &Path,
    password: Option<&str>,
) -> Result<Vec<PathBuf>> {
    if log.fragments_for(filename).is_empty() {
        return Err(ShardError::FragmentsNotFound(filename.to_string()));
    }
    let work = tempfile::Builder::new()
        .prefix("zipshard_rebuild_")
        .tempdir()?;
    let rebuilt = reassemble(log, filename, work.path())?;
    let files = restore_local(&rebuilt, dest, password)?;
    work.close()?;
    Ok(files)
}
