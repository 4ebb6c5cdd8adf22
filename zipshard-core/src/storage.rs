use crate::domain::Device;
use crate::error::Result;
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};

/// Copies `file` to the root of `device`, keeping its file name. Returns
/// the destination path.
pub fn copy_to_device(file: &Path, device: &Device) -> Result<PathBuf> {
    let name = file.file_name().ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("not a file path: {}", file.display()),
        )
    })?;
    let target = device.mount_point().join(name);
    fs::copy(file, &target)?;
    tracing::debug!(from = %file.display(), to = %target.display(), "copied to device");
    Ok(target)
}
