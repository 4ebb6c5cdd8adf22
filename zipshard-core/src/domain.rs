// zipshard_core/src/domain.rs
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An input file paired with the name it will carry inside the archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub abs_path: PathBuf,
    pub entry_name: String,
}

/// A consecutive slice of the prepared inputs, compressed on its own.
#[derive(Clone, Debug)]
pub struct Chunk {
    pub index: usize,
    pub files: Vec<SourceFile>,
}

/// Temporary archive holding exactly one chunk's entries.
#[derive(Clone, Debug)]
pub struct ChunkArchive {
    pub index: usize,
    pub path: PathBuf,
    pub entries: usize,
}

/// One row of the fragment registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentRecord {
    pub filename: String,
    pub path: PathBuf,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeviceClass {
    /// FAT32/exFAT media; the only targets for fragmentation.
    UsbLike,
    Fixed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Device {
    pub mount_point: PathBuf,
    pub fs_type: String,
}

impl Device {
    pub fn new(mount_point: impl Into<PathBuf>, fs_type: impl Into<String>) -> Self {
        Self {
            mount_point: mount_point.into(),
            fs_type: fs_type.into(),
        }
    }

    pub fn class(&self) -> DeviceClass {
        match self.fs_type.to_ascii_uppercase().as_str() {
            "FAT32" | "EXFAT" | "VFAT" | "MSDOS" => DeviceClass::UsbLike,
            _ => DeviceClass::Fixed,
        }
    }

    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.mount_point.display(), self.fs_type)
    }
}
