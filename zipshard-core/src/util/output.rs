use crate::error::Result;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Removes a partially written output file unless the write was committed.
pub struct OutputGuard {
    path: PathBuf,
    armed: bool,
}

impl OutputGuard {
    pub fn create(path: &Path) -> Result<(Self, BufWriter<File>)> {
        let f = File::create(path)?;
        Ok((
            Self {
                path: path.to_path_buf(),
                armed: true,
            },
            BufWriter::new(f),
        ))
    }

    pub fn commit(mut self) {
        self.armed = false;
    }
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!(path = %self.path.display(), "removing incomplete output");
            let _ = fs::remove_file(&self.path);
        }
    }
}
