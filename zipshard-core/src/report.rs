use serde::Serialize;
use std::path::{Path, PathBuf};

/// A file left out of the archive and why.
#[derive(Clone, Debug, Serialize)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

/// Accumulates recoverable per-file failures. Each worker fills its own
/// report; reports are merged at the join barrier.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SkipReport {
    pub skipped: Vec<Skipped>,
}

impl SkipReport {
    pub fn record(&mut self, path: &Path, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(path = %path.display(), %reason, "skipping file");
        self.skipped.push(Skipped {
            path: path.to_path_buf(),
            reason,
        });
    }

    pub fn absorb(&mut self, other: SkipReport) {
        self.skipped.extend(other.skipped);
    }

    pub fn len(&self) -> usize {
        self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Strategy {
    Direct,
    Chunked { chunk_size: usize, chunks: usize },
}

#[derive(Clone, Debug, Serialize)]
pub struct CompressReport {
    pub archive: PathBuf,
    pub strategy: Strategy,
    pub workers: usize,
    pub entries: u64,
    pub skipped: SkipReport,
}
