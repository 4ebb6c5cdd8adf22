use crate::codec::Codec;
use crate::error::{Result, ShardError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound on compression workers regardless of core count.
pub const MAX_WORKERS: usize = 16;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressOptions {
    pub compression_level: i32,
    pub codec: Codec,
    /// Files per chunk archive before adaptive shrinking.
    pub chunk_size: usize,
    /// Inputs below this count skip chunk archives entirely.
    pub min_files_for_chunking: usize,
    /// `None` picks `available_parallelism - 1`, capped at [`MAX_WORKERS`].
    pub workers: Option<usize>,
    /// Direct strategy only: read each batch into memory on the pool
    /// before appending it, instead of streaming file by file.
    pub buffer_direct_batches: bool,
    pub direct_batch_size: usize,
    /// Parent for the per-run scratch directory (OS temp dir when unset).
    pub scratch_dir: Option<PathBuf>,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            compression_level: 6,
            codec: Codec::Deflate,
            chunk_size: 1000,
            min_files_for_chunking: 500,
            workers: None,
            buffer_direct_batches: false,
            direct_batch_size: 64,
            scratch_dir: None,
        }
    }
}

impl CompressOptions {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let opts: CompressOptions = serde_json::from_str(&raw)
            .map_err(|e| ShardError::Config(format!("{}: {e}", path.display())))?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ShardError::Config("chunk_size must be positive".into()));
        }
        if self.direct_batch_size == 0 {
            return Err(ShardError::Config(
                "direct_batch_size must be positive".into(),
            ));
        }
        if self.workers == Some(0) {
            return Err(ShardError::Config("workers must be positive".into()));
        }
        Ok(())
    }

    pub fn worker_count(&self) -> usize {
        match self.workers {
            Some(n) => n.max(1),
            None => {
                let cores = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1);
                default_worker_count(cores)
            }
        }
    }

    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

/// One core is left free for coordination and I/O.
pub fn default_worker_count(cores: usize) -> usize {
    cores.saturating_sub(1).clamp(1, MAX_WORKERS)
}

#[derive(Clone, Debug, Default)]
pub struct SplitOptions {
    /// Where part files are cut before copying; defaults to the archive's directory.
    pub staging_dir: Option<PathBuf>,
}
