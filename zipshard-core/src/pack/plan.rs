use crate::domain::{Chunk, SourceFile};
use crate::options::CompressOptions;

/// Smallest chunk the planner will produce (except the trailing one).
pub const MIN_CHUNK_FILES: usize = 100;

#[derive(Debug)]
pub enum Plan {
    /// Few inputs: write straight into the final archive.
    Direct(Vec<SourceFile>),
    /// Many inputs: compress chunks in parallel, then merge.
    Chunked { chunk_size: usize, chunks: Vec<Chunk> },
}

/// `min(configured, max(100, n / (2 * workers)))`: at least two chunks per
/// worker when there are enough files, never fewer than 100 files per chunk.
pub fn adaptive_chunk_size(n_files: usize, configured: usize, workers: usize) -> usize {
    let balanced = n_files / (2 * workers.max(1));
    configured.min(balanced.max(MIN_CHUNK_FILES)).max(1)
}

pub fn plan(files: Vec<SourceFile>, opts: &CompressOptions, workers: usize) -> Plan {
    let n = files.len();
    if n < opts.min_files_for_chunking {
        return Plan::Direct(files);
    }

    let chunk_size = adaptive_chunk_size(n, opts.chunk_size, workers);
    let mut chunks = Vec::with_capacity(n.div_ceil(chunk_size));
    let mut it = files.into_iter().peekable();
    while it.peek().is_some() {
        let index = chunks.len();
        let files: Vec<SourceFile> = it.by_ref().take(chunk_size).collect();
        chunks.push(Chunk { index, files });
    }
    Plan::Chunked { chunk_size, chunks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn sources(n: usize) -> Vec<SourceFile> {
        (0..n)
            .map(|i| SourceFile {
                abs_path: PathBuf::from(format!("/in/{i:06}")),
                entry_name: format!("in/{i:06}"),
            })
            .collect()
    }

    fn opts(chunk_size: usize, min_files: usize) -> CompressOptions {
        CompressOptions {
            chunk_size,
            min_files_for_chunking: min_files,
            ..Default::default()
        }
    }

    #[test]
    fn below_threshold_goes_direct() {
        match plan(sources(250), &opts(1000, 500), 4) {
            Plan::Direct(files) => assert_eq!(files.len(), 250),
            other => panic!("expected direct plan, got {other:?}"),
        }
    }

    #[test]
    fn five_thousand_files_on_four_workers() {
        assert_eq!(adaptive_chunk_size(5000, 1000, 4), 625);
        match plan(sources(5000), &opts(1000, 500), 4) {
            Plan::Chunked { chunk_size, chunks } => {
                assert_eq!(chunk_size, 625);
                assert_eq!(chunks.len(), 8);
                assert!(chunks.iter().all(|c| c.files.len() == 625));
            }
            other => panic!("expected chunked plan, got {other:?}"),
        }
    }

    #[test]
    fn floor_of_one_hundred() {
        assert_eq!(adaptive_chunk_size(600, 1000, 16), 100);
        assert_eq!(adaptive_chunk_size(600, 50, 16), 50);
    }

    proptest! {
        #[test]
        fn chunks_partition_the_input(
            n in 0usize..6000,
            configured in 1usize..2000,
            workers in 1usize..=16,
        ) {
            let input = sources(n);
            let plan = plan(input.clone(), &opts(configured, 0), workers);
            let Plan::Chunked { chunks, .. } = plan else {
                return Err(TestCaseError::fail("threshold 0 must chunk"));
            };

            let total: usize = chunks.iter().map(|c| c.files.len()).sum();
            prop_assert_eq!(total, n);

            let flat: Vec<SourceFile> = chunks.iter().flat_map(|c| c.files.clone()).collect();
            prop_assert_eq!(flat, input);

            for (i, c) in chunks.iter().enumerate() {
                prop_assert_eq!(c.index, i);
                prop_assert!(!c.files.is_empty());
            }

            if n >= 2 * workers * MIN_CHUNK_FILES {
                prop_assert!(chunks.len() >= 2 * workers);
            }
        }
    }
}
