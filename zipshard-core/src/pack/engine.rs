use crate::error::Result;
use crate::options::CompressOptions;
use crate::pack::chunk::compress_chunk;
use crate::pack::direct::write_direct;
use crate::pack::entry::EntryStyle;
use crate::pack::merge::merge_chunks;
use crate::pack::plan::{Plan, plan};
use crate::pack::prepare::prepare_paths;
use crate::pool::WorkerPool;
use crate::report::{CompressReport, SkipReport, Strategy};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Builds the final archive at `out` from absolute input paths.
///
/// Small inputs are written directly. Larger ones are split into chunks,
/// compressed in parallel into a scratch directory, and merged in chunk
/// order. The scratch directory is removed on every exit path.
pub fn compress(
    inputs: &[PathBuf],
    out: &Path,
    password: Option<&str>,
    opts: &CompressOptions,
) -> Result<CompressReport> {
    opts.validate()?;
    let workers = opts.worker_count();
    let pool = WorkerPool::new(workers)?;
    info!(files = inputs.len(), workers, "preparing file paths");

    let (sources, mut skipped) = prepare_paths(inputs, &pool);
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let style = EntryStyle {
        codec: opts.codec,
        level: opts.compression_level,
        password,
    };

    let (strategy, entries) = match plan(sources, opts, workers) {
        Plan::Direct(files) => {
            info!(files = files.len(), "compressing directly");
            let (entries, report) = write_direct(
                &files,
                out,
                style,
                &pool,
                opts.buffer_direct_batches,
                opts.direct_batch_size,
            )?;
            skipped.absorb(report);
            (Strategy::Direct, entries)
        }
        Plan::Chunked { chunk_size, chunks } => {
            let n_chunks = chunks.len();
            let (entries, report) = compress_chunked(chunks, out, style, &pool, opts)?;
            skipped.absorb(report);
            (
                Strategy::Chunked {
                    chunk_size,
                    chunks: n_chunks,
                },
                entries,
            )
        }
    };

    let archive = std::path::absolute(out)?;
    info!(
        archive = %archive.display(),
        entries,
        skipped = skipped.len(),
        "compression completed"
    );
    Ok(CompressReport {
        archive,
        strategy,
        workers,
        entries,
        skipped,
    })
}

fn compress_chunked(
    chunks: Vec<crate::domain::Chunk>,
    out: &Path,
    style: EntryStyle<'_>,
    pool: &WorkerPool,
    opts: &CompressOptions,
) -> Result<(u64, SkipReport)> {
    let root = opts.scratch_root();
    fs::create_dir_all(&root)?;
    let scratch = tempfile::Builder::new()
        .prefix("zipshard_")
        .tempdir_in(&root)?;

    info!(chunks = chunks.len(), "compressing chunks in parallel");
    let outcomes = pool.run(chunks, |chunk| compress_chunk(chunk, scratch.path(), style));

    let mut skipped = SkipReport::default();
    let mut archives = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        let (archive, report) = outcome?;
        skipped.absorb(report);
        archives.push(archive);
    }

    info!(chunks = archives.len(), out = %out.display(), "merging chunk archives");
    let entries = merge_chunks(&archives, out)?;
    scratch.close()?;
    Ok((entries, skipped))
}
