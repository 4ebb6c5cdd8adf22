use crate::domain::{Chunk, ChunkArchive};
use crate::error::Result;
use crate::pack::entry::{EntryOutcome, EntryStyle, last_wins, stream_file};
use crate::report::SkipReport;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use zip::ZipWriter;

pub fn chunk_file_name(index: usize) -> String {
    format!("chunk_{index:05}.zip")
}

/// Writes one chunk into its own archive under `scratch`. Unreadable files
/// are skipped and reported; only archive write failures abort the chunk.
pub fn compress_chunk(
    chunk: Chunk,
    scratch: &Path,
    style: EntryStyle<'_>,
) -> Result<(ChunkArchive, SkipReport)> {
    let path = scratch.join(chunk_file_name(chunk.index));
    let mut zip = ZipWriter::new(BufWriter::new(File::create(&path)?));
    let mut skipped = SkipReport::default();
    let mut entries = 0usize;

    let keep = last_wins(chunk.files.iter().map(|f| f.entry_name.as_str()));
    for (src, keep) in chunk.files.iter().zip(keep) {
        if !keep {
            tracing::debug!(name = %src.entry_name, "superseded by a later entry");
            continue;
        }
        match stream_file(&mut zip, src, style)? {
            EntryOutcome::Written => entries += 1,
            EntryOutcome::Skipped(reason) => skipped.record(&src.abs_path, reason),
        }
    }

    let mut out = zip.finish()?;
    std::io::Write::flush(&mut out)?;
    tracing::debug!(chunk = chunk.index, entries, "chunk archive written");

    Ok((
        ChunkArchive {
            index: chunk.index,
            path,
            entries,
        },
        skipped,
    ))
}
