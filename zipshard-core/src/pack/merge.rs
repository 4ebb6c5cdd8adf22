use crate::domain::ChunkArchive;
use crate::error::{Result, ShardError};
use crate::pack::entry::last_wins;
use crate::util::output::OutputGuard;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::Path;
use zip::result::ZipError;
use zip::{DateTime, ZipArchive, ZipWriter};

fn open_chunk(chunk: &ChunkArchive) -> Result<ZipArchive<BufReader<File>>> {
    let f = File::open(&chunk.path).map_err(|e| chunk_err(chunk, ZipError::Io(e)))?;
    ZipArchive::new(BufReader::new(f)).map_err(|e| chunk_err(chunk, e))
}

fn chunk_err(chunk: &ChunkArchive, source: ZipError) -> ShardError {
    ShardError::ChunkArchive {
        index: chunk.index,
        source,
    }
}

/// Entry names of every chunk, in merge order. Each archive is closed
/// before the next one is opened.
fn scan_names(chunks: &[ChunkArchive]) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for chunk in chunks {
        let mut ar = open_chunk(chunk)?;
        for i in 0..ar.len() {
            let entry = ar.by_index_raw(i).map_err(|e| chunk_err(chunk, e))?;
            names.push(entry.name().map_err(|e| chunk_err(chunk, e))?.into_owned());
        }
    }
    Ok(names)
}

/// Folds the chunk archives, in the order given, into `out`. Entries are
/// copied raw: compressed and encrypted bytes move over untouched, and an
/// AES entry keeps its encryption header. Each chunk file is deleted once
/// merged. On failure `out` is removed.
pub fn merge_chunks(chunks: &[ChunkArchive], out: &Path) -> Result<u64> {
    let names = scan_names(chunks)?;
    let keep = last_wins(names.iter().map(String::as_str));

    let (guard, file) = OutputGuard::create(out)?;
    let mut zip = ZipWriter::new(file);
    let mut slot = 0usize;
    let mut written = 0u64;

    for chunk in chunks {
        let mut ar = open_chunk(chunk)?;
        for i in 0..ar.len() {
            let entry = ar.by_index_raw(i).map_err(|e| chunk_err(chunk, e))?;
            if keep.get(slot).copied().unwrap_or(false) {
                // Plain `raw_copy_file` writes the AES extra field twice.
                let mtime = entry
                    .last_modified()
                    .filter(DateTime::is_valid)
                    .unwrap_or_else(DateTime::default_for_write);
                zip.raw_copy_file_touch(entry, mtime, None)?;
                written += 1;
            } else {
                tracing::debug!(chunk = chunk.index, slot, "superseded by a later chunk");
            }
            slot += 1;
        }
        drop(ar);
        fs::remove_file(&chunk.path)?;
        tracing::debug!(chunk = chunk.index, "chunk merged");
    }

    let mut file = zip.finish()?;
    file.flush()?;
    guard.commit();
    Ok(written)
}
