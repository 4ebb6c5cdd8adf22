use crate::domain::SourceFile;
use crate::error::Result;
use crate::pack::entry::{
    EntryOutcome, EntryStyle, last_wins, read_whole, stream_file, write_buffered,
};
use crate::util::output::OutputGuard;
use crate::pool::WorkerPool;
use crate::report::SkipReport;
use std::io::Write;
use std::path::Path;
use zip::ZipWriter;

/// Writes a small input set straight into `out`, no chunk archives.
///
/// By default each file is streamed in turn. With `buffered`, each batch of
/// `batch_size` files is read into memory on the pool and then appended in
/// input order by this thread, the only writer of the archive.
pub fn write_direct(
    files: &[SourceFile],
    out: &Path,
    style: EntryStyle<'_>,
    pool: &WorkerPool,
    buffered: bool,
    batch_size: usize,
) -> Result<(u64, SkipReport)> {
    let keep = last_wins(files.iter().map(|f| f.entry_name.as_str()));
    let live: Vec<&SourceFile> = files
        .iter()
        .zip(keep)
        .filter_map(|(f, k)| k.then_some(f))
        .collect();

    let (guard, file) = OutputGuard::create(out)?;
    let mut zip = ZipWriter::new(file);
    let mut skipped = SkipReport::default();
    let mut written = 0u64;

    if buffered {
        for batch in live.chunks(batch_size.max(1)) {
            let loaded = pool.try_run(batch.to_vec(), |src| Ok(read_whole(src)))?;
            for (src, res) in batch.iter().zip(loaded) {
                match res {
                    Ok((data, meta)) => {
                        write_buffered(&mut zip, src, &data, &meta, style)?;
                        written += 1;
                    }
                    Err(reason) => skipped.record(&src.abs_path, reason),
                }
            }
        }
    } else {
        for src in live {
            match stream_file(&mut zip, src, style)? {
                EntryOutcome::Written => written += 1,
                EntryOutcome::Skipped(reason) => skipped.record(&src.abs_path, reason),
            }
        }
    }

    let mut file = zip.finish()?;
    file.flush()?;
    guard.commit();
    Ok((written, skipped))
}
