use crate::error::Result;
use crate::pool::WorkerPool;
use crate::report::SkipReport;
use std::collections::BTreeSet;
use std::io::{Error, ErrorKind};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Walks every root on the pool and returns the canonical paths of all
/// regular files, deduplicated and sorted. Entries that cannot be read are
/// reported and left out.
pub fn find_files(roots: &[PathBuf], pool: &WorkerPool) -> Result<(Vec<PathBuf>, SkipReport)> {
    for r in roots {
        if !r.exists() {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("no such directory: {}", r.display()),
            )
            .into());
        }
    }

    tracing::info!(roots = roots.len(), "scanning directories");
    let scans = pool.try_run(roots.iter().collect(), |root| {
        let mut found = Vec::new();
        let mut skipped = SkipReport::default();
        for e in WalkDir::new(root).follow_links(false) {
            let e = match e {
                Ok(e) => e,
                Err(err) => {
                    let at = err.path().unwrap_or(root.as_path()).to_path_buf();
                    skipped.record(&at, err.to_string());
                    continue;
                }
            };
            // symlinks are not followed
            if !e.file_type().is_file() {
                continue;
            }
            match e.path().canonicalize() {
                Ok(p) => found.push(p),
                Err(err) => skipped.record(e.path(), format!("cannot resolve: {err}")),
            }
        }
        Ok((found, skipped))
    })?;

    let mut unique = BTreeSet::new();
    let mut skipped = SkipReport::default();
    for (found, report) in scans {
        unique.extend(found);
        skipped.absorb(report);
    }
    tracing::info!(files = unique.len(), "found files");
    Ok((unique.into_iter().collect(), skipped))
}
