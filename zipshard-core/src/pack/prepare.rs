use crate::domain::SourceFile;
use crate::pool::WorkerPool;
use crate::report::SkipReport;
use std::path::{Component, Path, PathBuf};

/// Entry name for `path`: the path with its root/drive anchor removed,
/// joined with `/`.
pub fn entry_name(path: &Path) -> std::result::Result<String, String> {
    if !path.has_root() {
        return Err("path has no root anchor to relativize against".to_string());
    }
    let mut parts: Vec<&str> = Vec::new();
    for c in path.components() {
        match c {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                return Err("path contains a parent-directory component".to_string());
            }
            Component::Normal(seg) => {
                let s = seg
                    .to_str()
                    .ok_or_else(|| "path is not valid UTF-8".to_string())?;
                parts.push(s);
            }
        }
    }
    if parts.is_empty() {
        return Err("path names the filesystem root".to_string());
    }
    Ok(parts.join("/"))
}

/// Turns discovered paths into archive sources on the pool. Input order is
/// kept; paths that cannot be relativized are reported and dropped.
pub fn prepare_paths(paths: &[PathBuf], pool: &WorkerPool) -> (Vec<SourceFile>, SkipReport) {
    let per_worker = paths.len().div_ceil(pool.workers()).max(1);
    let slices: Vec<&[PathBuf]> = paths.chunks(per_worker).collect();

    let outcomes = pool.run(slices, |slice| {
        let mut files = Vec::with_capacity(slice.len());
        let mut skipped = SkipReport::default();
        for p in slice {
            match entry_name(p) {
                Ok(name) => files.push(SourceFile {
                    abs_path: p.clone(),
                    entry_name: name,
                }),
                Err(reason) => skipped.record(p, reason),
            }
        }
        Ok((files, skipped))
    });

    let mut files = Vec::with_capacity(paths.len());
    let mut skipped = SkipReport::default();
    for (part, report) in outcomes.into_iter().flatten() {
        files.extend(part);
        skipped.absorb(report);
    }
    (files, skipped)
}
