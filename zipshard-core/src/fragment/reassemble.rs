use crate::error::{Result, ShardError};
use crate::fragment::registry::FragmentLog;
use crate::fragment::split::part_index;
use crate::util::output::OutputGuard;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Rebuilds the archive named `filename` from its registered fragments and
/// writes it to `out_dir/filename`.
///
/// Fragments are first copied into a private work directory, then joined in
/// part-index order. Any missing fragment fails the whole restore.
pub fn reassemble(log: &dyn FragmentLog, filename: &str, out_dir: &Path) -> Result<PathBuf> {
    let records = log.fragments_for(filename);
    if records.is_empty() {
        return Err(ShardError::FragmentsNotFound(filename.to_string()));
    }
    info!(filename, fragments = records.len(), "reassembling archive");

    let work = tempfile::Builder::new()
        .prefix("zipshard_fragments_")
        .tempdir()?;

    let mut parts: BTreeMap<(u32, String), PathBuf> = BTreeMap::new();
    for r in &records {
        let name = r
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ShardError::FragmentMissing(r.path.clone()))?
            .to_string();
        let local = work.path().join(&name);
        match fs::copy(&r.path, &local) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ShardError::FragmentMissing(r.path.clone()));
            }
            Err(e) => return Err(e.into()),
        }
        let index = part_index(&name).unwrap_or_else(|| {
            warn!(part = %name, "fragment name carries no part index; joined last");
            u32::MAX
        });
        if parts.insert((index, name), local).is_some() {
            warn!(path = %r.path.display(), "duplicate part name; newest record kept");
        }
    }

    fs::create_dir_all(out_dir)?;
    let out = out_dir.join(filename);
    let (guard, mut w) = OutputGuard::create(&out)?;
    for ((index, name), local) in &parts {
        let n = io::copy(&mut File::open(local)?, &mut w)?;
        debug!(part = %name, index, bytes = n, "appended fragment");
    }
    w.flush()?;
    w.get_ref().sync_all()?;
    guard.commit();

    work.close()?;
    Ok(out)
}
