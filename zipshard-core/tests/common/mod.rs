#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use zipshard_core::pack::prepare::entry_name;
use zipshard_core::{CompressOptions, WorkerPool, find_files};

/// Creates `n` files spread over a few nested directories and returns their
/// canonical paths, sorted, the way discovery hands them to compression.
pub fn make_tree(root: &Path, n: usize) -> Vec<PathBuf> {
    for i in 0..n {
        let dir = root.join(format!("d{}", i % 7)).join(format!("sub{}", i % 3));
        fs::create_dir_all(&dir).unwrap();
        let body = format!("file {i} payload\n").repeat(i % 40 + 1);
        fs::write(dir.join(format!("f{i:05}.txt")), body).unwrap();
    }
    let pool = WorkerPool::new(2).unwrap();
    let (files, skipped) = find_files(&[root.to_path_buf()], &pool).unwrap();
    assert!(skipped.is_empty());
    assert_eq!(files.len(), n);
    files
}

/// Every source file must come back byte-identical under `dest`.
pub fn assert_restored(sources: &[PathBuf], dest: &Path) {
    for src in sources {
        let rel = entry_name(src).unwrap();
        let got = fs::read(dest.join(&rel)).unwrap_or_else(|e| panic!("{rel}: {e}"));
        assert_eq!(got, fs::read(src).unwrap(), "content differs for {rel}");
    }
}

pub fn opts(scratch: &Path) -> CompressOptions {
    CompressOptions {
        scratch_dir: Some(scratch.to_path_buf()),
        ..Default::default()
    }
}

pub fn is_empty_dir(dir: &Path) -> bool {
    fs::read_dir(dir).map(|mut d| d.next().is_none()).unwrap_or(true)
}

pub fn entry_names(archive: &Path) -> Vec<String> {
    let mut ar = zip::ZipArchive::new(fs::File::open(archive).unwrap()).unwrap();
    (0..ar.len())
        .map(|i| ar.by_index_raw(i).unwrap().name().unwrap().into_owned())
        .collect()
}
