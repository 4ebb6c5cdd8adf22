mod common;

use common::{assert_restored, is_empty_dir, make_tree, opts};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zipshard_core::{
    Assignment, AssignmentSource, CsvRegistry, Device, FragmentLog, FragmentRecord, Result,
    ShardError, SplitOptions, SplitProgress, compress, reassemble, restore_fragments, split,
};

/// Plays back a fixed list of operator answers.
#[derive(Default)]
struct Scripted {
    queue: VecDeque<Assignment>,
    asked: usize,
    rejected: usize,
    failed: usize,
    seen_remaining: Vec<u64>,
}

impl Scripted {
    fn new(items: impl IntoIterator<Item = Assignment>) -> Self {
        Self {
            queue: items.into_iter().collect(),
            ..Default::default()
        }
    }
}

impl AssignmentSource for Scripted {
    fn next_assignment(&mut self, progress: &SplitProgress) -> Result<Option<Assignment>> {
        self.asked += 1;
        self.seen_remaining.push(progress.remaining);
        Ok(self.queue.pop_front())
    }

    fn rejected(&mut self, _a: &Assignment, _reason: &str) {
        self.rejected += 1;
    }

    fn copy_failed(&mut self, _a: &Assignment, _e: &ShardError) {
        self.failed += 1;
    }
}

fn usb(dir: &Path) -> Device {
    Device::new(dir, "exFAT")
}

fn give(device: &Device, bytes: Option<i64>) -> Assignment {
    Assignment {
        device: device.clone(),
        bytes,
    }
}

fn archive_of(dir: &Path, name: &str, len: usize) -> (PathBuf, Vec<u8>) {
    let data: Vec<u8> = (0..len).map(|i| (i * 31 % 251) as u8).collect();
    let p = dir.join(name);
    fs::write(&p, &data).unwrap();
    (p, data)
}

#[test]
fn three_equal_parts_on_three_devices() {
    let work = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    let devs: Vec<TempDir> = (0..3).map(|_| TempDir::new().unwrap()).collect();
    let (archive, data) = archive_of(work.path(), "backup.zip", 3 * 1024 * 1024);

    let mut reg = CsvRegistry::open(&work.path().join("db.csv")).unwrap();
    let mb = 1024 * 1024;
    let mut source = Scripted::new(devs.iter().map(|d| give(&usb(d.path()), Some(mb))));
    let opts = SplitOptions {
        staging_dir: Some(staging.path().to_path_buf()),
    };

    let records = split(&archive, &mut reg, &mut source, &opts).unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(source.seen_remaining, [3 * mb as u64, 2 * mb as u64, mb as u64]);
    assert!(is_empty_dir(staging.path()), "local fragments are deleted");
    for (i, (r, d)) in records.iter().zip(&devs).enumerate() {
        assert_eq!(r.filename, "backup.zip");
        assert_eq!(r.path, d.path().join(format!("backup.part{:03}", i + 1)));
    }

    let reopened = CsvRegistry::open(&work.path().join("db.csv")).unwrap();
    assert_eq!(reopened.fragments_for("backup.zip"), records);

    let out = TempDir::new().unwrap();
    let rebuilt = reassemble(&reopened, "backup.zip", out.path()).unwrap();
    assert_eq!(fs::read(rebuilt).unwrap(), data);
}

#[test]
fn blank_size_takes_the_rest() {
    let work = TempDir::new().unwrap();
    let d1 = TempDir::new().unwrap();
    let d2 = TempDir::new().unwrap();
    let (archive, data) = archive_of(work.path(), "b.zip", 10_000);

    let mut reg = CsvRegistry::open(&work.path().join("db.csv")).unwrap();
    let mut source = Scripted::new([give(&usb(d1.path()), Some(4_000)), give(&usb(d2.path()), None)]);
    let records = split(&archive, &mut reg, &mut source, &SplitOptions::default()).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(fs::metadata(&records[0].path).unwrap().len(), 4_000);
    assert_eq!(fs::metadata(&records[1].path).unwrap().len(), 6_000);
    assert!(!work.path().join("b.part001").exists());
    assert!(!work.path().join("b.part002").exists());

    let out = TempDir::new().unwrap();
    let rebuilt = reassemble(&reg, "b.zip", out.path()).unwrap();
    assert_eq!(fs::read(rebuilt).unwrap(), data);
}

#[test]
fn short_assignments_keep_prompting() {
    let work = TempDir::new().unwrap();
    let d = TempDir::new().unwrap();
    let (archive, _) = archive_of(work.path(), "c.zip", 1_000);

    let mut reg = CsvRegistry::open(&work.path().join("db.csv")).unwrap();
    let mut source = Scripted::new([give(&usb(d.path()), Some(300)), give(&usb(d.path()), Some(300))]);
    let err = split(&archive, &mut reg, &mut source, &SplitOptions::default()).unwrap_err();

    assert!(matches!(err, ShardError::SplitIncomplete { remaining: 400 }), "got {err:?}");
    assert_eq!(source.asked, 3, "asked again after the script ran out");
    assert_eq!(reg.fragments_for("c.zip").len(), 2);
}

#[test]
fn negative_sizes_and_fixed_disks_are_reprompted() {
    let work = TempDir::new().unwrap();
    let d = TempDir::new().unwrap();
    let (archive, _) = archive_of(work.path(), "n.zip", 500);

    let mut reg = CsvRegistry::open(&work.path().join("db.csv")).unwrap();
    let mut source = Scripted::new([
        give(&usb(d.path()), Some(-5)),
        give(&Device::new(d.path(), "ext4"), None),
        give(&usb(d.path()), None),
    ]);
    let records = split(&archive, &mut reg, &mut source, &SplitOptions::default()).unwrap();

    assert_eq!(source.rejected, 2);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].path, d.path().join("n.part001"));
}

#[test]
fn failed_copy_keeps_cursor_and_registry() {
    let work = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    let good = TempDir::new().unwrap();
    let unplugged = Device::new(work.path().join("not-mounted"), "FAT32");
    let (archive, data) = archive_of(work.path(), "f.zip", 2_000);

    let mut reg = CsvRegistry::open(&work.path().join("db.csv")).unwrap();
    let mut source = Scripted::new([
        give(&unplugged, Some(1_000)),
        give(&usb(good.path()), Some(1_000)),
        give(&usb(good.path()), None),
    ]);
    let opts = SplitOptions {
        staging_dir: Some(staging.path().to_path_buf()),
    };
    let records = split(&archive, &mut reg, &mut source, &opts).unwrap();

    assert_eq!(source.failed, 1);
    assert_eq!(source.seen_remaining, [2_000, 2_000, 1_000]);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].path, good.path().join("f.part001"));
    assert_eq!(reg.fragments_for("f.zip").len(), 2);

    let out = TempDir::new().unwrap();
    let rebuilt = reassemble(&reg, "f.zip", out.path()).unwrap();
    assert_eq!(fs::read(rebuilt).unwrap(), data);
}

#[test]
fn unknown_backup_is_not_found() {
    let work = TempDir::new().unwrap();
    let reg = CsvRegistry::open(&work.path().join("db.csv")).unwrap();
    let out = work.path().join("never-created");

    let err = reassemble(&reg, "nope.zip", &out).unwrap_err();
    assert!(matches!(err, ShardError::FragmentsNotFound(ref n) if n == "nope.zip"));
    assert!(!out.exists());

    let err = restore_fragments(&reg, "nope.zip", &out, None).unwrap_err();
    assert!(matches!(err, ShardError::FragmentsNotFound(_)));
    assert!(!out.exists());
}

#[test]
fn missing_fragment_aborts_reassembly() {
    let work = TempDir::new().unwrap();
    let d = TempDir::new().unwrap();
    let mut reg = CsvRegistry::open(&work.path().join("db.csv")).unwrap();
    let present = d.path().join("m.part001");
    fs::write(&present, b"abc").unwrap();
    reg.append(FragmentRecord {
        filename: "m.zip".into(),
        path: present,
    })
    .unwrap();
    let gone = d.path().join("m.part002");
    reg.append(FragmentRecord {
        filename: "m.zip".into(),
        path: gone.clone(),
    })
    .unwrap();

    let out = TempDir::new().unwrap();
    let err = reassemble(&reg, "m.zip", out.path()).unwrap_err();
    assert!(matches!(err, ShardError::FragmentMissing(ref p) if *p == gone), "got {err:?}");
    assert!(!out.path().join("m.zip").exists());
}

#[test]
fn parts_are_joined_by_index_not_registry_order() {
    let work = TempDir::new().unwrap();
    let d = TempDir::new().unwrap();
    let mut reg = CsvRegistry::open(&work.path().join("db.csv")).unwrap();
    for (idx, body) in [(2, "BB"), (10, "CC"), (1, "AA")] {
        let p = d.path().join(format!("o.part{idx:03}"));
        fs::write(&p, body).unwrap();
        reg.append(FragmentRecord {
            filename: "o.zip".into(),
            path: p,
        })
        .unwrap();
    }

    let out = TempDir::new().unwrap();
    let rebuilt = reassemble(&reg, "o.zip", out.path()).unwrap();
    assert_eq!(fs::read_to_string(rebuilt).unwrap(), "AABBCC");
}

#[test]
fn four_digit_part_numbers_follow_three_digit_ones() {
    let work = TempDir::new().unwrap();
    let d = TempDir::new().unwrap();
    let mut reg = CsvRegistry::open(&work.path().join("db.csv")).unwrap();
    for (idx, body) in [(1000, "DD"), (101, "BB"), (999, "CC"), (2, "AA")] {
        let p = d.path().join(format!("long.part{idx:03}"));
        fs::write(&p, body).unwrap();
        reg.append(FragmentRecord {
            filename: "long.zip".into(),
            path: p,
        })
        .unwrap();
    }

    let out = TempDir::new().unwrap();
    let rebuilt = reassemble(&reg, "long.zip", out.path()).unwrap();
    assert_eq!(fs::read_to_string(rebuilt).unwrap(), "AABBCCDD");
}

#[test]
fn compress_split_restore_round_trip() {
    let src = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let files = make_tree(src.path(), 600);

    let archive = work.path().join("full.zip");
    let o = zipshard_core::CompressOptions {
        workers: Some(3),
        ..opts(scratch.path())
    };
    compress(&files, &archive, Some("pw"), &o).unwrap();

    let size = fs::metadata(&archive).unwrap().len() as i64;
    let devs: Vec<TempDir> = (0..3).map(|_| TempDir::new().unwrap()).collect();
    let mut reg = CsvRegistry::open(&work.path().join("db.csv")).unwrap();
    let mut source = Scripted::new([
        give(&usb(devs[0].path()), Some(size / 3)),
        give(&usb(devs[1].path()), Some(size / 3)),
        give(&usb(devs[2].path()), None),
    ]);
    split(&archive, &mut reg, &mut source, &SplitOptions::default()).unwrap();
    fs::remove_file(&archive).unwrap();

    let dest = TempDir::new().unwrap();
    restore_fragments(&reg, "full.zip", dest.path(), Some("pw")).unwrap();
    assert_restored(&files, dest.path());
}
