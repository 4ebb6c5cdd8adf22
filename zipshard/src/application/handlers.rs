use std::fs;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dialoguer::{Confirm, Select};
use time::OffsetDateTime;
use time::macros::format_description;
use zipshard_core::{
    Codec, CompressOptions, CsvRegistry, DeviceClass, Result, SplitOptions, WorkerPool, compress,
    copy_to_device, find_files, restore_fragments, restore_local, split,
};

use super::devices::connected_devices;
use super::prompt::{PromptSource, prompt_err};

pub struct BackupArgs {
    pub folders: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub password: Option<String>,
    pub workers: Option<usize>,
    pub chunk_size: Option<usize>,
    pub min_files_for_chunking: Option<usize>,
    pub level: Option<i32>,
    pub codec: Option<Codec>,
    pub buffer_batches: bool,
    pub config: Option<PathBuf>,
    pub scratch_dir: Option<PathBuf>,
    pub store: bool,
    pub no_prompt: bool,
}

/// Per-process scratch root. Removed on drop. If the run is interrupted the
/// Ctrl-C handler removes it along with the archive still being written.
struct ScratchRoot {
    path: PathBuf,
    pending: Arc<Mutex<Option<PathBuf>>>,
}

impl ScratchRoot {
    fn install(parent: PathBuf, output: &Path) -> Result<Self> {
        let path = parent.join(format!("zipshard-{}", std::process::id()));
        fs::create_dir_all(&path)?;
        let pending = Arc::new(Mutex::new(Some(output.to_path_buf())));
        let (on_interrupt, in_flight) = (path.clone(), Arc::clone(&pending));
        ctrlc::set_handler(move || {
            clean_interrupted(&on_interrupt, &in_flight);
            eprintln!("\ninterrupted; scratch space and partial archive removed");
            std::process::exit(130);
        })
        .map_err(Error::other)?;
        Ok(Self { path, pending })
    }

    /// The archive is complete; an interrupt from here on must leave it.
    fn archive_written(&self) {
        if let Ok(mut p) = self.pending.lock() {
            *p = None;
        }
    }
}

fn clean_interrupted(scratch: &Path, pending: &Mutex<Option<PathBuf>>) {
    let _ = fs::remove_dir_all(scratch);
    let out = match pending.lock() {
        Ok(mut p) => p.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    };
    if let Some(out) = out {
        let _ = fs::remove_file(out);
    }
}

impl Drop for ScratchRoot {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn default_archive_name() -> PathBuf {
    let fmt = format_description!("[year][month][day]_[hour][minute][second]");
    let stamp = OffsetDateTime::now_utc()
        .format(&fmt)
        .unwrap_or_else(|_| "latest".to_string());
    PathBuf::from(format!("backup_{stamp}.zip"))
}

fn compress_options(args: &BackupArgs) -> Result<CompressOptions> {
    let mut opts = match &args.config {
        Some(p) => CompressOptions::from_json_file(p)?,
        None => CompressOptions::default(),
    };
    if let Some(w) = args.workers {
        opts.workers = Some(w);
    }
    if let Some(c) = args.chunk_size {
        opts.chunk_size = c;
    }
    if let Some(m) = args.min_files_for_chunking {
        opts.min_files_for_chunking = m;
    }
    if let Some(l) = args.level {
        opts.compression_level = l;
    }
    if let Some(c) = args.codec {
        opts.codec = c;
    }
    if args.buffer_batches {
        opts.buffer_direct_batches = true;
    }
    if args.scratch_dir.is_some() {
        opts.scratch_dir = args.scratch_dir.clone();
    }
    opts.validate()?;
    Ok(opts)
}

pub fn handle_backup(args: BackupArgs, registry: &Path) -> Result<()> {
    let mut opts = compress_options(&args)?;
    eprintln!(
        "... Starting backup with {} workers and chunk size {}...",
        opts.worker_count(),
        opts.chunk_size
    );

    let pool = WorkerPool::new(opts.worker_count())?;
    let (files, unreadable) = find_files(&args.folders, &pool)?;
    drop(pool);
    if files.is_empty() {
        return Err(Error::new(ErrorKind::NotFound, "no files found in the provided folders").into());
    }

    let out = args.output.clone().unwrap_or_else(default_archive_name);
    let scratch = ScratchRoot::install(opts.scratch_root(), &out)?;
    opts.scratch_dir = Some(scratch.path.clone());

    let report = compress(&files, &out, args.password.as_deref(), &opts)?;
    scratch.archive_written();
    drop(scratch);

    for s in unreadable.skipped.iter().chain(&report.skipped.skipped) {
        eprintln!("skipped {}: {}", s.path.display(), s.reason);
    }
    eprintln!(
        "Backup completed: {} ({} entries, {} skipped)",
        report.archive.display(),
        report.entries,
        unreadable.len() + report.skipped.len()
    );

    let wants_storage = args.store
        || (!args.no_prompt
            && Confirm::new()
                .with_prompt("Do you want to save a copy to external storage?")
                .default(false)
                .interact()
                .map_err(prompt_err)?);
    if wants_storage {
        storage_menu(&report.archive, registry)?;
    }
    Ok(())
}

pub fn handle_store(archive: &Path, registry: &Path) -> Result<()> {
    if !archive.is_file() {
        return Err(zipshard_core::ShardError::ArchiveNotFound(archive.to_path_buf()));
    }
    storage_menu(archive, registry)
}

fn storage_menu(archive: &Path, registry: &Path) -> Result<()> {
    let choice = Select::new()
        .with_prompt("Storage options")
        .items(&["External hard disk", "USB fragmentation"][..])
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let devices = connected_devices();
    if devices.is_empty() {
        eprintln!("No devices found!");
        return Ok(());
    }
    let (usb, fixed): (Vec<_>, Vec<_>) = devices
        .into_iter()
        .partition(|d| d.class() == DeviceClass::UsbLike);

    if choice == 0 {
        if fixed.is_empty() {
            eprintln!("No external hard disks detected.");
            return Ok(());
        }
        let labels: Vec<String> = fixed.iter().map(|d| format!("{d} - Hard Drive")).collect();
        let idx = Select::new()
            .with_prompt("Select device")
            .items(&labels[..])
            .default(0)
            .interact()
            .map_err(prompt_err)?;
        let dest = copy_to_device(archive, &fixed[idx])?;
        eprintln!("Success: {}", dest.display());
        return Ok(());
    }

    if usb.is_empty() {
        eprintln!("No USB devices detected.");
        return Ok(());
    }
    let total = fs::metadata(archive)?.len();
    eprintln!(
        "\nTotal file size: {:.2} MB\nAssign space for each USB device. Press Enter to store the remaining file size in the device.",
        total as f64 / (1024.0 * 1024.0)
    );

    let mut log = CsvRegistry::open(registry)?;
    let mut source = PromptSource::new(usb);
    let records = split(archive, &mut log, &mut source, &SplitOptions::default())?;
    eprintln!(
        "Stored {} fragments; registry: {}",
        records.len(),
        log.path().display()
    );
    Ok(())
}

pub fn handle_restore_local(
    zip_path: PathBuf,
    output_dir: PathBuf,
    password: Option<String>,
) -> Result<()> {
    let files = restore_local(&zip_path, &output_dir, password.as_deref())?;
    eprintln!("Backup restored to: {} ({} files)", output_dir.display(), files.len());
    Ok(())
}

pub fn handle_restore_fragments(
    registry: &Path,
    filename: String,
    output_dir: PathBuf,
    password: Option<String>,
) -> Result<()> {
    let log = CsvRegistry::open(registry)?;
    let files = restore_fragments(&log, &filename, &output_dir, password.as_deref())?;
    eprintln!(
        "Backup {} restored from fragments to: {} ({} files)",
        filename,
        output_dir.display(),
        files.len()
    );
    Ok(())
}

pub fn handle_devices() -> Result<()> {
    let devices = connected_devices();
    if devices.is_empty() {
        eprintln!("No devices found!");
        return Ok(());
    }
    for (i, d) in devices.iter().enumerate() {
        let kind = match d.class() {
            DeviceClass::UsbLike => "USB",
            DeviceClass::Fixed => "Hard Drive",
        };
        println!("{}. {} ({} - {})", i + 1, d.mount_point.display(), d.fs_type, kind);
    }
    Ok(())
}
