use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use zipshard_core::Codec;

#[derive(Parser)]
#[command(author, version, about = "zipshard: parallel zip backups, optionally split across USB devices", long_about = None)]
pub struct Cli {
    /// CSV registry recording where each fragment was stored
    #[arg(
        long,
        global = true,
        env = "ZIPSHARD_REGISTRY",
        default_value = "zipshard-fragments.csv"
    )]
    pub registry: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum CodecArg {
    Store,
    Deflate,
    Zstd,
}

impl From<CodecArg> for Codec {
    fn from(c: CodecArg) -> Self {
        match c {
            CodecArg::Store => Codec::Store,
            CodecArg::Deflate => Codec::Deflate,
            CodecArg::Zstd => Codec::Zstd,
        }
    }
}

#[derive(Subcommand)]
pub enum RestoreCommands {
    /// Restore from a local .zip, .gz or .bz2 file
    Local {
        #[arg(short = 'z', long)]
        zip_path: PathBuf,
        /// Directory to restore the contents into
        #[arg(short, long)]
        output_dir: PathBuf,
        /// Password if the archive is encrypted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Rebuild a fragmented backup from its registered parts and restore it
    Fragments {
        /// Backup file name as recorded in the registry (e.g. backup_20240101_120000.zip)
        filename: String,
        #[arg(short, long)]
        output_dir: PathBuf,
        #[arg(short, long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compress folders into a (optionally encrypted) zip archive
    Backup {
        #[arg(required = true)]
        folders: Vec<PathBuf>,

        /// Output file (default: backup_<timestamp>.zip)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Password for AES-256 encryption
        #[arg(short, long)]
        password: Option<String>,

        /// Number of workers (default: cores - 1, at most 16)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Files per chunk archive
        #[arg(short = 'c', long)]
        chunk_size: Option<usize>,

        /// Below this many files, skip chunk archives
        #[arg(long)]
        min_files_for_chunking: Option<usize>,

        #[arg(long)]
        level: Option<i32>,

        #[arg(long, value_enum)]
        codec: Option<CodecArg>,

        /// Read small-set batches fully into memory before writing
        #[arg(long)]
        buffer_batches: bool,

        /// JSON file with compression options; flags override it
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        scratch_dir: Option<PathBuf>,

        /// Go straight to the storage menu after compressing
        #[arg(long)]
        store: bool,

        /// Never ask follow-up questions
        #[arg(long, conflicts_with = "store")]
        no_prompt: bool,
    },

    /// Copy an archive to an external disk or fragment it across USB devices
    Store { archive: PathBuf },

    #[command(subcommand)]
    /// Restore backups
    Restore(RestoreCommands),

    /// List detected storage devices
    Devices,
}
