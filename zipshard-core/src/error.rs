use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Registry error: {0}")]
    Registry(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(String),

    /// A temporary chunk archive could not be read back during merge.
    #[error("chunk archive #{index} is unreadable: {source}")]
    ChunkArchive {
        index: usize,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Decryption failed. Is the password incorrect?")]
    WrongPassword,

    #[error("archive is encrypted; password required")]
    PasswordRequired,

    #[error("no fragments found for {0}")]
    FragmentsNotFound(String),

    #[error("fragment missing at {0}")]
    FragmentMissing(PathBuf),

    #[error("file not found: {0}")]
    ArchiveNotFound(PathBuf),

    #[error("unrecognized or unsupported file format: {0:?}")]
    UnsupportedFormat(String),

    #[error("fragmentation stopped with {remaining} bytes unassigned")]
    SplitIncomplete { remaining: u64 },
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, ShardError>;
