#![forbid(unsafe_code)]

pub mod error;
pub mod options;

pub mod codec;
pub mod discover;
pub mod domain;
pub mod pool;
pub mod report;
pub mod storage;

pub mod util {
    pub mod output;
}

pub mod pack {
    pub mod chunk;
    pub mod direct;
    pub mod engine;
    pub mod entry;
    pub mod merge;
    pub mod plan;
    pub mod prepare;
}

pub mod fragment {
    pub mod reassemble;
    pub mod registry;
    pub mod split;
}

pub mod read {
    pub mod extract;
    pub mod restore;
}

// Re-exports: stable API surface
pub use codec::Codec;
pub use discover::find_files;
pub use domain::{Device, DeviceClass, FragmentRecord, SourceFile};
pub use error::{Result, ShardError};
pub use fragment::reassemble::reassemble;
pub use fragment::registry::{CsvRegistry, FragmentLog};
pub use fragment::split::{Assignment, AssignmentSource, SplitProgress, split};
pub use options::{CompressOptions, SplitOptions};
pub use pack::engine::compress;
pub use pool::WorkerPool;
pub use read::extract::extract;
pub use read::restore::{restore_fragments, restore_local};
pub use report::{CompressReport, SkipReport, Strategy};
pub use storage::copy_to_device;
