#![warn(missing_docs)]

//! solarch archive subsystem: batches of packed blocks staged as compressed
//! scratch files, uploaded to an object store under a status manifest.
//!
//! Stage: Block[] → pack → compress → {temp_dir}/{fileIndex}{suffix}
//! Flush: scratch files → object store → status manifest → reset scratch
//! Fetch: object store → decompress → unpack → Block[]

pub mod archiver;
pub mod config;
pub mod error;
pub mod local;
pub mod status;
pub mod store;

pub use archiver::Archiver;
pub use config::ArchiveConfig;
pub use error::{ArchiveError, ArchiveResult};
pub use status::{ArchiveStatus, FileStatus};
pub use store::{MemoryObjectStore, MemoryObjectStoreStats, ObjectStore, PutOptions};
