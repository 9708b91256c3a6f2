//! Error types for the archive subsystem

use solarch_codec::CodecError;
use solarch_compress::CompressError;

/// Result type alias for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// All errors raised while staging, uploading or fetching batches
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Serialization or compressor failure
    #[error("Compression error: {0}")]
    Compress(#[from] CompressError),
    /// Packing or unpacking failure
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
    /// Object store operation failed
    #[error("Object store error for {key}: {reason}")]
    Store {
        /// Object key involved.
        key: String,
        /// Backend-specific failure description.
        reason: String,
    },
    /// A batch must contain at least one block
    #[error("Refusing to stage an empty batch")]
    EmptyBatch,
    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),
    /// Local file I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
