//! Error types for the compression pipeline

/// Result type alias for compression operations.
pub type CompressResult<T> = Result<T, CompressError>;

/// All errors that can occur while serializing or piping a batch
#[derive(Debug, thiserror::Error)]
pub enum CompressError {
    /// The compressor process could not be started
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },
    /// The compressor exited unsuccessfully; its output is discarded
    #[error("{program} exited with code {code:?}: {stderr}")]
    ExitStatus {
        /// Program that failed.
        program: String,
        /// Exit code, `None` if killed by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },
    /// The compressor stopped reading its input before the end
    #[error("{program} closed its input before the payload was fully written")]
    InputClosed {
        /// Program that closed its input.
        program: String,
    },
    /// The compressor produced no output for a non-empty input
    #[error("{program} produced no output for {input_bytes} input bytes")]
    EmptyOutput {
        /// Program that produced nothing.
        program: String,
        /// Size of the input it was given.
        input_bytes: usize,
    },
    /// MessagePack serialization failed
    #[error("Encode failed: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    /// MessagePack deserialization failed
    #[error("Decode failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    /// I/O error on pipes or scratch files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
