//! Error types for the packed-block codec

/// Result type alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// All errors that can occur while packing or unpacking blocks
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A key reference points past the end of the dictionary
    #[error("Key reference {index} out of range: dictionary holds {len} keys")]
    KeyOutOfRange {
        /// The offending key index.
        index: u32,
        /// Number of keys in the dictionary.
        len: usize,
    },
    /// Dictionary entry carries an unknown encoding tag
    #[error("Invalid key type: {0}")]
    InvalidKeyType(u8),
    /// A UTF-8 tagged dictionary entry is not valid UTF-8
    #[error("Dictionary key is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    /// Packed transaction version is neither the legacy sentinel nor a version number
    #[error("Invalid transaction version: {0}")]
    InvalidVersion(i64),
    /// Log message kind is not one of log/data/other
    #[error("Invalid log kind: {0:?}")]
    InvalidLogKind(String),
    /// Token balance has an incomplete or missing pre/post side
    #[error("Invalid token balance: {0}")]
    InvalidTokenBalance(String),
}
