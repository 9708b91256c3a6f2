#![warn(missing_docs)]

//! solarch compression pipeline: MessagePack through an external compressor
//!
//! Write path: PackedBlockList → MessagePack → compressor stdin ─┬→ buffer
//!                                                               └→ scratch file
//! Read path:  buffer / scratch file → decompressor → MessagePack → PackedBlockList

pub mod config;
pub mod encode;
pub mod error;
pub mod process;
pub mod provider;

pub use config::{CompressionFormat, CompressorConfig};
pub use error::{CompressError, CompressResult};
pub use provider::CompressionProvider;
