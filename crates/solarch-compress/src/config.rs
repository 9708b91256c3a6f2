//! Compressor selection and scratch directory configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// External byte-stream compressor used for batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CompressionFormat {
    /// `xz`: best ratio, used for cold archive storage
    Xz {
        /// Preset level (0–9).
        level: u32,
    },
    /// `zstd`: much faster, slightly larger output
    Zstd {
        /// Compression level (1–19).
        level: u32,
    },
    /// `gzip`: universally available fallback
    Gzip {
        /// Compression level (1–9).
        level: u32,
    },
    /// Any filter program reading stdin and writing stdout
    External {
        /// Program to run.
        program: String,
        /// Arguments for compression.
        compress_args: Vec<String>,
        /// Arguments for decompression; a file path may be appended.
        decompress_args: Vec<String>,
        /// Suffix of compressed files, including the dot.
        extension: String,
    },
}

impl Default for CompressionFormat {
    fn default() -> Self {
        Self::Xz { level: 9 }
    }
}

impl CompressionFormat {
    /// Program to spawn.
    pub fn program(&self) -> &str {
        match self {
            Self::Xz { .. } => "xz",
            Self::Zstd { .. } => "zstd",
            Self::Gzip { .. } => "gzip",
            Self::External { program, .. } => program,
        }
    }

    /// Arguments that make the program compress stdin to stdout.
    pub fn compress_args(&self) -> Vec<String> {
        match self {
            Self::Xz { level } | Self::Gzip { level } => {
                vec!["-c".into(), format!("-{}", level)]
            }
            Self::Zstd { level } => vec!["-c".into(), "-q".into(), format!("-{}", level)],
            Self::External { compress_args, .. } => compress_args.clone(),
        }
    }

    /// Arguments that make the program decompress to stdout.
    pub fn decompress_args(&self) -> Vec<String> {
        match self {
            Self::Xz { .. } | Self::Gzip { .. } => vec!["-d".into(), "-c".into()],
            Self::Zstd { .. } => vec!["-d".into(), "-c".into(), "-q".into()],
            Self::External {
                decompress_args, ..
            } => decompress_args.clone(),
        }
    }

    /// Suffix of compressed batch files.
    pub fn extension(&self) -> &str {
        match self {
            Self::Xz { .. } => ".xz",
            Self::Zstd { .. } => ".zst",
            Self::Gzip { .. } => ".gz",
            Self::External { extension, .. } => extension,
        }
    }

    /// MIME type of the compressed output.
    pub fn content_type(&self) -> &str {
        match self {
            Self::Xz { .. } => "application/x-xz",
            Self::Zstd { .. } => "application/zstd",
            Self::Gzip { .. } => "application/gzip",
            Self::External { .. } => "application/octet-stream",
        }
    }
}

/// Configuration for [`crate::CompressionProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorConfig {
    /// Compressor to pipe batches through.
    pub format: CompressionFormat,
    /// Scratch directory holding compressed batch files before upload.
    pub temp_dir: PathBuf,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            format: CompressionFormat::default(),
            temp_dir: PathBuf::from(".temp/packed"),
        }
    }
}
