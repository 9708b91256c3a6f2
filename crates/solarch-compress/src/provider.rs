//! Compression provider: serializes batches and pipes them through the
//! configured compressor into buffers or scratch files.

use crate::config::{CompressionFormat, CompressorConfig};
use crate::encode::{from_msgpack, to_msgpack, tree_from_msgpack, tree_to_msgpack};
use crate::error::{CompressError, CompressResult};
use crate::process::{filter_bytes, pipe_through};
use serde::de::DeserializeOwned;
use serde::Serialize;
use solarch_codec::packed::PackedBlockList;
use solarch_codec::value::Value;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Runs the compressor configured in a [`CompressorConfig`].
#[derive(Debug, Clone)]
pub struct CompressionProvider {
    config: CompressorConfig,
}

impl CompressionProvider {
    /// Create a provider, making sure the scratch directory exists.
    pub fn new(config: CompressorConfig) -> CompressResult<Self> {
        std::fs::create_dir_all(&config.temp_dir)?;
        Ok(Self { config })
    }

    /// Scratch directory for compressed batch files.
    pub fn temp_dir(&self) -> &Path {
        &self.config.temp_dir
    }

    /// Compressor in use.
    pub fn format(&self) -> &CompressionFormat {
        &self.config.format
    }

    /// Suffix of compressed batch files.
    pub fn extension(&self) -> &str {
        self.config.format.extension()
    }

    /// Scratch path for the batch file named `file_name`.
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.config
            .temp_dir
            .join(format!("{}{}", file_name, self.extension()))
    }

    fn compress_command(&self) -> Command {
        let mut cmd = Command::new(self.config.format.program());
        cmd.args(self.config.format.compress_args());
        cmd
    }

    fn decompress_command(&self) -> Command {
        let mut cmd = Command::new(self.config.format.program());
        cmd.args(self.config.format.decompress_args());
        cmd
    }

    fn check_output(&self, input_bytes: usize, output_bytes: u64) -> CompressResult<()> {
        // compressors emit at least a header for non-empty input
        if input_bytes > 0 && output_bytes == 0 {
            return Err(CompressError::EmptyOutput {
                program: self.config.format.program().to_string(),
                input_bytes,
            });
        }
        Ok(())
    }

    /// Compress a buffer.
    ///
    /// Empty output for non-empty input is an error.
    pub async fn compress(&self, data: &[u8]) -> CompressResult<Vec<u8>> {
        let out = filter_bytes(self.compress_command(), data).await?;
        self.check_output(data.len(), out.len() as u64)?;
        debug!(input = data.len(), output = out.len(), "compressed buffer");
        Ok(out)
    }

    /// Decompress a buffer.
    pub async fn decompress(&self, data: &[u8]) -> CompressResult<Vec<u8>> {
        filter_bytes(self.decompress_command(), data).await
    }

    /// Serialize a typed value and compress it.
    pub async fn to_compressed<T: Serialize + ?Sized>(&self, value: &T) -> CompressResult<Vec<u8>> {
        self.compress(&to_msgpack(value)?).await
    }

    /// Decompress a buffer and deserialize a typed value.
    pub async fn from_compressed<T: DeserializeOwned>(&self, data: &[u8]) -> CompressResult<T> {
        from_msgpack(&self.decompress(data).await?)
    }

    /// Compress a value tree with big integers kept exact.
    pub async fn tree_to_compressed(&self, tree: &Value) -> CompressResult<Vec<u8>> {
        self.compress(&tree_to_msgpack(tree)?).await
    }

    /// Inverse of [`Self::tree_to_compressed`].
    pub async fn compressed_to_tree(&self, data: &[u8]) -> CompressResult<Value> {
        tree_from_msgpack(&self.decompress(data).await?)
    }

    /// Compress a batch straight into the scratch file `file_name`.
    ///
    /// A partially written file is removed when the compressor fails.
    #[instrument(skip(self, list), fields(blocks = list.blocks.len()))]
    pub async fn block_list_to_file(
        &self,
        list: &PackedBlockList,
        file_name: &str,
    ) -> CompressResult<PathBuf> {
        let payload = to_msgpack(list)?;
        let path = self.file_path(file_name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(&path).await?;
        let result = pipe_through(self.compress_command(), Some(&payload), &mut file)
            .await
            .and_then(|written| self.check_output(payload.len(), written).map(|()| written));
        drop(file);
        match result {
            Ok(written) => {
                info!(
                    path = %path.display(),
                    raw = payload.len(),
                    compressed = written,
                    "wrote batch file"
                );
                Ok(path)
            }
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    warn!(path = %path.display(), error = %remove_err, "failed to remove partial batch file");
                }
                Err(e)
            }
        }
    }

    /// Read back a batch written by [`Self::block_list_to_file`].
    #[instrument(skip(self))]
    pub async fn file_to_block_list(&self, file_name: &str) -> CompressResult<PackedBlockList> {
        let path = self.file_path(file_name);
        let mut cmd = self.decompress_command();
        cmd.arg(&path);
        let mut raw = Vec::new();
        pipe_through(cmd, None, &mut raw).await?;
        let list: PackedBlockList = from_msgpack(&raw)?;
        debug!(path = %path.display(), blocks = list.blocks.len(), "read batch file");
        Ok(list)
    }

    /// Decode a batch from the bytes of a compressed batch file.
    pub async fn file_buffer_to_block_list(&self, data: &[u8]) -> CompressResult<PackedBlockList> {
        self.from_compressed(data).await
    }

    /// Delete everything in the scratch directory and recreate it empty.
    #[instrument(skip(self), fields(dir = %self.config.temp_dir.display()))]
    pub async fn clean_temp_dir(&self) -> CompressResult<()> {
        match tokio::fs::remove_dir_all(&self.config.temp_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tokio::fs::create_dir_all(&self.config.temp_dir).await?;
        debug!("scratch directory reset");
        Ok(())
    }
}
