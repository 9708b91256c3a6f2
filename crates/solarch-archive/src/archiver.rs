//! Stage, flush and fetch batches of blocks against an object store.

use crate::config::ArchiveConfig;
use crate::error::{ArchiveError, ArchiveResult};
use crate::local;
use crate::status::{ArchiveStatus, FileStatus};
use crate::store::{ObjectStore, PutOptions};
use solarch_codec::{pack_blocks, unpack_blocks, Block};
use solarch_compress::CompressionProvider;
use tracing::{debug, info, instrument};

/// Archives batches of blocks into an [`ObjectStore`].
///
/// Object layout under the configured prefix:
/// `files/{fileIndex}{suffix}` for batches and `status{suffix}` for the manifest.
pub struct Archiver<S: ObjectStore> {
    store: S,
    provider: CompressionProvider,
    config: ArchiveConfig,
}

impl<S: ObjectStore> Archiver<S> {
    /// Create an archiver; the scratch directory is created if missing.
    pub fn new(store: S, config: ArchiveConfig) -> ArchiveResult<Self> {
        let provider = CompressionProvider::new(config.compressor.clone())?;
        Ok(Self {
            store,
            provider,
            config,
        })
    }

    /// Underlying object store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Compression provider over the scratch directory.
    pub fn provider(&self) -> &CompressionProvider {
        &self.provider
    }

    /// Object key of batch file `file_index`.
    pub fn file_key(&self, file_index: u64) -> String {
        self.file_key_for(&format!("{}{}", file_index, self.provider.extension()))
    }

    fn file_key_for(&self, file_name: &str) -> String {
        format!("{}/files/{}", self.config.store_prefix, file_name)
    }

    /// Object key of the status manifest.
    pub fn status_key(&self) -> String {
        format!(
            "{}/status{}",
            self.config.store_prefix,
            self.provider.extension()
        )
    }

    fn put_options(&self, storage_class: bool) -> PutOptions {
        PutOptions {
            content_type: Some(self.config.content_type.clone()),
            storage_class: storage_class.then(|| self.config.storage_class.clone()),
        }
    }

    /// Read the manifest; a missing manifest is the empty status.
    pub async fn get_status(&self) -> ArchiveResult<ArchiveStatus> {
        let key = self.status_key();
        match self.store.get(&key).await? {
            Some(bytes) => Ok(self.provider.from_compressed(&bytes).await?),
            None => {
                debug!(%key, "no status manifest yet");
                Ok(ArchiveStatus::default())
            }
        }
    }

    /// Replace the manifest.
    pub async fn update_status(&self, status: &ArchiveStatus) -> ArchiveResult<()> {
        let bytes = self.provider.to_compressed(status).await?;
        self.store
            .put(&self.status_key(), bytes, self.put_options(false))
            .await?;
        info!(
            last_epoch = ?status.last_epoch,
            last_slot = ?status.last_slot,
            files = status.files.len(),
            "status updated"
        );
        Ok(())
    }

    /// Pack `blocks` into the scratch file for `file_index`.
    #[instrument(skip(self, blocks), fields(blocks = blocks.len()))]
    pub async fn stage_batch(&self, blocks: &[Block], file_index: u64) -> ArchiveResult<FileStatus> {
        let list = pack_blocks(blocks);
        let (min_height, max_height) = list.height_range().ok_or(ArchiveError::EmptyBatch)?;
        self.provider
            .block_list_to_file(&list, &file_index.to_string())
            .await?;
        info!(
            file_index,
            min_height,
            max_height,
            keys = list.encoded_keys.len(),
            "batch staged"
        );
        Ok(FileStatus {
            file_index,
            min_height,
            max_height,
        })
    }

    /// Upload every staged file, write `status`, then reset the scratch
    /// directory. Returns the number of uploaded files.
    #[instrument(skip(self, status))]
    pub async fn flush_epoch(&self, status: &ArchiveStatus) -> ArchiveResult<usize> {
        let files =
            local::list_files_with_suffix(self.provider.temp_dir(), self.provider.extension())
                .await?;
        for path in &files {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| ArchiveError::Store {
                    key: path.display().to_string(),
                    reason: "scratch file name is not UTF-8".into(),
                })?;
            let key = self.file_key_for(file_name);
            let data = local::read_file(path).await?;
            let bytes = data.len();
            self.store.put(&key, data, self.put_options(true)).await?;
            debug!(%key, bytes, "uploaded batch file");
        }
        self.update_status(status).await?;
        self.provider.clean_temp_dir().await?;
        info!(files = files.len(), "epoch flushed");
        Ok(files.len())
    }

    /// Download and unpack batch file `file_index`.
    #[instrument(skip(self))]
    pub async fn fetch_batch(&self, file_index: u64) -> ArchiveResult<Vec<Block>> {
        let key = self.file_key(file_index);
        let bytes = self
            .store
            .get(&key)
            .await?
            .ok_or_else(|| ArchiveError::Store {
                key: key.clone(),
                reason: "object not found".into(),
            })?;
        let list = self.provider.file_buffer_to_block_list(&bytes).await?;
        Ok(unpack_blocks(&list)?)
    }

    /// Find block `height` through the manifest and fetch it from its batch.
    /// Returns `None` when no archived file covers the height.
    #[instrument(skip(self))]
    pub async fn fetch_block(&self, height: u64) -> ArchiveResult<Option<Block>> {
        let status = self.get_status().await?;
        let Some(file) = status.covers_height(height) else {
            debug!(height, "height not archived");
            return Ok(None);
        };
        let blocks = self.fetch_batch(file.file_index).await?;
        Ok(blocks.into_iter().find(|b| b.header.height == height))
    }

    /// Delete every object under the prefix. Returns the number removed.
    #[instrument(skip(self), fields(prefix = %self.config.store_prefix))]
    pub async fn clean_store(&self) -> ArchiveResult<usize> {
        let keys = self
            .store
            .list(&format!("{}/", self.config.store_prefix))
            .await?;
        for key in &keys {
            self.store.delete(key).await?;
        }
        info!(removed = keys.len(), "store cleaned");
        Ok(keys.len())
    }
}
