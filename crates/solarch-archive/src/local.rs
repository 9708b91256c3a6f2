//! Scratch-directory file helpers.

use crate::error::ArchiveResult;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Files directly inside `dir` whose name ends with `suffix`, sorted by name.
/// A missing directory has no files.
pub async fn list_files_with_suffix(dir: &Path, suffix: &str) -> ArchiveResult<Vec<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(suffix));
        if matches && entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Read a whole file.
pub async fn read_file(path: &Path) -> ArchiveResult<Vec<u8>> {
    Ok(tokio::fs::read(path).await?)
}

/// Write a whole file, creating parent directories.
pub async fn write_file(path: &Path, data: &[u8]) -> ArchiveResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, data).await?;
    debug!(path = %path.display(), bytes = data.len(), "wrote file");
    Ok(())
}
