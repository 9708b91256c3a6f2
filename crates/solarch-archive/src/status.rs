//! Archive status manifest: which batch files exist and what they cover.

use serde::{Deserialize, Serialize};

/// Height range covered by one uploaded batch file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatus {
    /// Index used in the object key `files/{fileIndex}{suffix}`.
    pub file_index: u64,
    /// Lowest block height in the file.
    pub min_height: u64,
    /// Highest block height in the file.
    pub max_height: u64,
}

/// Manifest stored next to the batch files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveStatus {
    /// Last fully archived epoch.
    #[serde(default)]
    pub last_epoch: Option<u64>,
    /// Last archived slot.
    #[serde(default)]
    pub last_slot: Option<u64>,
    /// Uploaded batch files in upload order.
    #[serde(default)]
    pub files: Vec<FileStatus>,
}

impl ArchiveStatus {
    /// Index for the next batch file.
    pub fn next_file_index(&self) -> u64 {
        self.files
            .iter()
            .map(|f| f.file_index + 1)
            .max()
            .unwrap_or(0)
    }

    /// Record a file, replacing an earlier entry with the same index.
    pub fn record_file(&mut self, file: FileStatus) {
        match self.files.iter_mut().find(|f| f.file_index == file.file_index) {
            Some(existing) => *existing = file,
            None => self.files.push(file),
        }
    }

    /// File holding block `height`, if any.
    pub fn covers_height(&self, height: u64) -> Option<&FileStatus> {
        self.files
            .iter()
            .find(|f| (f.min_height..=f.max_height).contains(&height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(i: u64, lo: u64, hi: u64) -> FileStatus {
        FileStatus {
            file_index: i,
            min_height: lo,
            max_height: hi,
        }
    }

    #[test]
    fn test_empty_status() {
        let s = ArchiveStatus::default();
        assert_eq!(s.next_file_index(), 0);
        assert_eq!(s.covers_height(5), None);
    }

    #[test]
    fn test_record_and_lookup() {
        let mut s = ArchiveStatus::default();
        s.record_file(file(0, 100, 199));
        s.record_file(file(1, 200, 250));
        assert_eq!(s.next_file_index(), 2);
        assert_eq!(s.covers_height(200).map(|f| f.file_index), Some(1));
        assert_eq!(s.covers_height(199).map(|f| f.file_index), Some(0));
        assert_eq!(s.covers_height(251), None);

        s.record_file(file(1, 200, 260));
        assert_eq!(s.files.len(), 2);
        assert_eq!(s.covers_height(260).map(|f| f.file_index), Some(1));
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let mut s = ArchiveStatus {
            last_epoch: Some(600),
            last_slot: Some(259_200_000),
            files: vec![],
        };
        s.record_file(file(0, 1, 2));
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "lastEpoch": 600,
                "lastSlot": 259200000,
                "files": [{"fileIndex": 0, "minHeight": 1, "maxHeight": 2}]
            })
        );
        let partial: ArchiveStatus = serde_json::from_str(r#"{"files":[]}"#).unwrap();
        assert_eq!(partial, ArchiveStatus::default());
    }
}
