use serde::{Deserialize, Serialize};

/// Statistics about a CPT index scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Number of shard directories visited
    pub shards: usize,

    /// Number of record files parsed
    pub files_scanned: usize,

    /// Files that could not be read or parsed
    pub files_skipped: usize,

    /// Matching (code, record) pairs before deduplication
    pub matches: usize,

    /// Rows remaining after deduplication
    pub entries: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_shard(&mut self) {
        self.shards += 1;
    }

    pub fn add_file(&mut self, matches: usize) {
        self.files_scanned += 1;
        self.matches += matches;
    }

    pub fn add_skipped(&mut self) {
        self.files_skipped += 1;
    }
}
