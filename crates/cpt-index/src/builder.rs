use crate::error::{CptIndexError, Result};
use crate::record::ProcedureRecord;
use crate::shards::{discover_shards, Shard};
use crate::stats::ScanStats;
use cdi_protocol::CptIndexEntry;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Sorted, deduplicated reverse index plus scan statistics.
#[derive(Debug, Clone, Default)]
pub struct CptIndex {
    pub entries: Vec<CptIndexEntry>,
    pub stats: ScanStats,
}

/// Builds a [`CptIndex`] from a corpus root and a target code set.
pub struct CptIndexBuilder {
    root: PathBuf,
    targets: BTreeSet<String>,
}

impl CptIndexBuilder {
    pub fn new(root: impl AsRef<Path>, targets: BTreeSet<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            targets,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Discover shards under the root and index them.
    pub fn build(&self) -> Result<CptIndex> {
        if self.targets.is_empty() {
            return Err(CptIndexError::NoTargets);
        }
        let shards = discover_shards(&self.root);
        if shards.is_empty() {
            return Err(CptIndexError::NoShards(self.root.clone()));
        }
        Ok(self.index_shards(&shards))
    }

    /// Index the given shards; the result does not depend on their order.
    pub fn index_shards(&self, shards: &[Shard]) -> CptIndex {
        let started = Instant::now();
        let mut stats = ScanStats::new();
        let mut seen = HashSet::new();

        for shard in shards {
            stats.add_shard();
            for path in shard.json_files() {
                let record = match ProcedureRecord::load(&path) {
                    Ok(record) => record,
                    Err(reason) => {
                        log::debug!("Skipping {}: {reason}", path.display());
                        stats.add_skipped();
                        continue;
                    }
                };

                let codes = record.matching_codes(&self.targets);
                stats.add_file(codes.len());
                if codes.is_empty() {
                    continue;
                }

                let procedure = record.display_name();
                let source_file = source_file(shard, &path);
                for code in codes {
                    seen.insert(CptIndexEntry::new(
                        code,
                        procedure.clone(),
                        shard.payer.clone(),
                        source_file.clone(),
                    ));
                }
            }
        }

        let mut entries: Vec<CptIndexEntry> = seen.into_iter().collect();
        entries.sort();
        stats.entries = entries.len();
        stats.time_ms = started.elapsed().as_millis() as u64;

        log::info!(
            "Indexed {} shards: {} files scanned, {} skipped, {} rows",
            stats.shards,
            stats.files_scanned,
            stats.files_skipped,
            stats.entries
        );
        CptIndex { entries, stats }
    }
}

/// `<shard dir>/<file name>` relative to the corpus root.
fn source_file(shard: &Shard, path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}/{}", shard.dir_name, file_name)
}
