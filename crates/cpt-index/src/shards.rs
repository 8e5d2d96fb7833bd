use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory-name prefix shared by every payer shard.
pub const SHARD_PREFIX: &str = "extracted_procedures";
/// Token after which the payer name sits, e.g. `..._single_call_Anthem_v2`.
const PAYER_MARKER: &str = "call";

/// One payer-specific directory of procedure records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    pub path: PathBuf,
    pub dir_name: String,
    pub payer: String,
}

impl Shard {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let dir_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let payer = payer_label(&dir_name);
        Self {
            path,
            dir_name,
            payer,
        }
    }

    /// JSON files directly inside the shard, sorted by name.
    pub fn json_files(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Failed to read entry in {}: {e}", self.path.display());
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| is_json(path))
            .collect()
    }
}

/// Immediate subdirectories of `root` that follow the shard naming convention.
///
/// A missing or unreadable root yields no shards.
pub fn discover_shards(root: &Path) -> Vec<Shard> {
    let shards: Vec<Shard> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Failed to read corpus entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir())
        .filter(|entry| is_shard_name(&entry.file_name().to_string_lossy()))
        .map(|entry| Shard::from_path(entry.path()))
        .collect();

    log::info!("Found {} shard directories under {}", shards.len(), root.display());
    shards
}

pub fn is_shard_name(name: &str) -> bool {
    name.starts_with(SHARD_PREFIX)
}

/// Payer display name from a shard directory name.
///
/// The token following the `call` marker, capitalized; the raw directory name
/// when there is no such token.
pub fn payer_label(dir_name: &str) -> String {
    let tokens: Vec<&str> = dir_name.split('_').collect();
    tokens
        .iter()
        .position(|token| *token == PAYER_MARKER)
        .and_then(|idx| tokens.get(idx + 1))
        .filter(|token| !token.is_empty())
        .map(|token| capitalize(token))
        .unwrap_or_else(|| dir_name.to_string())
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
