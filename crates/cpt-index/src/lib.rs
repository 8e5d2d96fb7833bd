//! # CDI CPT Index
//!
//! Reverse index from CPT billing codes to the payer procedure records that
//! cite them.
//!
//! ## Pipeline
//!
//! ```text
//! Corpus root
//!     │
//!     ├──> Shard discovery (extracted_procedures*)
//!     │      └─> Payer label per shard
//!     │
//!     ├──> Record scan (*.json, bad files skipped)
//!     │      └─> CPT entries matching the target set
//!     │
//!     └──> Dedup + sort (code, payer, procedure)
//!            └─> Tab-separated report
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use cdi_cpt_index::{normalize_targets, write_tsv, CptIndexBuilder};
//! use std::path::Path;
//!
//! fn main() -> cdi_cpt_index::Result<()> {
//!     let targets = normalize_targets(["29827,29828"]);
//!     let index = CptIndexBuilder::new("corpus", targets).build()?;
//!     write_tsv(&index.entries, Path::new("cpt_index.tsv"))?;
//!
//!     println!("{} rows from {} files", index.stats.entries, index.stats.files_scanned);
//!     Ok(())
//! }
//! ```

mod builder;
mod error;
mod output;
mod record;
mod shards;
mod stats;
mod targets;

pub use builder::{CptIndex, CptIndexBuilder};
pub use error::{CptIndexError, Result};
pub use output::{default_output_path, render_tsv, write_tsv, TSV_HEADER};
pub use record::{ProcedureRecord, SkipReason};
pub use shards::{discover_shards, is_shard_name, payer_label, Shard, SHARD_PREFIX};
pub use stats::ScanStats;
pub use targets::{normalize_targets, read_codes_file};
