pub(crate) mod cpt_index;
pub(crate) mod normalize;
pub(crate) mod report;

use anyhow::{Context as AnyhowContext, Result};
use serde_json::Value;
use std::path::Path;

pub(crate) fn read_json(path: &Path) -> Result<Value> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("Invalid JSON in {}", path.display()))
}
