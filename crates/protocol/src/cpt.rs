use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One row of the CPT reverse index.
///
/// Ordered by `(code, payer, procedure)`, with `source_file` as the final
/// tie-breaker so that the order stays total under exact-value equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CptIndexEntry {
    pub code: String,
    pub procedure: String,
    pub payer: String,
    pub source_file: String,
}

impl CptIndexEntry {
    pub fn new(
        code: impl Into<String>,
        procedure: impl Into<String>,
        payer: impl Into<String>,
        source_file: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            procedure: procedure.into(),
            payer: payer.into(),
            source_file: source_file.into(),
        }
    }
}

impl Ord for CptIndexEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.code
            .cmp(&other.code)
            .then_with(|| self.payer.cmp(&other.payer))
            .then_with(|| self.procedure.cmp(&other.procedure))
            .then_with(|| self.source_file.cmp(&other.source_file))
    }
}

impl PartialOrd for CptIndexEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
