//! # CDI protocol
//!
//! Data contract shared by the normalizer, the report workbook builder and the
//! CPT reverse index. Upstream records are untrusted: every constructor here is
//! lenient and defaults what it cannot read.

use anyhow::Result;
use serde::{Deserialize, Serialize};

mod cpt;
mod evaluation;
mod fsio;
pub mod json;
mod payer;
mod processing;

pub use cpt::CptIndexEntry;
pub use evaluation::{AggregateMetrics, CdiRecommendation, EvaluationRecord, PayerPerformance};
pub use fsio::write_atomic;
pub use payer::{
    Decision, ImprovementRecommendations, PayerResult, PayerResults, ProcedureResult,
    RequirementCheck,
};
pub use processing::ProcessingResult;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            hint: None,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}
