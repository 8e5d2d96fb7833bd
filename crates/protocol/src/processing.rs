use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::json::as_display_string;

/// Output of the external evaluation engine for one chart (or a combined batch).
///
/// Every field is optional and untrusted. Construction from JSON never fails:
/// a non-object document yields an empty result, and keys this type does not
/// name are kept in [`ProcessingResult::extra`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ProcessingResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_results: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_summary: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_times: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numbered_medical_chart: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_chart_info: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProcessingResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl From<Value> for ProcessingResult {
    fn from(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return Self::default();
        };
        let mut take = |key: &str| map.remove(key).filter(|v| !v.is_null());

        let file_name = take("file_name").map(|v| as_display_string(&v));
        let extraction_data = take("extraction_data");
        let payer_results = take("payer_results");
        let payer_summary = take("payer_summary");
        let total_cost = take("total_cost");
        let execution_times = take("execution_times");
        let usage = take("usage");
        let sources = take("sources");
        let numbered_medical_chart = take("numbered_medical_chart");
        let multi_chart_info = take("multi_chart_info");
        let error = take("error")
            .map(|v| as_display_string(&v))
            .filter(|message| !message.trim().is_empty());

        Self {
            file_name,
            extraction_data,
            payer_results,
            payer_summary,
            total_cost,
            execution_times,
            usage,
            sources,
            numbered_medical_chart,
            multi_chart_info,
            error,
            extra: map,
        }
    }
}
