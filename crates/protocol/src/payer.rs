use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

use crate::json::{de_string, de_string_list};

/// Outcome of a payer's sufficiency evaluation for one procedure.
///
/// The three known outcomes are matched case-insensitively and shown in
/// canonical case. Any other label is kept verbatim; only a missing or blank
/// decision becomes [`Decision::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Decision {
    Sufficient,
    Insufficient,
    Unclear,
    Other(String),
    #[default]
    Unknown,
}

impl Decision {
    pub const UNKNOWN_SENTINEL: &'static str = "-";

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sufficient" => Decision::Sufficient,
            "insufficient" => Decision::Insufficient,
            "unclear" => Decision::Unclear,
            "" | Self::UNKNOWN_SENTINEL => Decision::Unknown,
            _ => Decision::Other(raw.to_string()),
        }
    }

    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(raw)) => Self::parse(raw),
            _ => Decision::Unknown,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Decision::Sufficient => "Sufficient",
            Decision::Insufficient => "Insufficient",
            Decision::Unclear => "Unclear",
            Decision::Other(raw) => raw,
            Decision::Unknown => Self::UNKNOWN_SENTINEL,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Decision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Decision {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(Self::from_value(value.as_ref()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImprovementRecommendations {
    #[serde(default, deserialize_with = "de_string_list")]
    pub documentation_gaps: Vec<String>,
    #[serde(default, deserialize_with = "de_string_list")]
    pub compliance_actions: Vec<String>,
    #[serde(default, deserialize_with = "de_string")]
    pub priority: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementCheck {
    #[serde(default, deserialize_with = "de_string")]
    pub requirement_id: String,
    #[serde(default, deserialize_with = "de_string")]
    pub status: String,
    #[serde(default, deserialize_with = "de_string")]
    pub missing_to_meet: String,
    #[serde(default, deserialize_with = "de_string")]
    pub suggestion: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One procedure as evaluated against one payer.
///
/// Keys the engine emits beyond the named fields are carried in `extra`, so a
/// narrowed record serializes back to a superset of its source mapping. A
/// non-object `improvement_recommendations` stays in `extra` as sent, with the
/// typed field left `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcedureResult {
    #[serde(default)]
    pub procedure_name: String,
    #[serde(default)]
    pub decision: Decision,
    #[serde(default)]
    pub primary_reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvement_recommendations: Option<ImprovementRecommendations>,
    #[serde(default)]
    pub requirement_checklist: Vec<RequirementCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cms_guidelines_used: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cms_rationale: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayerResult {
    pub payer_name: String,
    pub procedure_count: usize,
    pub procedure_results: Vec<ProcedureResult>,
}

/// Payer key to result, in the order the engine reported them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayerResults(Vec<(String, PayerResult)>);

impl PayerResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, result: PayerResult) {
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = result,
            None => self.0.push((key, result)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PayerResult> {
        self.0
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, result)| result)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PayerResult)> {
        self.0.iter().map(|(key, result)| (key.as_str(), result))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for PayerResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, result) in &self.0 {
            map.serialize_entry(key, result)?;
        }
        map.end()
    }
}
