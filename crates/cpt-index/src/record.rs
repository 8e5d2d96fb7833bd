use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::Path;

/// Coding system accepted by the index.
const CPT_SYSTEM: &str = "CPT";

/// Why a record file was not indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Unreadable(String),
    InvalidJson(String),
    NotAnObject,
    CodesNotAList,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreadable(e) => write!(f, "unreadable: {e}"),
            Self::InvalidJson(e) => write!(f, "invalid JSON: {e}"),
            Self::NotAnObject => f.write_str("top level is not an object"),
            Self::CodesNotAList => f.write_str("`codes` is not a list"),
        }
    }
}

/// A parsed procedure record with a list-typed `codes` field.
#[derive(Debug, Clone)]
pub struct ProcedureRecord {
    fields: Map<String, Value>,
    stem: String,
}

impl ProcedureRecord {
    pub fn load(path: &Path) -> Result<Self, SkipReason> {
        let bytes = std::fs::read(path).map_err(|e| SkipReason::Unreadable(e.to_string()))?;
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| SkipReason::InvalidJson(e.to_string()))?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_value(value, stem)
    }

    pub fn from_value(value: Value, stem: impl Into<String>) -> Result<Self, SkipReason> {
        let Value::Object(fields) = value else {
            return Err(SkipReason::NotAnObject);
        };
        match fields.get("codes") {
            Some(Value::Array(_)) => Ok(Self {
                fields,
                stem: stem.into(),
            }),
            _ => Err(SkipReason::CodesNotAList),
        }
    }

    /// Human-readable procedure name.
    ///
    /// First non-blank of `id`, `section_title`, the first string in `names`,
    /// `title`; the file stem otherwise.
    pub fn display_name(&self) -> String {
        let first_name = match self.fields.get("names") {
            Some(Value::Array(names)) => names.iter().find_map(Value::as_str),
            _ => None,
        };
        [
            self.text("id"),
            self.text("section_title"),
            first_name,
            self.text("title"),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| self.stem.clone())
    }

    /// Target codes carried by this record's CPT entries, in entry order.
    pub fn matching_codes(&self, targets: &BTreeSet<String>) -> Vec<String> {
        let Some(Value::Array(entries)) = self.fields.get("codes") else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(Value::as_object)
            .filter(|entry| is_cpt(entry.get("system")))
            .filter_map(|entry| code_value(entry.get("code")))
            .filter(|code| targets.contains(code))
            .collect()
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

fn is_cpt(system: Option<&Value>) -> bool {
    system
        .and_then(Value::as_str)
        .is_some_and(|s| s.trim().to_uppercase() == CPT_SYSTEM)
}

fn code_value(code: Option<&Value>) -> Option<String> {
    match code? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn targets(codes: &[&str]) -> BTreeSet<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    fn record(value: Value) -> ProcedureRecord {
        ProcedureRecord::from_value(value, "shoulder_scope").unwrap()
    }

    #[test]
    fn system_match_ignores_case_and_whitespace() {
        let rec = record(json!({"codes": [
            {"system": "cpt ", "code": " 29827"},
            {"system": "ICD-10", "code": "29827"},
            {"system": "CPT", "code": "29828"},
            "29827",
        ]}));
        assert_eq!(rec.matching_codes(&targets(&["29827"])), vec!["29827"]);
    }

    #[test]
    fn code_match_is_exact() {
        let rec = record(json!({"codes": [{"system": "CPT", "code": "0042t"}]}));
        assert!(rec.matching_codes(&targets(&["0042T"])).is_empty());
        assert_eq!(rec.matching_codes(&targets(&["0042t"])), vec!["0042t"]);
    }

    #[test]
    fn numeric_codes_are_compared_as_text() {
        let rec = record(json!({"codes": [{"system": "CPT", "code": 29827}]}));
        assert_eq!(rec.matching_codes(&targets(&["29827"])), vec!["29827"]);
    }

    #[test]
    fn display_name_priority() {
        let rec = record(json!({"codes": [], "id": " ", "section_title": "Arthroscopy", "title": "T"}));
        assert_eq!(rec.display_name(), "Arthroscopy");

        let rec = record(json!({"codes": [], "names": [3, "Rotator cuff repair"], "title": "T"}));
        assert_eq!(rec.display_name(), "Rotator cuff repair");

        let rec = record(json!({"codes": [], "id": "PROC-1", "title": "T"}));
        assert_eq!(rec.display_name(), "PROC-1");

        let rec = record(json!({"codes": [], "title": ""}));
        assert_eq!(rec.display_name(), "shoulder_scope");
    }

    #[test]
    fn rejects_malformed_records() {
        assert_eq!(
            ProcedureRecord::from_value(json!([1, 2]), "x").unwrap_err(),
            SkipReason::NotAnObject
        );
        assert_eq!(
            ProcedureRecord::from_value(json!({"codes": "29827"}), "x").unwrap_err(),
            SkipReason::CodesNotAList
        );
        assert_eq!(
            ProcedureRecord::from_value(json!({"title": "x"}), "x").unwrap_err(),
            SkipReason::CodesNotAList
        );
    }
}
