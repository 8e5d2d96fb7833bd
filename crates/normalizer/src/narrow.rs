//! Untyped engine payloads narrowed into typed payer/procedure records.
//!
//! Malformed entries are dropped, not reported: a non-object payer entry or a
//! non-object procedure entry simply does not appear in the output.

use cdi_protocol::json::{as_display_string, as_f64_lenient, string_list};
use cdi_protocol::{
    Decision, ImprovementRecommendations, PayerResult, PayerResults, ProcedureResult,
    RequirementCheck,
};
use serde_json::{Map, Value};

pub(crate) fn narrow_payer_results(raw: Option<&Value>) -> PayerResults {
    let mut results = PayerResults::new();
    let Some(Value::Object(payers)) = raw else {
        return results;
    };

    for (key, entry) in payers {
        let Value::Object(entry) = entry else {
            log::debug!("Dropping non-object payer entry {key}");
            continue;
        };
        results.insert(key.clone(), narrow_payer(key, entry));
    }
    results
}

fn narrow_payer(key: &str, entry: &Map<String, Value>) -> PayerResult {
    let payer_name = entry
        .get("payer_name")
        .map(as_display_string)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| key.to_string());

    let procedure_results: Vec<ProcedureResult> = match entry.get("procedure_results") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(procedure) => Some(narrow_procedure(procedure)),
                _ => {
                    log::debug!("Dropping non-object procedure entry under payer {key}");
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    let procedure_count = entry
        .get("procedure_count")
        .and_then(as_f64_lenient)
        .filter(|count| *count >= 0.0)
        .map(|count| count as usize)
        .unwrap_or(procedure_results.len());

    PayerResult {
        payer_name,
        procedure_count,
        procedure_results,
    }
}

/// Shallow copy of one procedure mapping with the known keys typed.
pub(crate) fn narrow_procedure(entry: &Map<String, Value>) -> ProcedureResult {
    let mut extra = entry.clone();

    let procedure_name = extra
        .remove("procedure_name")
        .map(|v| as_display_string(&v))
        .unwrap_or_default();
    let decision = Decision::from_value(extra.remove("decision").as_ref());
    let primary_reasons = string_list(extra.remove("primary_reasons").as_ref());
    let improvement_recommendations = match extra.remove("improvement_recommendations") {
        None | Some(Value::Null) => Some(ImprovementRecommendations::default()),
        Some(Value::Object(fields)) => Some(
            serde_json::from_value(Value::Object(fields.clone())).unwrap_or_else(|_| {
                ImprovementRecommendations {
                    extra: fields,
                    ..ImprovementRecommendations::default()
                }
            }),
        ),
        Some(other) => {
            extra.insert("improvement_recommendations".to_string(), other);
            None
        }
    };
    let requirement_checklist = match extra.remove("requirement_checklist") {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value::<RequirementCheck>(item).ok())
            .collect(),
        _ => Vec::new(),
    };
    let cms_guidelines_used = extra.remove("cms_guidelines_used").filter(|v| !v.is_null());
    let cms_rationale = extra
        .remove("cms_rationale")
        .map(|v| as_display_string(&v))
        .filter(|text| !text.trim().is_empty());

    ProcedureResult {
        procedure_name,
        decision,
        primary_reasons,
        improvement_recommendations,
        requirement_checklist,
        cms_guidelines_used,
        cms_rationale,
        extra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn payer_name_defaults_to_key() {
        let raw = json!({
            "anthem": {"procedure_results": []},
            "cigna": {"payer_name": "Cigna Healthcare", "procedure_results": "oops"},
            "broken": 42
        });
        let results = narrow_payer_results(Some(&raw));

        assert_eq!(results.len(), 2);
        assert_eq!(results.get("anthem").unwrap().payer_name, "anthem");
        assert_eq!(results.get("cigna").unwrap().payer_name, "Cigna Healthcare");
        assert!(results.get("cigna").unwrap().procedure_results.is_empty());
        assert!(results.get("broken").is_none());
    }

    #[test]
    fn procedure_entries_get_decision_default() {
        let raw = json!({
            "anthem": {
                "procedure_count": 3,
                "procedure_results": [
                    {"procedure_name": "Arthroscopy", "custom_flag": true},
                    "not a mapping",
                    {"procedure_name": "Repair", "decision": "SUFFICIENT"}
                ]
            }
        });
        let results = narrow_payer_results(Some(&raw));
        let anthem = results.get("anthem").unwrap();

        assert_eq!(anthem.procedure_count, 3);
        assert_eq!(anthem.procedure_results.len(), 2);
        assert_eq!(anthem.procedure_results[0].decision, Decision::Unknown);
        assert_eq!(anthem.procedure_results[0].extra.get("custom_flag"), Some(&json!(true)));
        assert_eq!(anthem.procedure_results[1].decision, Decision::Sufficient);
    }

    #[test]
    fn typed_fields_are_read_leniently() {
        let entry = json!({
            "procedure_name": "Rotator cuff repair",
            "decision": "Insufficient",
            "primary_reasons": "No imaging documented",
            "improvement_recommendations": {
                "documentation_gaps": ["MRI report"],
                "compliance_actions": "Attach MRI",
                "priority": "high"
            },
            "requirement_checklist": [
                {"requirement_id": "R1", "status": "missing", "missing_to_meet": "MRI", "suggestion": "Add MRI"},
                7
            ],
            "cms_rationale": ""
        });
        let Value::Object(entry) = entry else { unreachable!() };
        let procedure = narrow_procedure(&entry);

        assert_eq!(procedure.primary_reasons, vec!["No imaging documented"]);
        let recs = procedure.improvement_recommendations.as_ref().unwrap();
        assert_eq!(recs.compliance_actions, vec!["Attach MRI"]);
        assert_eq!(recs.priority, "high");
        assert_eq!(procedure.requirement_checklist.len(), 1);
        assert_eq!(procedure.requirement_checklist[0].requirement_id, "R1");
        assert_eq!(procedure.cms_rationale, None);
        assert!(procedure.extra.is_empty());
    }

    #[test]
    fn nested_unknown_keys_survive_narrowing() {
        let entry = json!({
            "procedure_name": "Rotator cuff repair",
            "decision": "Needs Review",
            "improvement_recommendations": {"priority": "high", "timeline": "30 days"},
            "requirement_checklist": [
                {"requirement_id": "R1", "status": "met", "evidence": "MRI 2024-01-02", "requirement_type": "imaging"}
            ]
        });
        let Value::Object(entry) = entry else { unreachable!() };
        let value = serde_json::to_value(narrow_procedure(&entry)).unwrap();

        assert_eq!(value["decision"], json!("Needs Review"));
        assert_eq!(value["improvement_recommendations"]["timeline"], json!("30 days"));
        assert_eq!(value["requirement_checklist"][0]["evidence"], json!("MRI 2024-01-02"));
        assert_eq!(value["requirement_checklist"][0]["requirement_type"], json!("imaging"));
    }

    #[test]
    fn scalar_recommendations_are_kept_as_sent() {
        let entry = json!({"procedure_name": "Repair", "improvement_recommendations": "see notes"});
        let Value::Object(entry) = entry else { unreachable!() };
        let procedure = narrow_procedure(&entry);

        assert_eq!(procedure.improvement_recommendations, None);
        let value = serde_json::to_value(&procedure).unwrap();
        assert_eq!(value["improvement_recommendations"], json!("see notes"));
        assert_eq!(value["decision"], json!("-"));
    }
}
