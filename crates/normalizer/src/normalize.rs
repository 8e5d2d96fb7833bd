use cdi_protocol::json::{as_f64_lenient, coerce_list};
use cdi_protocol::{PayerResults, ProcessingResult};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::introspect::serialize_deep;
use crate::narrow::narrow_payer_results;

/// Response contract consumed by the display client.
///
/// Procedure and code lists appear under both singular and plural keys, and
/// payer results appear both here and inside `results`: two client shapes read
/// this payload and each expects its own keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedResponse {
    pub success: bool,
    pub display_name: String,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub procedure: Vec<Value>,
    pub procedures: Vec<Value>,
    pub cpt: Vec<Value>,
    pub cpt_codes: Vec<Value>,
    pub payer_results: PayerResults,
    pub results: DisplayResults,
    pub raw_result: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayResults {
    pub file_name: String,
    pub extraction_data: Map<String, Value>,
    pub payer_results: PayerResults,
    pub payer_summary: Value,
    pub total_cost: f64,
    pub execution_times: BTreeMap<String, f64>,
    pub usage: Value,
    pub sources: Vec<Value>,
    pub numbered_medical_chart: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_chart_info: Option<Value>,
    pub procedure: Vec<Value>,
    pub procedures: Vec<Value>,
    pub cpt: Vec<Value>,
    pub cpt_codes: Vec<Value>,
}

/// Map one engine result into the display contract. Never fails; the input is
/// only borrowed.
pub fn normalize(result: &ProcessingResult, display_name: &str) -> NormalizedResponse {
    let mut extraction_data = match &result.extraction_data {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    let procedures = first_list(&extraction_data, &["procedure", "procedures"]);
    let cpt_codes = first_list(&extraction_data, &["cpt", "cpt_codes"]);
    for key in ["procedure", "procedures"] {
        extraction_data.insert(key.to_string(), Value::Array(procedures.clone()));
    }
    for key in ["cpt", "cpt_codes"] {
        extraction_data.insert(key.to_string(), Value::Array(cpt_codes.clone()));
    }

    let payer_results = narrow_payer_results(result.payer_results.as_ref());
    let total_cost = coerce_cost(result.total_cost.as_ref());
    let execution_times = coerce_execution_times(result.execution_times.as_ref());

    let file_name = result
        .file_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| display_name.to_string());

    let mut raw_result = serialize_deep(result);
    if let Value::Object(mirror) = &mut raw_result {
        mirror.insert("total_cost".to_string(), float_value(total_cost));
        mirror.insert(
            "execution_times".to_string(),
            Value::Object(
                execution_times
                    .iter()
                    .map(|(payer, secs)| (payer.clone(), float_value(*secs)))
                    .collect(),
            ),
        );
    }

    let results = DisplayResults {
        file_name: file_name.clone(),
        extraction_data,
        payer_results: payer_results.clone(),
        payer_summary: object_or_empty(result.payer_summary.as_ref()),
        total_cost,
        execution_times,
        usage: object_or_empty(result.usage.as_ref()),
        sources: coerce_list(result.sources.as_ref()),
        numbered_medical_chart: result
            .numbered_medical_chart
            .clone()
            .unwrap_or_else(|| Value::String(String::new())),
        multi_chart_info: result.multi_chart_info.clone(),
        procedure: procedures.clone(),
        procedures: procedures.clone(),
        cpt: cpt_codes.clone(),
        cpt_codes: cpt_codes.clone(),
    };

    NormalizedResponse {
        success: result.error.is_none(),
        display_name: display_name.to_string(),
        file_name,
        error: result.error.clone(),
        procedure: procedures.clone(),
        procedures,
        cpt: cpt_codes.clone(),
        cpt_codes,
        payer_results,
        results,
        raw_result,
    }
}

/// First key holding a truthy value wins; scalars become singletons.
fn first_list(data: &Map<String, Value>, keys: &[&str]) -> Vec<Value> {
    keys.iter()
        .map(|key| coerce_list(data.get(*key)))
        .find(|list| !list.is_empty())
        .unwrap_or_default()
}

fn coerce_cost(raw: Option<&Value>) -> f64 {
    raw.and_then(as_f64_lenient)
        .filter(|cost| cost.is_finite())
        .unwrap_or(0.0)
}

fn coerce_execution_times(raw: Option<&Value>) -> BTreeMap<String, f64> {
    let Some(Value::Object(times)) = raw else {
        return BTreeMap::new();
    };
    times
        .iter()
        .filter_map(|(payer, secs)| {
            as_f64_lenient(secs)
                .filter(|secs| secs.is_finite())
                .map(|secs| (payer.clone(), secs))
        })
        .collect()
}

fn object_or_empty(raw: Option<&Value>) -> Value {
    match raw {
        Some(value @ Value::Object(_)) => value.clone(),
        Some(Value::Null) | None => Value::Object(Map::new()),
        Some(other) => other.clone(),
    }
}

fn float_value(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdi_protocol::Decision;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> ProcessingResult {
        ProcessingResult::from(json!({
            "file_name": "chart_01.pdf",
            "extraction_data": {"procedure": "Shoulder arthroscopy", "cpt": "29827", "age": 54},
            "payer_results": {
                "anthem": {
                    "payer_name": "Anthem",
                    "procedure_results": [{"procedure_name": "Shoulder arthroscopy"}]
                }
            },
            "total_cost": "0.0421",
            "execution_times": {"anthem": 2, "cigna": "1.5", "broken": "soon"},
            "sources": "policy.pdf"
        }))
    }

    #[test]
    fn scalar_extraction_fields_become_lists() {
        let out = normalize(&sample(), "chart_01");
        assert_eq!(out.cpt_codes, vec![json!("29827")]);
        assert_eq!(out.cpt, out.cpt_codes);
        assert_eq!(out.procedures, vec![json!("Shoulder arthroscopy")]);
        assert_eq!(out.results.extraction_data["cpt_codes"], json!(["29827"]));
        assert_eq!(out.results.extraction_data["age"], json!(54));
        assert_eq!(out.results.sources, vec![json!("policy.pdf")]);
    }

    #[test]
    fn absent_extraction_data_yields_empty_lists() {
        let out = normalize(&ProcessingResult::default(), "empty");
        assert!(out.cpt_codes.is_empty());
        assert!(out.procedure.is_empty());
        assert_eq!(out.results.extraction_data["procedures"], json!([]));
        assert_eq!(out.file_name, "empty");
        assert!(out.success);
        assert_eq!(out.results.total_cost, 0.0);
    }

    #[test]
    fn plural_keys_are_read_when_singular_missing() {
        let result = ProcessingResult::from(json!({
            "extraction_data": {"procedures": ["A", "B"], "cpt": false, "cpt_codes": ["1", "2"]}
        }));
        let out = normalize(&result, "x");
        assert_eq!(out.procedure, vec![json!("A"), json!("B")]);
        assert_eq!(out.cpt, vec![json!("1"), json!("2")]);
    }

    #[test]
    fn cost_and_times_are_coerced_to_floats() {
        let out = normalize(&sample(), "chart_01");
        assert_eq!(out.results.total_cost, 0.0421);
        assert_eq!(out.results.execution_times.len(), 2);
        assert_eq!(out.results.execution_times["cigna"], 1.5);
        assert_eq!(out.raw_result["total_cost"], json!(0.0421));
        assert_eq!(out.raw_result["execution_times"]["anthem"], json!(2.0));
    }

    #[test]
    fn payer_results_are_duplicated_top_level_and_nested() {
        let out = normalize(&sample(), "chart_01");
        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(value["payer_results"], value["results"]["payer_results"]);
        assert_eq!(
            value["payer_results"]["anthem"]["procedure_results"][0]["decision"],
            json!("-")
        );
        assert_eq!(
            out.payer_results.get("anthem").unwrap().procedure_results[0].decision,
            Decision::Unknown
        );
    }

    #[test]
    fn input_is_left_untouched() {
        let result = sample();
        let before = result.clone();
        let _ = normalize(&result, "chart_01");
        assert_eq!(result, before);
    }

    #[test]
    fn error_marks_response_unsuccessful() {
        let out = normalize(&ProcessingResult::failed("engine offline"), "chart");
        assert!(!out.success);
        assert_eq!(out.error.as_deref(), Some("engine offline"));
        assert_eq!(out.raw_result["error"], json!("engine offline"));
    }
}
