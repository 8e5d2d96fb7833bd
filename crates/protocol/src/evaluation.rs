use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::json::{as_f64_lenient, de_f64, de_item_list, de_string, de_string_list, de_truthy};

/// One CDI recommendation attached to an evaluated chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdiRecommendation {
    #[serde(deserialize_with = "de_string")]
    pub payer: String,
    #[serde(deserialize_with = "de_string")]
    pub procedure: String,
    #[serde(deserialize_with = "de_string")]
    pub decision: String,
    #[serde(deserialize_with = "de_string_list")]
    pub primary_reasons: Vec<String>,
    #[serde(deserialize_with = "de_string_list")]
    pub missing_requirements: Vec<String>,
    #[serde(deserialize_with = "de_string_list")]
    pub suggestions: Vec<String>,
}

/// Per-chart evaluation outcome, as fed to the report builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationRecord {
    #[serde(deserialize_with = "de_string")]
    pub chart_name: String,
    #[serde(deserialize_with = "de_truthy")]
    pub success: bool,
    #[serde(deserialize_with = "de_f64")]
    pub overall_score: f64,
    #[serde(deserialize_with = "de_f64")]
    pub coverage_score: f64,
    #[serde(deserialize_with = "de_f64")]
    pub quality_score: f64,
    #[serde(deserialize_with = "de_f64")]
    pub completeness_score: f64,
    #[serde(deserialize_with = "de_f64")]
    pub accuracy_score: f64,
    #[serde(deserialize_with = "de_f64")]
    pub processing_time: f64,
    #[serde(deserialize_with = "de_item_list")]
    pub matched_improvements: Vec<String>,
    #[serde(deserialize_with = "de_item_list")]
    pub missed_improvements: Vec<String>,
    #[serde(deserialize_with = "de_item_list")]
    pub extra_improvements: Vec<String>,
    #[serde(deserialize_with = "de_string_list")]
    pub strengths: Vec<String>,
    #[serde(deserialize_with = "de_string_list")]
    pub weaknesses: Vec<String>,
    #[serde(deserialize_with = "de_string_list")]
    pub primary_focus: Vec<String>,
    #[serde(deserialize_with = "de_string_list")]
    pub expected_improvements: Vec<String>,
    #[serde(deserialize_with = "de_recommendations")]
    pub cdi_recommendations: Vec<CdiRecommendation>,
}

fn de_recommendations<'de, D>(deserializer: D) -> Result<Vec<CdiRecommendation>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PayerPerformance {
    pub charts_evaluated: f64,
    pub avg_overall_score: f64,
    pub avg_coverage_score: f64,
    pub avg_quality_score: f64,
    pub avg_completeness_score: f64,
}

/// Aggregate metrics over a batch of evaluations.
///
/// Kept as an open mapping: producers add keys over time and the report reads
/// only the ones it knows, defaulting the rest to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateMetrics(pub Map<String, Value>);

impl AggregateMetrics {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Numeric metric, `0.0` when missing or not numeric.
    pub fn number(&self, key: &str) -> f64 {
        self.0.get(key).and_then(as_f64_lenient).unwrap_or(0.0)
    }

    /// `payer_performance` entries in input order; non-object entries read as zeros.
    pub fn payer_performance(&self) -> Vec<(String, PayerPerformance)> {
        let Some(Value::Object(payers)) = self.0.get("payer_performance") else {
            return Vec::new();
        };
        payers
            .iter()
            .map(|(payer, stats)| (payer.clone(), read_payer_performance(stats)))
            .collect()
    }
}

fn read_payer_performance(stats: &Value) -> PayerPerformance {
    let Value::Object(stats) = stats else {
        return PayerPerformance::default();
    };
    let number = |key: &str| stats.get(key).and_then(as_f64_lenient);
    PayerPerformance {
        charts_evaluated: number("charts_evaluated")
            .or_else(|| number("chart_count"))
            .unwrap_or(0.0),
        avg_overall_score: number("avg_overall_score").unwrap_or(0.0),
        avg_coverage_score: number("avg_coverage_score").unwrap_or(0.0),
        avg_quality_score: number("avg_quality_score").unwrap_or(0.0),
        avg_completeness_score: number("avg_completeness_score").unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn evaluation_record_tolerates_loose_fields() {
        let record: EvaluationRecord = serde_json::from_value(json!({
            "chart_name": "chart_01",
            "success": 1,
            "overall_score": "87.5",
            "coverage_score": null,
            "strengths": "clear history",
            "weaknesses": null,
            "cdi_recommendations": [
                {"payer": "Anthem", "procedure": "Arthroscopy", "decision": "Insufficient",
                 "missing_requirements": ["imaging report"]},
                "not a recommendation"
            ]
        }))
        .unwrap();

        assert!(record.success);
        assert_eq!(record.overall_score, 87.5);
        assert_eq!(record.coverage_score, 0.0);
        assert_eq!(record.strengths, vec!["clear history".to_string()]);
        assert!(record.weaknesses.is_empty());
        assert_eq!(record.cdi_recommendations.len(), 1);
        assert_eq!(record.cdi_recommendations[0].missing_requirements, vec!["imaging report"]);
        assert!(record.cdi_recommendations[0].suggestions.is_empty());
    }

    #[test]
    fn improvement_lists_keep_every_entry() {
        let record: EvaluationRecord = serde_json::from_value(json!({
            "matched_improvements": ["", "laterality", " "],
            "missed_improvements": "imaging",
            "extra_improvements": null
        }))
        .unwrap();

        assert_eq!(record.matched_improvements.len(), 3);
        assert_eq!(record.missed_improvements, vec!["imaging"]);
        assert!(record.extra_improvements.is_empty());
    }

    #[test]
    fn metrics_default_to_zero() {
        let metrics: AggregateMetrics = serde_json::from_value(json!({
            "total_charts": 4,
            "success_rate": "75.0",
            "payer_performance": {
                "Cigna": {"chart_count": 2, "avg_overall_score": 80.123},
                "Anthem": "broken"
            }
        }))
        .unwrap();

        assert_eq!(metrics.number("total_charts"), 4.0);
        assert_eq!(metrics.number("success_rate"), 75.0);
        assert_eq!(metrics.number("missing"), 0.0);

        let payers = metrics.payer_performance();
        assert_eq!(payers.len(), 2);
        assert_eq!(payers[0].0, "Cigna");
        assert_eq!(payers[0].1.charts_evaluated, 2.0);
        assert_eq!(payers[1].1, PayerPerformance::default());
    }
}
