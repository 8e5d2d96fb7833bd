use cdi_protocol::json::round_to;
use cdi_protocol::{AggregateMetrics, EvaluationRecord};

use crate::table::{bounded_join, join_list, CellValue, SheetTable};

pub const SUMMARY_SHEET: &str = "Summary";
pub const PAYER_PERFORMANCE_SHEET: &str = "Payer Performance";
pub const CHART_DETAILS_SHEET: &str = "Chart Details";
pub const CDI_RECOMMENDATIONS_SHEET: &str = "CDI Recommendations";

pub const TOTAL_COST_LABEL: &str = "Total Cost ($)";

const IMPROVEMENT_BUDGET: usize = 300;
const NARRATIVE_BUDGET: usize = 400;
const FOCUS_BUDGET: usize = 200;
const CDI_DECISIONS_BUDGET: usize = 500;

/// How a Summary metric is presented.
///
/// Counts are shown as read. Percentages, scores and seconds are rounded to 2
/// decimals, costs to 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetricKind {
    Count,
    Percent,
    Score,
    Seconds,
    Cost,
}

impl MetricKind {
    fn present(self, value: f64) -> f64 {
        match self {
            MetricKind::Count => value,
            MetricKind::Percent | MetricKind::Score | MetricKind::Seconds => round_to(value, 2),
            MetricKind::Cost => round_to(value, 4),
        }
    }
}

const PROCESSING_COST_KEY: &str = "total_processing_cost";
const EVALUATION_COST_KEY: &str = "total_evaluation_cost";

const SUMMARY_METRICS: [(&str, &str, MetricKind); 18] = [
    ("Total Charts", "total_charts", MetricKind::Count),
    ("Successful Charts", "successful_charts", MetricKind::Count),
    ("Failed Charts", "failed_charts", MetricKind::Count),
    ("Success Rate (%)", "success_rate", MetricKind::Percent),
    ("Average Overall Score", "avg_overall_score", MetricKind::Score),
    ("Average Coverage Score", "avg_coverage_score", MetricKind::Score),
    ("Average Quality Score", "avg_quality_score", MetricKind::Score),
    ("Average Completeness Score", "avg_completeness_score", MetricKind::Score),
    ("Average Accuracy Score", "avg_accuracy_score", MetricKind::Score),
    ("Total Matched Improvements", "total_matched_improvements", MetricKind::Count),
    ("Total Missed Improvements", "total_missed_improvements", MetricKind::Count),
    ("Total Extra Improvements", "total_extra_improvements", MetricKind::Count),
    ("Improvement Match Rate (%)", "improvement_match_rate", MetricKind::Percent),
    ("Total CDI Recommendations", "total_cdi_recommendations", MetricKind::Count),
    ("Average Processing Time (s)", "avg_processing_time", MetricKind::Seconds),
    ("Total Processing Time (s)", "total_processing_time", MetricKind::Seconds),
    ("Processing Cost ($)", PROCESSING_COST_KEY, MetricKind::Cost),
    ("Evaluation Cost ($)", EVALUATION_COST_KEY, MetricKind::Cost),
];

const PAYER_HEADERS: [&str; 6] = [
    "Payer",
    "Charts Evaluated",
    "Avg Overall Score",
    "Avg Coverage Score",
    "Avg Quality Score",
    "Avg Completeness Score",
];

const CHART_HEADERS: [&str; 19] = [
    "Chart Name",
    "Success",
    "Overall Score",
    "Coverage Score",
    "Quality Score",
    "Completeness Score",
    "Accuracy Score",
    "Processing Time (s)",
    "Matched Count",
    "Missed Count",
    "Extra Count",
    "Matched Improvements",
    "Missed Improvements",
    "Extra Improvements",
    "Strengths",
    "Weaknesses",
    "Primary Focus",
    "Expected Improvements",
    "CDI Decisions",
];

const RECOMMENDATION_HEADERS: [&str; 7] = [
    "Chart Name",
    "Payer",
    "Procedure",
    "Decision",
    "Primary Reasons",
    "Missing Requirements",
    "Suggestions",
];

/// Sheets in workbook order, data only.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportWorkbook {
    pub sheets: Vec<SheetTable>,
}

impl ReportWorkbook {
    pub fn sheet(&self, name: &str) -> Option<&SheetTable> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }
}

/// Lay out every sheet for a batch of evaluations.
///
/// Summary is skipped without metrics, Payer Performance without payer data,
/// CDI Recommendations when no chart carries a recommendation. Chart Details is
/// always present, header-only for an empty batch.
pub fn build_report(
    records: &[EvaluationRecord],
    metrics: Option<&AggregateMetrics>,
) -> ReportWorkbook {
    let metrics = metrics.filter(|m| !m.is_empty());
    let mut sheets = Vec::new();

    if let Some(metrics) = metrics {
        sheets.push(summary_sheet(metrics));
        if let Some(payers) = payer_performance_sheet(metrics) {
            sheets.push(payers);
        }
    }
    sheets.push(chart_details_sheet(records));
    if let Some(recommendations) = recommendations_sheet(records) {
        sheets.push(recommendations);
    }

    log::debug!(
        "Laid out report sheets {:?} for {} charts",
        sheets.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
        records.len()
    );
    ReportWorkbook { sheets }
}

pub fn summary_sheet(metrics: &AggregateMetrics) -> SheetTable {
    let mut table = SheetTable::new(SUMMARY_SHEET, &["Metric", "Value"]);
    for (label, key, kind) in SUMMARY_METRICS {
        table.push_row(vec![label.into(), kind.present(metrics.number(key)).into()]);
    }
    let total_cost = metrics.number(PROCESSING_COST_KEY) + metrics.number(EVALUATION_COST_KEY);
    table.push_row(vec![
        TOTAL_COST_LABEL.into(),
        MetricKind::Cost.present(total_cost).into(),
    ]);
    table
}

pub fn payer_performance_sheet(metrics: &AggregateMetrics) -> Option<SheetTable> {
    let payers = metrics.payer_performance();
    if payers.is_empty() {
        return None;
    }
    let mut table = SheetTable::new(PAYER_PERFORMANCE_SHEET, &PAYER_HEADERS);
    for (payer, stats) in payers {
        table.push_row(vec![
            payer.into(),
            stats.charts_evaluated.into(),
            round_to(stats.avg_overall_score, 2).into(),
            round_to(stats.avg_coverage_score, 2).into(),
            round_to(stats.avg_quality_score, 2).into(),
            round_to(stats.avg_completeness_score, 2).into(),
        ]);
    }
    Some(table)
}

pub fn chart_details_sheet(records: &[EvaluationRecord]) -> SheetTable {
    let mut table = SheetTable::new(CHART_DETAILS_SHEET, &CHART_HEADERS);
    for record in records {
        table.push_row(vec![
            record.chart_name.as_str().into(),
            if record.success { "Yes" } else { "No" }.into(),
            record.overall_score.into(),
            record.coverage_score.into(),
            record.quality_score.into(),
            record.completeness_score.into(),
            record.accuracy_score.into(),
            record.processing_time.into(),
            record.matched_improvements.len().into(),
            record.missed_improvements.len().into(),
            record.extra_improvements.len().into(),
            bounded_join(&record.matched_improvements, IMPROVEMENT_BUDGET).into(),
            bounded_join(&record.missed_improvements, IMPROVEMENT_BUDGET).into(),
            bounded_join(&record.extra_improvements, IMPROVEMENT_BUDGET).into(),
            bounded_join(&record.strengths, NARRATIVE_BUDGET).into(),
            bounded_join(&record.weaknesses, NARRATIVE_BUDGET).into(),
            bounded_join(&record.primary_focus, FOCUS_BUDGET).into(),
            bounded_join(&record.expected_improvements, FOCUS_BUDGET).into(),
            bounded_join(&cdi_decisions(record), CDI_DECISIONS_BUDGET).into(),
        ]);
    }
    table
}

/// `"<payer> - <procedure>: <decision>"` for each recommendation on the chart.
pub fn cdi_decisions(record: &EvaluationRecord) -> Vec<String> {
    record
        .cdi_recommendations
        .iter()
        .map(|rec| format!("{} - {}: {}", rec.payer, rec.procedure, rec.decision))
        .collect()
}

pub fn recommendations_sheet(records: &[EvaluationRecord]) -> Option<SheetTable> {
    let mut table = SheetTable::new(CDI_RECOMMENDATIONS_SHEET, &RECOMMENDATION_HEADERS);
    for record in records {
        for rec in &record.cdi_recommendations {
            table.push_row(vec![
                record.chart_name.as_str().into(),
                rec.payer.as_str().into(),
                rec.procedure.as_str().into(),
                rec.decision.as_str().into(),
                join_list(&rec.primary_reasons).into(),
                join_list(&rec.missing_requirements).into(),
                join_list(&rec.suggestions).into(),
            ]);
        }
    }
    (!table.is_header_only()).then_some(table)
}
