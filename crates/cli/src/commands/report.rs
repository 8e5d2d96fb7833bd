use super::read_json;
use crate::{config, print_stdout, Outcome};
use anyhow::{bail, Context as AnyhowContext, Result};
use cdi_protocol::{AggregateMetrics, EvaluationRecord};
use cdi_report::{build_report, report_file_name, write_workbook};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub(crate) fn run(records: &Path, metrics: Option<&Path>, output: Option<PathBuf>) -> Result<Outcome> {
    let records = load_records(records)?;
    let metrics = metrics.map(load_metrics).transpose()?.flatten();

    let report = build_report(&records, metrics.as_ref());
    let output = output.unwrap_or_else(|| {
        config::output_dir().join(report_file_name(chrono::Local::now().naive_local()))
    });
    write_workbook(&report, &output)
        .with_context(|| format!("Failed to write workbook {}", output.display()))?;

    print_stdout(&format!(
        "Wrote {} ({} charts; sheets: {})",
        output.display(),
        records.len(),
        report.sheet_names().join(", ")
    ))?;
    Ok(Outcome::Done)
}

/// Records from a JSON array; entries that are not objects are dropped.
fn load_records(path: &Path) -> Result<Vec<EvaluationRecord>> {
    let Value::Array(items) = read_json(path)? else {
        bail!("{} must hold a JSON array of chart records", path.display());
    };
    let total = items.len();
    let records: Vec<EvaluationRecord> = items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                log::debug!("Skipping malformed chart record: {e}");
                None
            }
        })
        .collect();
    if records.len() < total {
        log::debug!("Dropped {} malformed chart records", total - records.len());
    }
    Ok(records)
}

fn load_metrics(path: &Path) -> Result<Option<AggregateMetrics>> {
    match read_json(path)? {
        Value::Object(map) => Ok(Some(AggregateMetrics(map))),
        _ => {
            log::warn!("Ignoring metrics in {}: not a JSON object", path.display());
            Ok(None)
        }
    }
}
