//! # CDI Report
//!
//! Multi-sheet evaluation workbook.
//!
//! ## Pipeline
//!
//! ```text
//! EvaluationRecord[] + AggregateMetrics
//!     │
//!     ├──> build_report (data only)
//!     │      └─> Summary / Payer Performance / Chart Details / CDI Recommendations
//!     │
//!     └──> write_workbook
//!            ├─> data pass (every sheet)
//!            └─> formatting pass (headers, borders, alignment, widths, frozen header)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use cdi_report::{build_report, write_workbook};
//! use std::path::Path;
//!
//! fn main() -> cdi_report::Result<()> {
//!     let report = build_report(&[], None);
//!     write_workbook(&report, Path::new("report.xlsx"))?;
//!     Ok(())
//! }
//! ```

mod error;
mod sheets;
mod table;
mod writer;

pub use error::{ReportError, Result};
pub use sheets::{
    build_report, cdi_decisions, ReportWorkbook, CDI_RECOMMENDATIONS_SHEET, CHART_DETAILS_SHEET,
    PAYER_PERFORMANCE_SHEET, SUMMARY_SHEET, TOTAL_COST_LABEL,
};
pub use table::{bounded_join, CellValue, SheetTable, MAX_CELL_CHARS, MAX_COLUMN_WIDTH};
pub use writer::{report_file_name, write_workbook};
