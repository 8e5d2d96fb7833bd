use chrono::NaiveDateTime;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::Path;

use crate::sheets::ReportWorkbook;
use crate::table::{clip_cell_text, CellValue, SheetTable};
use crate::Result;

/// Columns from this index on are left/top aligned instead of centered.
const CENTERED_COLUMNS: usize = 10;
const HEADER_FILL: u32 = 0x1F4E78;

pub fn report_file_name(timestamp: NaiveDateTime) -> String {
    format!(
        "cdi_evaluation_report_{}.xlsx",
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// Write the workbook to `path`.
///
/// All sheet data is written before the formatting pass touches any sheet.
pub fn write_workbook(report: &ReportWorkbook, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    for table in &report.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&table.name)?;
        write_data(worksheet, table)?;
    }

    let styles = Styles::new();
    for table in &report.sheets {
        let worksheet = workbook.worksheet_from_name(&table.name)?;
        apply_formatting(worksheet, table, &styles)?;
    }

    let bytes = workbook.save_to_buffer()?;
    cdi_protocol::write_atomic(path, &bytes)?;
    log::info!(
        "Wrote report {} ({} sheets)",
        path.display(),
        report.sheets.len()
    );
    Ok(())
}

fn write_data(worksheet: &mut Worksheet, table: &SheetTable) -> Result<()> {
    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string(0, col_num(col), header.as_str())?;
    }
    for (row_idx, row) in table.rows.iter().enumerate() {
        let row_num = row_num(row_idx + 1);
        for (col, cell) in row.iter().enumerate() {
            match cell {
                CellValue::Text(text) => {
                    worksheet.write_string(row_num, col_num(col), clip_cell_text(text))?;
                }
                CellValue::Number(n) => {
                    worksheet.write_number(row_num, col_num(col), *n)?;
                }
            }
        }
    }
    Ok(())
}

struct Styles {
    header: Format,
    centered: Format,
    left: Format,
}

impl Styles {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(HEADER_FILL))
                .set_border(FormatBorder::Thin)
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_text_wrap(),
            centered: Format::new()
                .set_border(FormatBorder::Thin)
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_text_wrap(),
            left: Format::new()
                .set_border(FormatBorder::Thin)
                .set_align(FormatAlign::Left)
                .set_align(FormatAlign::Top)
                .set_text_wrap(),
        }
    }

    fn body(&self, col: usize) -> &Format {
        if col < CENTERED_COLUMNS {
            &self.centered
        } else {
            &self.left
        }
    }
}

fn apply_formatting(worksheet: &mut Worksheet, table: &SheetTable, styles: &Styles) -> Result<()> {
    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col_num(col), header.as_str(), &styles.header)?;
    }
    for (row_idx, row) in table.rows.iter().enumerate() {
        let row_num = row_num(row_idx + 1);
        for (col, cell) in row.iter().enumerate() {
            let format = styles.body(col);
            match cell {
                CellValue::Text(text) => {
                    worksheet.write_string_with_format(
                        row_num,
                        col_num(col),
                        clip_cell_text(text),
                        format,
                    )?;
                }
                CellValue::Number(n) => {
                    worksheet.write_number_with_format(row_num, col_num(col), *n, format)?;
                }
            }
        }
    }
    for (col, width) in table.column_widths().into_iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let width = width as f64;
        worksheet.set_column_width(col_num(col), width)?;
    }
    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}

fn col_num(col: usize) -> u16 {
    u16::try_from(col).unwrap_or(u16::MAX)
}

fn row_num(row: usize) -> u32 {
    u32::try_from(row).unwrap_or(u32::MAX)
}
