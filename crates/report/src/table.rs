use std::borrow::Cow;

/// Widest a column may be auto-sized to, in character units.
pub const MAX_COLUMN_WIDTH: usize = 50;
const COLUMN_PADDING: usize = 2;
const LIST_SEPARATOR: &str = "; ";
const ELLIPSIS: &str = "...";
/// Longest text a spreadsheet cell accepts, in characters.
pub const MAX_CELL_CHARS: usize = 32_767;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl CellValue {
    /// Text cell, clipped to [`MAX_CELL_CHARS`] with a trailing ellipsis.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        match clip_cell_text(&value) {
            Cow::Borrowed(_) => CellValue::Text(value),
            Cow::Owned(clipped) => CellValue::Text(clipped),
        }
    }

    /// The value as it reads in the sheet: whole numbers without a fraction.
    pub fn render(&self) -> String {
        match self {
            CellValue::Text(text) => text.clone(),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            CellValue::Number(n) => n.to_string(),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<usize> for CellValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: usize) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::text(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::text(value)
    }
}

pub(crate) fn clip_cell_text(text: &str) -> Cow<'_, str> {
    if text.chars().count() <= MAX_CELL_CHARS {
        return Cow::Borrowed(text);
    }
    let mut clipped: String = text
        .chars()
        .take(MAX_CELL_CHARS - ELLIPSIS.chars().count())
        .collect();
    clipped.push_str(ELLIPSIS);
    Cow::Owned(clipped)
}

/// One sheet's data: a header row plus body rows in fixed column order.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetTable {
    pub fn new(name: &str, headers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        debug_assert_eq!(row.len(), self.headers.len(), "row width for {}", self.name);
        self.rows.push(row);
    }

    pub fn is_header_only(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column index by header name.
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Per-column width: longest rendered value plus padding, capped.
    pub fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                let longest = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.render().chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0);
                (longest + COLUMN_PADDING).min(MAX_COLUMN_WIDTH)
            })
            .collect()
    }
}

/// Join with `"; "` and hard-truncate to `budget` characters plus an ellipsis.
pub fn bounded_join<S: AsRef<str>>(items: &[S], budget: usize) -> String {
    let joined = items
        .iter()
        .map(AsRef::<str>::as_ref)
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR);
    if joined.chars().count() <= budget {
        return joined;
    }
    let mut truncated: String = joined.chars().take(budget).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

pub fn join_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(AsRef::<str>::as_ref)
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}
