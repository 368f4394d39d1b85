use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::ConfigError;

/// One spreadsheet cell, reduced to the kinds the compiler cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    pub fn from_data(cell: &Data) -> Self {
        match cell {
            Data::Empty | Data::Error(_) => CellValue::Empty,
            Data::String(s) => CellValue::text(s),
            Data::Float(f) => CellValue::number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => CellValue::number(dt.as_f64()),
            Data::DateTimeIso(s) => CellValue::text(s),
            Data::DurationIso(s) => CellValue::text(s),
        }
    }

    /// Blank strings collapse to `Empty`.
    pub fn text(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(trimmed.to_string())
        }
    }

    /// NaN collapses to `Empty`.
    pub fn number(v: f64) -> Self {
        if v.is_nan() {
            CellValue::Empty
        } else {
            CellValue::Number(v)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => s.parse::<f64>().ok().filter(|v| !v.is_nan()),
            CellValue::Empty => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            CellValue::Number(v) => Some(*v != 0.0),
            CellValue::Text(s) => match s.to_lowercase().as_str() {
                "true" | "yes" | "y" | "1" => Some(true),
                "false" | "no" | "n" | "0" => Some(false),
                _ => None,
            },
            CellValue::Empty => None,
        }
    }

    /// Text form of the cell. Whole numbers print without a fractional part.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => {
                Some(format!("{}", *v as i64))
            }
            CellValue::Number(v) => Some(v.to_string()),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Empty => None,
        }
    }
}

/// A sheet as a grid of cells. Row 0 holds the column names.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Index of the column whose header cell equals `header`.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.rows.first()?.iter().position(|cell| match cell {
            CellValue::Text(s) => s == header,
            _ => false,
        })
    }

    /// Rows below the header row.
    pub fn data_rows(&self) -> &[Vec<CellValue>] {
        if self.rows.is_empty() {
            &[]
        } else {
            &self.rows[1..]
        }
    }
}

/// All sheets of a workbook, in workbook order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawWorkbook {
    pub sheets: Vec<RawSheet>,
}

impl RawWorkbook {
    pub fn sheet(&self, name: &str) -> Option<&RawSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Read every sheet of an Excel/ODS workbook.
pub fn read_workbook(path: &Path) -> Result<RawWorkbook, ConfigError> {
    let workbook_error = |message: String| ConfigError::Workbook {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| workbook_error(format!("cannot read sheet '{name}': {e}")))?;
        let rows = range
            .rows()
            .map(|row| row.iter().map(CellValue::from_data).collect())
            .collect();
        sheets.push(RawSheet::new(name, rows));
    }

    tracing::debug!("Read {} sheets from {:?}", sheets.len(), path);
    Ok(RawWorkbook { sheets })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_and_nan_are_empty() {
        assert!(CellValue::text("   ").is_empty());
        assert!(CellValue::number(f64::NAN).is_empty());
        assert_eq!(CellValue::text(" red "), CellValue::Text("red".into()));
    }

    #[test]
    fn numeric_text_parses() {
        assert_eq!(CellValue::Text("2.5".into()).as_f64(), Some(2.5));
        assert_eq!(CellValue::Text("nan".into()).as_f64(), None);
        assert_eq!(CellValue::Text("abc".into()).as_f64(), None);
    }

    #[test]
    fn whole_numbers_print_as_integers() {
        assert_eq!(CellValue::Number(500.0).as_text().as_deref(), Some("500"));
        assert_eq!(CellValue::Number(0.25).as_text().as_deref(), Some("0.25"));
    }

    #[test]
    fn truthiness() {
        assert_eq!(CellValue::Number(0.0).as_bool(), Some(false));
        assert_eq!(CellValue::Number(1.0).as_bool(), Some(true));
        assert_eq!(CellValue::Text("TRUE".into()).as_bool(), Some(true));
        assert_eq!(CellValue::Text("maybe".into()).as_bool(), None);
    }

    #[test]
    fn column_lookup_uses_header_row() {
        let sheet = RawSheet::new(
            "graph-a",
            vec![
                vec![CellValue::text("Variable"), CellValue::text("Value")],
                vec![CellValue::text("xValue"), CellValue::text("Time")],
            ],
        );
        assert_eq!(sheet.column_index("Value"), Some(1));
        assert_eq!(sheet.column_index("Scale"), None);
        assert_eq!(sheet.data_rows().len(), 1);
    }
}
