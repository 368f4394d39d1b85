use std::path::Path;

use crate::config::PlotConfig;
use crate::data::dataset::{Dataset, DatasetStore};
use crate::data::matlab;
use crate::data::parser::{self, has_extension, ParsedTable};
use crate::error::LoadError;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xls", "xlsx", "xlsm", "xlsb", "ods"];
const SPECTRAL_EXTENSIONS: &[&str] = &["scd", "spc"];

/// A loaded file plus the creation date a MAT file may carry.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub dataset: Dataset,
    pub date_created: Option<String>,
}

/// Load one datafile, choosing the reader from its extension.
///
/// Returns `Ok(None)` for a file without content lines.
pub fn load_file(path: &Path) -> Result<Option<LoadedFile>, LoadError> {
    if has_extension(path, "mat") {
        let bytes = std::fs::read(path)?;
        let mat = matlab::read_table(&bytes)?;
        let dataset = into_dataset(mat.table)?;
        return Ok(Some(LoadedFile {
            dataset,
            date_created: mat.date_created,
        }));
    }

    let table = if SPREADSHEET_EXTENSIONS.iter().any(|e| has_extension(path, e)) {
        load_spreadsheet(path)?
    } else {
        let text = read_text(path)?;
        if SPECTRAL_EXTENSIONS.iter().any(|e| has_extension(path, e)) {
            parser::parse_spectral(&text)?
        } else {
            parser::parse_delimited(&text, path)?
        }
    };

    table
        .map(|t| {
            Ok(LoadedFile {
                dataset: into_dataset(t)?,
                date_created: None,
            })
        })
        .transpose()
}

/// Read text, falling back to Latin-1 for files that are not valid UTF-8.
fn read_text(path: &Path) -> Result<String, LoadError> {
    let content = std::fs::read(path)?;
    Ok(match String::from_utf8(content) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    })
}

fn into_dataset(table: ParsedTable) -> Result<Dataset, LoadError> {
    Dataset::from_columns(table.columns, table.values)
}

/// First worksheet, row 0 as the header.
fn load_spreadsheet(path: &Path) -> Result<Option<ParsedTable>, LoadError> {
    use calamine::{open_workbook_auto, Data, Reader};

    let mut workbook =
        open_workbook_auto(path).map_err(|e| LoadError::Spreadsheet(e.to_string()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .ok_or_else(|| LoadError::Spreadsheet("workbook has no sheets".to_string()))?
        .clone();
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| LoadError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(None);
    };
    let columns: Vec<String> = header
        .iter()
        .map(|cell| match cell {
            Data::String(s) => s.trim().to_string(),
            Data::Empty => String::new(),
            other => other.to_string(),
        })
        .collect();

    let mut values: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];
    for row in rows {
        for (col_idx, col) in values.iter_mut().enumerate() {
            let v = match row.get(col_idx) {
                Some(Data::Float(f)) => *f,
                Some(Data::Int(i)) => *i as f64,
                Some(Data::Bool(b)) => f64::from(u8::from(*b)),
                Some(Data::DateTime(dt)) => dt.as_f64(),
                Some(Data::String(s)) => s.trim().parse().unwrap_or(f64::NAN),
                _ => f64::NAN,
            };
            col.push(v);
        }
    }
    Ok(Some(ParsedTable { columns, values }))
}

/// Outcome of loading every datafile named by a configuration.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub store: DatasetStore,
    /// Datafiles that do not exist.
    pub missing: Vec<String>,
    /// Datafiles that exist but could not be read, with the reason.
    pub failed: Vec<(String, String)>,
}

impl LoadReport {
    pub fn is_success(&self) -> bool {
        self.missing.is_empty() && self.failed.is_empty()
    }
}

/// Load each unique datafile once, in configuration order.
///
/// Problems are logged and recorded; loading continues with the next file.
pub fn load_all(config: &PlotConfig) -> LoadReport {
    let mut report = LoadReport::default();

    for file in config.datafiles() {
        let path = Path::new(&file);
        if !path.exists() {
            tracing::warn!("Datafile {:?} does not exist", path);
            report.missing.push(file);
            continue;
        }

        tracing::info!("Loading datafile {:?}", path);
        match load_file(path) {
            Ok(Some(loaded)) => {
                tracing::info!(
                    "Loaded {:?}: {} rows, {} columns",
                    path,
                    loaded.dataset.row_count(),
                    loaded.dataset.column_names().len()
                );
                if let Some(date) = loaded.date_created {
                    report.store.date_created = date;
                }
                report.store.insert(file, loaded.dataset);
            }
            Ok(None) => tracing::warn!("Datafile {:?} is empty", path),
            Err(e) => {
                tracing::error!("Failed to load {:?}: {}", path, e);
                report.failed.push((file, e.to_string()));
            }
        }
    }

    report
}
