//! Error types for every stage of the dashboard pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Problems found while reading or compiling the configuration workbook.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot open workbook {path:?}: {message}")]
    Workbook { path: PathBuf, message: String },

    #[error("Workbook has no '{0}' sheet")]
    MissingHeaderSheet(String),

    #[error("Sheet '{sheet}' has no '{column}' column")]
    MissingColumn { sheet: String, column: String },

    #[error("Sheet '{sheet}' has no '{attribute}' row")]
    MissingAttribute { sheet: String, attribute: String },

    #[error("Sheet '{sheet}', row {row}: '{attribute}' appears before any 'Title' row")]
    OrphanAttribute {
        sheet: String,
        row: usize,
        attribute: String,
    },

    #[error("Sheet '{sheet}': key '{key}' is defined more than once")]
    DuplicateKey { sheet: String, key: String },

    #[error("Chart id '{id}' is produced by both '{first}' and '{second}'")]
    DuplicateChartId {
        id: String,
        first: String,
        second: String,
    },

    #[error("Tab label '{label}' is used by both '{first}' and '{second}'")]
    DuplicateTabLabel {
        label: String,
        first: String,
        second: String,
    },

    #[error("Sheet '{0}' uses the master datafile but the header sheet names none")]
    MissingMasterDatafile(String),

    #[error("Sheet '{sheet}', row '{key}': expected a number, found '{value}'")]
    NotANumber {
        sheet: String,
        key: String,
        value: String,
    },
}

/// Problems reading one datafile.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("MAT file error: {0}")]
    Mat(String),

    #[error("MAT file has no '{0}' variable")]
    MissingMatVariable(&'static str),

    #[error("Spectral file has {0} columns, expected 3 or 5")]
    SpectralColumns(usize),

    #[error("Data table error: {0}")]
    Frame(#[from] polars::error::PolarsError),
}

/// Problems turning a compiled graph sheet into charts.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Datafile '{0}' is not loaded")]
    MissingDataset(String),

    #[error("Datafile '{file}' has no column '{column}'")]
    MissingColumn { file: String, column: String },

    #[error("Column '{column}' in '{file}' has no finite values")]
    EmptyAxis { file: String, column: String },
}

/// Problems writing a standalone chart export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error writing {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors surfaced by dashboard requests.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("Unknown tab index {0}")]
    UnknownTab(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
