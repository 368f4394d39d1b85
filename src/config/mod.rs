//! Workbook configuration: reading sheets and compiling them into graph-set specs.

pub mod attribute;
pub mod compiler;
pub mod graph_set;
pub mod workbook;

use std::path::Path;

pub use attribute::{Attribute, ConfigRow, RowStyle};
pub use compiler::{compile, GraphSheet, HeaderInfo, PlotConfig};
pub use graph_set::{AxisSource, GraphSetSpec, LineSpec, PanelSpec};
pub use workbook::{CellValue, RawSheet, RawWorkbook};

use crate::error::ConfigError;

/// Read and compile a configuration workbook.
pub fn load_config(path: impl AsRef<Path>) -> Result<PlotConfig, ConfigError> {
    let path = path.as_ref();
    tracing::info!("Loading configuration from {:?}", path);
    let workbook = workbook::read_workbook(path)?;
    compile(&workbook)
}
