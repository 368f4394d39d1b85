use std::collections::{HashMap, HashSet};

use crate::config::attribute::{Attribute, AttributeName, ConfigRow, RowStyle};
use crate::config::graph_set::GraphSetSpec;
use crate::config::workbook::{CellValue, RawSheet, RawWorkbook};
use crate::error::ConfigError;
use crate::settings::{DEFAULT_PAGE_TITLE, GRAPH_SHEET_MARKER, HEADER_SHEET, MASTER_DATAFILE};

/// Page-level settings from the header sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderInfo {
    pub page_top: Option<String>,
    pub page_bottom: Option<String>,
    pub page_title: String,
    pub datafile: Option<String>,
}

impl Default for HeaderInfo {
    fn default() -> Self {
        Self {
            page_top: None,
            page_bottom: None,
            page_title: DEFAULT_PAGE_TITLE.to_string(),
            datafile: None,
        }
    }
}

/// One compiled graph sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSheet {
    pub name: String,
    pub tab_label: String,
    pub rows: Vec<ConfigRow>,
    pub spec: GraphSetSpec,
}

impl GraphSheet {
    pub fn row(&self, key: &str) -> Option<&ConfigRow> {
        self.rows.iter().find(|r| r.key() == key)
    }
}

/// The whole compiled workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    pub header: HeaderInfo,
    pub sheets: Vec<GraphSheet>,
}

impl PlotConfig {
    /// Unique datafiles in the order the sheets name them.
    pub fn datafiles(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.sheets
            .iter()
            .map(|s| s.spec.datafile.clone())
            .filter(|f| seen.insert(f.clone()))
            .collect()
    }

    pub fn included_sheets(&self) -> impl Iterator<Item = &GraphSheet> {
        self.sheets.iter().filter(|s| s.spec.include)
    }
}

/// Column layout of a graph sheet, resolved from its header row.
struct Columns {
    variable: usize,
    value: Option<usize>,
    scale: Option<usize>,
    offset: Option<usize>,
    colour: Option<usize>,
    dash: Option<usize>,
    width: Option<usize>,
    marker_opacity: Option<usize>,
    mode: Option<usize>,
    graph_type: Option<usize>,
    label: Option<usize>,
    format: Option<usize>,
}

impl Columns {
    fn resolve(sheet: &RawSheet) -> Result<Self, ConfigError> {
        let variable = sheet
            .column_index("Variable")
            .ok_or_else(|| ConfigError::MissingColumn {
                sheet: sheet.name.clone(),
                column: "Variable".to_string(),
            })?;
        Ok(Self {
            variable,
            value: sheet.column_index("Value"),
            scale: sheet.column_index("Scale"),
            offset: sheet.column_index("Offset"),
            colour: sheet.column_index("Colour"),
            dash: sheet.column_index("Dash"),
            width: sheet.column_index("Linewidth"),
            marker_opacity: sheet.column_index("MarkerOpacity"),
            mode: sheet.column_index("Mode"),
            graph_type: sheet.column_index("GraphType"),
            label: sheet.column_index("LineLabel"),
            format: sheet.column_index("Format"),
        })
    }

    fn cell<'a>(row: &'a [CellValue], index: Option<usize>) -> &'a CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        index.and_then(|i| row.get(i)).unwrap_or(EMPTY)
    }

    fn number(row: &[CellValue], index: Option<usize>) -> Option<f64> {
        Self::cell(row, index).as_f64()
    }

    fn text(row: &[CellValue], index: Option<usize>) -> Option<String> {
        match Self::cell(row, index) {
            CellValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn style(&self, row: &[CellValue]) -> RowStyle {
        RowStyle {
            scale: Self::number(row, self.scale).unwrap_or(1.0),
            offset: Self::number(row, self.offset).unwrap_or(0.0),
            colour: Self::text(row, self.colour),
            dash: Self::text(row, self.dash),
            width: Self::number(row, self.width),
            marker_opacity: Self::number(row, self.marker_opacity),
            mode: Self::text(row, self.mode),
            graph_type: Self::text(row, self.graph_type),
            format: Self::text(row, self.format),
            label: Self::text(row, self.label),
        }
    }
}

/// Compile the header sheet and every graph sheet of a workbook.
pub fn compile(workbook: &RawWorkbook) -> Result<PlotConfig, ConfigError> {
    let header_sheet = workbook
        .sheet(HEADER_SHEET)
        .ok_or_else(|| ConfigError::MissingHeaderSheet(HEADER_SHEET.to_string()))?;
    let header = compile_header(header_sheet)?;

    let sheets = workbook
        .sheets
        .iter()
        .filter(|s| s.name.contains(GRAPH_SHEET_MARKER))
        .map(|s| compile_sheet(s, &header))
        .collect::<Result<Vec<_>, _>>()?;

    check_unique_ids(&sheets)?;

    tracing::info!(
        "Compiled {} graph sheets ({} included)",
        sheets.len(),
        sheets.iter().filter(|s| s.spec.include).count()
    );
    Ok(PlotConfig { header, sheets })
}

/// Read `Variable`/`Value` pairs from the header sheet.
pub fn compile_header(sheet: &RawSheet) -> Result<HeaderInfo, ConfigError> {
    let columns = Columns::resolve(sheet)?;
    let mut values: HashMap<String, String> = HashMap::new();
    for row in sheet.data_rows() {
        let Some(name) = Columns::cell(row, Some(columns.variable)).as_text() else {
            continue;
        };
        if let Some(value) = Columns::cell(row, columns.value).as_text() {
            values.insert(name, value);
        }
    }

    Ok(HeaderInfo {
        page_top: values.remove("PageTop"),
        page_bottom: values.remove("PageBottom"),
        page_title: values
            .remove("Pagetitle")
            .unwrap_or_else(|| DEFAULT_PAGE_TITLE.to_string()),
        datafile: values.remove("Datafile"),
    })
}

/// Assign ordinals, rewrite the master datafile and derive the graph-set spec.
pub fn compile_sheet(sheet: &RawSheet, header: &HeaderInfo) -> Result<GraphSheet, ConfigError> {
    let columns = Columns::resolve(sheet)?;

    let mut rows = Vec::new();
    let mut keys = HashSet::new();
    let mut current_set: Option<usize> = None;
    let mut next_line = 0usize;

    for (index, raw) in sheet.data_rows().iter().enumerate() {
        let Some(name) = Columns::text(raw, Some(columns.variable)) else {
            continue;
        };
        let orphan = || ConfigError::OrphanAttribute {
            sheet: sheet.name.clone(),
            // Spreadsheet row number: one header row, one-based.
            row: index + 2,
            attribute: name.clone(),
        };

        let attribute = match AttributeName::parse(&name) {
            Some(AttributeName::Title) => {
                let set = current_set.map_or(0, |s| s + 1);
                current_set = Some(set);
                Attribute::Title { set }
            }
            Some(AttributeName::YLabel) => {
                next_line = 0;
                Attribute::YLabel {
                    set: current_set.ok_or_else(orphan)?,
                }
            }
            Some(AttributeName::YValue) => {
                let line = next_line;
                next_line += 1;
                Attribute::YValue {
                    set: current_set.ok_or_else(orphan)?,
                    line,
                }
            }
            Some(AttributeName::Datafile) => Attribute::Datafile,
            Some(AttributeName::XValue) => Attribute::XValue,
            Some(AttributeName::XLabel) => Attribute::XLabel,
            Some(AttributeName::XSliderStep) => Attribute::XSliderStep,
            Some(AttributeName::UseSubplots) => Attribute::UseSubplots,
            Some(AttributeName::ToDisk) => Attribute::ToDisk,
            Some(AttributeName::Include) => Attribute::Include,
            Some(AttributeName::Height) => Attribute::Height,
            Some(AttributeName::GraphTop) => Attribute::GraphTop,
            Some(AttributeName::GraphBottom) => Attribute::GraphBottom,
            None => {
                tracing::debug!("Sheet '{}': unrecognised attribute '{}'", sheet.name, name);
                Attribute::Other(name.clone())
            }
        };

        let mut value = Columns::cell(raw, columns.value).clone();
        if attribute == Attribute::Datafile && value.as_text().as_deref() == Some(MASTER_DATAFILE) {
            let master = header
                .datafile
                .as_ref()
                .ok_or_else(|| ConfigError::MissingMasterDatafile(sheet.name.clone()))?;
            value = CellValue::Text(master.clone());
        }

        let row = ConfigRow {
            attribute,
            value,
            style: columns.style(raw),
        };
        if !keys.insert(row.key()) {
            return Err(ConfigError::DuplicateKey {
                sheet: sheet.name.clone(),
                key: row.key(),
            });
        }
        rows.push(row);
    }

    let spec = GraphSetSpec::from_rows(&sheet.name, &rows)?;
    Ok(GraphSheet {
        name: sheet.name.clone(),
        tab_label: tab_label(&sheet.name),
        rows,
        spec,
    })
}

/// Tab label: the part of the sheet name between its first and second `-`,
/// or the whole name when there is none.
pub fn tab_label(sheet_name: &str) -> String {
    match sheet_name.split('-').nth(1) {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => sheet_name.to_string(),
    }
}

fn check_unique_ids(sheets: &[GraphSheet]) -> Result<(), ConfigError> {
    let mut owners: HashMap<String, &str> = HashMap::new();
    for sheet in sheets {
        for id in sheet.spec.chart_ids() {
            if let Some(first) = owners.insert(id.clone(), &sheet.name) {
                return Err(ConfigError::DuplicateChartId {
                    id,
                    first: first.to_string(),
                    second: sheet.name.clone(),
                });
            }
        }
    }

    let mut labels: HashMap<&str, &str> = HashMap::new();
    for sheet in sheets.iter().filter(|s| s.spec.include) {
        if let Some(first) = labels.insert(&sheet.tab_label, &sheet.name) {
            return Err(ConfigError::DuplicateTabLabel {
                label: sheet.tab_label.clone(),
                first: first.to_string(),
                second: sheet.name.clone(),
            });
        }
    }
    Ok(())
}
