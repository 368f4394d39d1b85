use crate::config::attribute::{Attribute, ConfigRow};
use crate::error::ConfigError;
use crate::settings::{DEFAULT_HEIGHT, DEFAULT_HOVER_FORMAT};

/// Column plus linear transform applied before plotting.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSource {
    pub column: String,
    pub scale: f64,
    pub offset: f64,
}

impl AxisSource {
    pub fn apply(&self, raw: f64) -> f64 {
        raw * self.scale + self.offset
    }
}

/// One line drawn from a `yValue` row.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSpec {
    pub source: AxisSource,
    pub colour: Option<String>,
    pub width: Option<f64>,
    pub dash: Option<String>,
    pub marker_opacity: f64,
    pub mode: String,
    pub graph_type: Option<String>,
    pub label: String,
}

impl LineSpec {
    pub fn uses_markers(&self) -> bool {
        self.mode.contains("markers")
    }
}

/// One titled chart (or one subplot panel when combined).
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSpec {
    pub ordinal: usize,
    pub title: String,
    pub y_label: String,
    pub y_hover_format: String,
    pub lines: Vec<LineSpec>,
}

impl PanelSpec {
    /// `000`, `001`, ... as used in chart ids and export names.
    pub fn ordinal_str(&self) -> String {
        format!("{:03}", self.ordinal)
    }
}

/// Read-only view of one graph sheet, derived once by the compiler.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSetSpec {
    pub sheet: String,
    pub datafile: String,
    pub x: AxisSource,
    pub x_label: String,
    pub x_hover_format: String,
    pub slider_step: Option<f64>,
    pub panels: Vec<PanelSpec>,
    pub use_subplots: bool,
    pub to_disk: bool,
    pub include: bool,
    pub height: f64,
    pub graph_top: Option<String>,
    pub graph_bottom: Option<String>,
}

impl GraphSetSpec {
    /// Derive the spec from compiled rows. Rows must already carry their ordinals.
    pub fn from_rows(sheet: &str, rows: &[ConfigRow]) -> Result<Self, ConfigError> {
        let find = |wanted: &Attribute| rows.iter().find(|r| &r.attribute == wanted);
        let missing = |attribute: &str| ConfigError::MissingAttribute {
            sheet: sheet.to_string(),
            attribute: attribute.to_string(),
        };
        let number = |row: &ConfigRow| -> Result<Option<f64>, ConfigError> {
            if row.value.is_empty() {
                return Ok(None);
            }
            row.value
                .as_f64()
                .map(Some)
                .ok_or_else(|| ConfigError::NotANumber {
                    sheet: sheet.to_string(),
                    key: row.key(),
                    value: row.text().unwrap_or_default(),
                })
        };
        let flag = |wanted: &Attribute, default: bool| {
            find(wanted)
                .and_then(|r| r.value.as_bool())
                .unwrap_or(default)
        };

        let datafile = find(&Attribute::Datafile)
            .and_then(|r| r.text())
            .ok_or_else(|| missing("Datafile"))?;

        let x_row = find(&Attribute::XValue).ok_or_else(|| missing("xValue"))?;
        let x = AxisSource {
            column: x_row.text().ok_or_else(|| missing("xValue"))?,
            scale: x_row.style.scale,
            offset: x_row.style.offset,
        };

        let x_label_row = find(&Attribute::XLabel);
        let x_label = x_label_row.and_then(|r| r.text()).unwrap_or_default();
        let x_hover_format = x_label_row
            .and_then(|r| r.style.format.clone())
            .unwrap_or_else(|| DEFAULT_HOVER_FORMAT.to_string());

        let slider_step = match find(&Attribute::XSliderStep) {
            Some(row) => number(row)?,
            None => None,
        };
        let height = match find(&Attribute::Height) {
            Some(row) => number(row)?.unwrap_or(DEFAULT_HEIGHT),
            None => DEFAULT_HEIGHT,
        };

        let mut panels = Vec::new();
        for row in rows {
            if let Attribute::Title { set } = row.attribute {
                let y_label_row = find(&Attribute::YLabel { set });
                panels.push(PanelSpec {
                    ordinal: set,
                    title: row.text().unwrap_or_default(),
                    y_label: y_label_row.and_then(|r| r.text()).unwrap_or_default(),
                    y_hover_format: y_label_row
                        .and_then(|r| r.style.format.clone())
                        .unwrap_or_else(|| DEFAULT_HOVER_FORMAT.to_string()),
                    lines: Vec::new(),
                });
            }
        }
        if panels.is_empty() {
            return Err(missing("Title"));
        }

        for row in rows {
            let Attribute::YValue { set, .. } = row.attribute else {
                continue;
            };
            let Some(column) = row.text() else {
                tracing::debug!("Sheet '{}': {} has no column name, skipped", sheet, row.key());
                continue;
            };
            let style = &row.style;
            let line = LineSpec {
                label: style.label.clone().unwrap_or_else(|| column.clone()),
                source: AxisSource {
                    column,
                    scale: style.scale,
                    offset: style.offset,
                },
                colour: style.colour.clone(),
                width: style.width,
                dash: style.dash.clone(),
                marker_opacity: style.marker_opacity.unwrap_or(0.0),
                mode: style.mode.clone().unwrap_or_else(|| "lines".to_string()),
                graph_type: style.graph_type.clone(),
            };
            if let Some(panel) = panels.iter_mut().find(|p| p.ordinal == set) {
                panel.lines.push(line);
            }
        }

        Ok(Self {
            sheet: sheet.to_string(),
            datafile,
            x,
            x_label,
            x_hover_format,
            slider_step,
            panels,
            use_subplots: flag(&Attribute::UseSubplots, false),
            to_disk: flag(&Attribute::ToDisk, true),
            include: flag(&Attribute::Include, true),
            height,
            graph_top: find(&Attribute::GraphTop).and_then(|r| r.text()),
            graph_bottom: find(&Attribute::GraphBottom).and_then(|r| r.text()),
        })
    }

    /// Ids of the charts this sheet produces: the sheet name when combined,
    /// otherwise sheet name plus panel ordinal.
    pub fn chart_ids(&self) -> Vec<String> {
        if self.use_subplots {
            vec![self.sheet.clone()]
        } else {
            self.panels
                .iter()
                .map(|p| format!("{}{}", self.sheet, p.ordinal_str()))
                .collect()
        }
    }

    pub fn has_markers(&self) -> bool {
        self.panels
            .iter()
            .flat_map(|p| p.lines.iter())
            .any(LineSpec::uses_markers)
    }
}
