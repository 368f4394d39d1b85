use std::fmt;

use crate::config::workbook::CellValue;

/// The kind of a configuration row, with the graph-set and line ordinals
/// assigned by the compiler for per-graph and per-line rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Attribute {
    Datafile,
    XValue,
    XLabel,
    XSliderStep,
    UseSubplots,
    ToDisk,
    Include,
    Height,
    GraphTop,
    GraphBottom,
    Title { set: usize },
    YLabel { set: usize },
    YValue { set: usize, line: usize },
    Other(String),
}

/// Attribute name as written in the `Variable` column, before ordinals are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeName {
    Datafile,
    XValue,
    XLabel,
    XSliderStep,
    UseSubplots,
    ToDisk,
    Include,
    Height,
    GraphTop,
    GraphBottom,
    Title,
    YLabel,
    YValue,
}

impl AttributeName {
    pub fn parse(name: &str) -> Option<Self> {
        let parsed = match name.trim() {
            "Datafile" => AttributeName::Datafile,
            "xValue" => AttributeName::XValue,
            "xLabel" => AttributeName::XLabel,
            "xSliderStep" => AttributeName::XSliderStep,
            "UseSubplots" => AttributeName::UseSubplots,
            "ToDisk" => AttributeName::ToDisk,
            "Include" => AttributeName::Include,
            "Height" => AttributeName::Height,
            "GraphTop" => AttributeName::GraphTop,
            "GraphBottom" => AttributeName::GraphBottom,
            "Title" => AttributeName::Title,
            "yLabel" => AttributeName::YLabel,
            "yValue" => AttributeName::YValue,
            _ => return None,
        };
        Some(parsed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeName::Datafile => "Datafile",
            AttributeName::XValue => "xValue",
            AttributeName::XLabel => "xLabel",
            AttributeName::XSliderStep => "xSliderStep",
            AttributeName::UseSubplots => "UseSubplots",
            AttributeName::ToDisk => "ToDisk",
            AttributeName::Include => "Include",
            AttributeName::Height => "Height",
            AttributeName::GraphTop => "GraphTop",
            AttributeName::GraphBottom => "GraphBottom",
            AttributeName::Title => "Title",
            AttributeName::YLabel => "yLabel",
            AttributeName::YValue => "yValue",
        }
    }
}

impl Attribute {
    pub fn name(&self) -> &str {
        match self {
            Attribute::Datafile => AttributeName::Datafile.as_str(),
            Attribute::XValue => AttributeName::XValue.as_str(),
            Attribute::XLabel => AttributeName::XLabel.as_str(),
            Attribute::XSliderStep => AttributeName::XSliderStep.as_str(),
            Attribute::UseSubplots => AttributeName::UseSubplots.as_str(),
            Attribute::ToDisk => AttributeName::ToDisk.as_str(),
            Attribute::Include => AttributeName::Include.as_str(),
            Attribute::Height => AttributeName::Height.as_str(),
            Attribute::GraphTop => AttributeName::GraphTop.as_str(),
            Attribute::GraphBottom => AttributeName::GraphBottom.as_str(),
            Attribute::Title { .. } => AttributeName::Title.as_str(),
            Attribute::YLabel { .. } => AttributeName::YLabel.as_str(),
            Attribute::YValue { .. } => AttributeName::YValue.as_str(),
            Attribute::Other(name) => name,
        }
    }

    /// Graph-set ordinal for per-graph and per-line rows.
    pub fn set(&self) -> Option<usize> {
        match self {
            Attribute::Title { set } | Attribute::YLabel { set } | Attribute::YValue { set, .. } => {
                Some(*set)
            }
            _ => None,
        }
    }
}

/// Row keys: `xValue`, `Title#002`, `yLabel#002`, `yValue#002-001`.
impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Title { set } | Attribute::YLabel { set } => {
                write!(f, "{}#{set:03}", self.name())
            }
            Attribute::YValue { set, line } => write!(f, "{}#{set:03}-{line:03}", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

/// Optional per-row fields. Numeric fields that are absent or NaN take their
/// defaults; text fields stay unset so the renderer default applies.
#[derive(Debug, Clone, PartialEq)]
pub struct RowStyle {
    pub scale: f64,
    pub offset: f64,
    pub colour: Option<String>,
    pub dash: Option<String>,
    pub width: Option<f64>,
    pub marker_opacity: Option<f64>,
    pub mode: Option<String>,
    pub graph_type: Option<String>,
    pub format: Option<String>,
    pub label: Option<String>,
}

impl Default for RowStyle {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: 0.0,
            colour: None,
            dash: None,
            width: None,
            marker_opacity: None,
            mode: None,
            graph_type: None,
            format: None,
            label: None,
        }
    }
}

/// One compiled configuration row.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigRow {
    pub attribute: Attribute,
    pub value: CellValue,
    pub style: RowStyle,
}

impl ConfigRow {
    pub fn key(&self) -> String {
        self.attribute.to_string()
    }

    pub fn text(&self) -> Option<String> {
        self.value.as_text()
    }
}
