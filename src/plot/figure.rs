//! plotly.js figure description, serialized straight into the page and exports.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LineStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub opacity: f64,
}

/// One line. NaN samples serialize as `null`, which plotly draws as gaps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub mode: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub trace_type: Option<String>,
    pub name: String,
    pub showlegend: bool,
    pub line: LineStyle,
    /// Markers stay present (even transparent) so the selection tool is offered.
    pub marker: Marker,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoverformat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gridcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub xref: String,
    pub yref: String,
    pub xanchor: String,
    pub yanchor: String,
    pub showarrow: bool,
}

impl Annotation {
    /// Centered title sitting on top of a subplot whose domain ends at `top`.
    pub fn subplot_title(text: impl Into<String>, top: f64) -> Self {
        Self {
            text: text.into(),
            x: 0.5,
            y: top,
            xref: "paper".to_string(),
            yref: "paper".to_string(),
            xanchor: "center".to_string(),
            yanchor: "bottom".to_string(),
            showarrow: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    pub xaxis: Axis,
    /// `yaxis`, `yaxis2`, ... keyed by their plotly layout name.
    #[serde(flatten)]
    pub yaxes: BTreeMap<String, Axis>,
    pub clickmode: String,
    pub hovermode: String,
    pub plot_bgcolor: String,
    pub height: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

/// Layout key of the `n`th (1-based) y axis: `yaxis`, `yaxis2`, ...
pub fn y_axis_key(n: usize) -> String {
    if n <= 1 {
        "yaxis".to_string()
    } else {
        format!("yaxis{n}")
    }
}

/// Trace reference of the `n`th (1-based) y axis: `y`, `y2`, ...
pub fn y_axis_ref(n: usize) -> String {
    if n <= 1 {
        "y".to_string()
    } else {
        format!("y{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_names_follow_plotly_convention() {
        assert_eq!(y_axis_key(1), "yaxis");
        assert_eq!(y_axis_key(3), "yaxis3");
        assert_eq!(y_axis_ref(1), "y");
        assert_eq!(y_axis_ref(2), "y2");
    }

    #[test]
    fn serializes_with_plotly_field_names() {
        let mut yaxes = BTreeMap::new();
        yaxes.insert("yaxis".to_string(), Axis::default());
        let figure = Figure {
            data: vec![Trace {
                x: vec![0.0, 1.0],
                y: vec![f64::NAN, 2.0],
                mode: "lines".into(),
                trace_type: Some("scattergl".into()),
                name: "alt".into(),
                showlegend: true,
                line: LineStyle::default(),
                marker: Marker { opacity: 0.0 },
                xaxis: None,
                yaxis: None,
            }],
            layout: Layout {
                title: Some(Title::new("Altitude")),
                xaxis: Axis::default(),
                yaxes,
                clickmode: "event+select".into(),
                hovermode: "x".into(),
                plot_bgcolor: "aliceblue".into(),
                height: 450.0,
                annotations: Vec::new(),
                font: None,
            },
        };
        let json = serde_json::to_value(&figure).unwrap();
        assert_eq!(json["data"][0]["type"], "scattergl");
        assert!(json["data"][0]["y"][0].is_null());
        assert!(json["data"][0].get("xaxis").is_none());
        assert!(json["layout"].get("yaxis").is_some());
        assert!(json["layout"].get("annotations").is_none());
        assert_eq!(json["layout"]["title"]["text"], "Altitude");
    }
}
