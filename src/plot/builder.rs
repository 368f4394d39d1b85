use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::{GraphSetSpec, LineSpec, PanelSpec};
use crate::data::{Dataset, DatasetStore};
use crate::error::BuildError;
use crate::plot::figure::{
    y_axis_key, y_axis_ref, Annotation, Axis, Figure, Font, Layout, LineStyle, Marker, Title,
    Trace,
};
use crate::settings::{FALLBACK_SLIDER_STEP, SLIDER_MARKS, SUBPLOT_SPACING};
use crate::state::theme::Theme;

/// Requested x window, in plotted (scaled) units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XRange {
    pub start: f64,
    pub end: f64,
}

impl XRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Clamp to `[min, max]`. An end at or before the start means "to the end".
    pub fn clamp_to(self, min: f64, max: f64) -> Self {
        let start = self.start.max(min).min(max);
        let mut end = self.end.min(max);
        if end <= start {
            end = max;
        }
        Self { start, end }
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.start && x <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderMark {
    pub value: f64,
    pub label: String,
}

/// Range slider settings for one tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderSpec {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub marks: Vec<SliderMark>,
}

impl SliderSpec {
    pub fn new(min: f64, max: f64, configured_step: Option<f64>, samples: usize) -> Self {
        let step = configured_step
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or_else(|| default_step(min, max, samples));
        let marks = linspace(min, max, SLIDER_MARKS)
            .into_iter()
            .map(|value| SliderMark {
                value,
                label: format!("{value:.4}s"),
            })
            .collect();
        Self {
            min,
            max,
            step,
            marks,
        }
    }
}

fn default_step(min: f64, max: f64, samples: usize) -> f64 {
    if samples == 0 {
        return FALLBACK_SLIDER_STEP;
    }
    let step = ((max - min) / samples as f64 * 1000.0).round() / 1000.0;
    if step.is_finite() && step > 0.0 {
        step
    } else {
        FALLBACK_SLIDER_STEP
    }
}

fn linspace(min: f64, max: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![min],
        _ => (0..count)
            .map(|i| min + (max - min) * i as f64 / (count - 1) as f64)
            .collect(),
    }
}

/// One chart on a tab: a single panel, or every panel as stacked subplots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: String,
    /// File stem used when the chart is exported, e.g. `graph-alt#000`.
    pub export_name: String,
    pub figure: Figure,
    pub height: f64,
    pub has_markers: bool,
}

/// Everything a tab shows, built from one graph sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSetModel {
    pub sheet: String,
    pub charts: Vec<ChartSpec>,
    pub slider: SliderSpec,
    pub x_min: f64,
    pub x_max: f64,
}

impl GraphSetModel {
    pub fn chart_ids(&self) -> Vec<String> {
        self.charts.iter().map(|c| c.id.clone()).collect()
    }

    pub fn chart(&self, id: &str) -> Option<&ChartSpec> {
        self.charts.iter().find(|c| c.id == id)
    }
}

/// Rows of the dataset that fall inside the x window, already transformed.
struct Slice<'a> {
    dataset: &'a Dataset,
    file: &'a str,
    keep: Vec<usize>,
    x: Vec<f64>,
}

impl Slice<'_> {
    fn line(&self, line: &LineSpec) -> Result<Vec<f64>, BuildError> {
        let raw = self
            .dataset
            .column(&line.source.column)
            .ok_or_else(|| BuildError::MissingColumn {
                file: self.file.to_string(),
                column: line.source.column.clone(),
            })?;
        Ok(self.keep.iter().map(|&i| line.source.apply(raw[i])).collect())
    }
}

fn finite_bounds(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Build the charts and slider of one graph sheet.
///
/// `range` limits the x axis; `None` shows the full data range. `theme` picks
/// the plot background and grid colours. The result depends only on the inputs.
pub fn build_graph_set(
    spec: &GraphSetSpec,
    store: &DatasetStore,
    range: Option<XRange>,
    theme: Theme,
) -> Result<GraphSetModel, BuildError> {
    let dataset = store
        .get(&spec.datafile)
        .ok_or_else(|| BuildError::MissingDataset(spec.datafile.clone()))?;

    let raw_x = dataset
        .column(&spec.x.column)
        .ok_or_else(|| BuildError::MissingColumn {
            file: spec.datafile.clone(),
            column: spec.x.column.clone(),
        })?;
    let x_all: Vec<f64> = raw_x.iter().map(|&v| spec.x.apply(v)).collect();
    let (data_min, data_max) = finite_bounds(&x_all).ok_or_else(|| BuildError::EmptyAxis {
        file: spec.datafile.clone(),
        column: spec.x.column.clone(),
    })?;

    let window = range
        .map(|r| r.clamp_to(data_min, data_max))
        .unwrap_or(XRange::new(data_min, data_max));
    let keep: Vec<usize> = (0..x_all.len())
        .filter(|&i| window.contains(x_all[i]))
        .collect();
    let x: Vec<f64> = keep.iter().map(|&i| x_all[i]).collect();
    let (x_min, x_max) = finite_bounds(&x).unwrap_or((window.start, window.end));

    let slice = Slice {
        dataset,
        file: &spec.datafile,
        keep,
        x,
    };

    let charts = if spec.use_subplots {
        vec![combined_chart(spec, &slice, theme)?]
    } else {
        spec.panels
            .iter()
            .map(|panel| single_chart(spec, panel, &slice, theme))
            .collect::<Result<Vec<_>, _>>()?
    };

    tracing::debug!(
        "Built {} chart(s) for '{}' over x in [{}, {}]",
        charts.len(),
        spec.sheet,
        x_min,
        x_max
    );

    Ok(GraphSetModel {
        sheet: spec.sheet.clone(),
        charts,
        slider: SliderSpec::new(x_min, x_max, spec.slider_step, slice.x.len()),
        x_min,
        x_max,
    })
}

fn trace(line: &LineSpec, slice: &Slice, y_axis: Option<String>) -> Result<Trace, BuildError> {
    Ok(Trace {
        x: slice.x.clone(),
        y: slice.line(line)?,
        mode: line.mode.clone(),
        trace_type: line.graph_type.clone(),
        name: line.label.clone(),
        showlegend: true,
        line: LineStyle {
            color: line.colour.clone(),
            width: line.width,
            dash: line.dash.clone(),
        },
        marker: Marker {
            opacity: line.marker_opacity,
        },
        xaxis: y_axis.as_ref().map(|_| "x".to_string()),
        yaxis: y_axis,
    })
}

fn axis(title: &str, hoverformat: &str, theme: Theme) -> Axis {
    Axis {
        title: Some(Title::new(title)),
        hoverformat: Some(hoverformat.to_string()),
        gridcolor: Some(theme.grid_color().to_string()),
        ..Axis::default()
    }
}

fn single_chart(
    spec: &GraphSetSpec,
    panel: &PanelSpec,
    slice: &Slice,
    theme: Theme,
) -> Result<ChartSpec, BuildError> {
    let data = panel
        .lines
        .iter()
        .map(|line| trace(line, slice, None))
        .collect::<Result<Vec<_>, _>>()?;

    let mut yaxes = BTreeMap::new();
    yaxes.insert(
        y_axis_key(1),
        axis(&panel.y_label, &panel.y_hover_format, theme),
    );

    let layout = Layout {
        title: Some(Title::new(&panel.title)),
        xaxis: axis(&spec.x_label, &spec.x_hover_format, theme),
        yaxes,
        clickmode: "event+select".to_string(),
        hovermode: "x".to_string(),
        plot_bgcolor: theme.plot_bg().to_string(),
        height: spec.height,
        annotations: Vec::new(),
        font: None,
    };

    Ok(ChartSpec {
        id: format!("{}{}", spec.sheet, panel.ordinal_str()),
        export_name: format!("{}#{}", spec.sheet, panel.ordinal_str()),
        figure: Figure { data, layout },
        height: spec.height,
        has_markers: panel.lines.iter().any(LineSpec::uses_markers),
    })
}

/// Vertical `[bottom, top]` domain of each stacked row, top row first.
pub fn subplot_domains(rows: usize, spacing: f64) -> Vec<[f64; 2]> {
    if rows == 0 {
        return Vec::new();
    }
    let height = (1.0 - spacing * (rows - 1) as f64) / rows as f64;
    (0..rows)
        .map(|i| {
            let top = 1.0 - i as f64 * (height + spacing);
            [(top - height).max(0.0), top.min(1.0)]
        })
        .collect()
}

fn combined_chart(
    spec: &GraphSetSpec,
    slice: &Slice,
    theme: Theme,
) -> Result<ChartSpec, BuildError> {
    let rows = spec.panels.len();
    let domains = subplot_domains(rows, SUBPLOT_SPACING);

    let mut data = Vec::new();
    let mut yaxes = BTreeMap::new();
    let mut annotations = Vec::new();
    for (i, (panel, domain)) in spec.panels.iter().zip(&domains).enumerate() {
        let n = i + 1;
        for line in &panel.lines {
            data.push(trace(line, slice, Some(y_axis_ref(n)))?);
        }
        yaxes.insert(
            y_axis_key(n),
            Axis {
                domain: Some(*domain),
                anchor: Some("x".to_string()),
                ..axis(&panel.y_label, &panel.y_hover_format, theme)
            },
        );
        annotations.push(Annotation::subplot_title(&panel.title, domain[1]));
    }

    let height = rows as f64 * spec.height;
    let layout = Layout {
        title: None,
        xaxis: Axis {
            anchor: Some(y_axis_ref(rows)),
            ..axis(&spec.x_label, &spec.x_hover_format, theme)
        },
        yaxes,
        clickmode: "event+select".to_string(),
        hovermode: "x".to_string(),
        plot_bgcolor: theme.plot_bg().to_string(),
        height,
        annotations,
        font: Some(Font { size: 10.0 }),
    };

    Ok(ChartSpec {
        id: spec.sheet.clone(),
        export_name: spec.sheet.clone(),
        figure: Figure { data, layout },
        height,
        has_markers: spec.has_markers(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AxisSource;

    fn line(column: &str, mode: &str) -> LineSpec {
        LineSpec {
            source: AxisSource {
                column: column.into(),
                scale: 1.0,
                offset: 0.0,
            },
            colour: None,
            width: None,
            dash: None,
            marker_opacity: 0.0,
            mode: mode.into(),
            graph_type: None,
            label: column.into(),
        }
    }

    fn panel(ordinal: usize, lines: Vec<LineSpec>) -> PanelSpec {
        PanelSpec {
            ordinal,
            title: format!("Panel {ordinal}"),
            y_label: "y".into(),
            y_hover_format: ".4f".into(),
            lines,
        }
    }

    fn spec(panels: Vec<PanelSpec>, use_subplots: bool) -> GraphSetSpec {
        GraphSetSpec {
            sheet: "graph-a".into(),
            datafile: "run.txt".into(),
            x: AxisSource {
                column: "Time".into(),
                scale: 1.0,
                offset: 0.0,
            },
            x_label: "Time [s]".into(),
            x_hover_format: ".4f".into(),
            slider_step: None,
            panels,
            use_subplots,
            to_disk: false,
            include: true,
            height: 400.0,
            graph_top: None,
            graph_bottom: None,
        }
    }

    fn store() -> DatasetStore {
        let time: Vec<f64> = (0..=10).map(|i| i as f64).collect();
        let a: Vec<f64> = time.iter().map(|t| t * 2.0).collect();
        let b: Vec<f64> = time.iter().map(|t| t + 100.0).collect();
        let c = vec![1.0; 11];
        let mut store = DatasetStore::new();
        store.insert(
            "run.txt",
            Dataset::from_columns(
                vec!["Time".into(), "a".into(), "b".into(), "c".into()],
                vec![time, a, b, c],
            )
            .unwrap(),
        );
        store
    }

    #[test]
    fn one_title_three_lines_gives_one_chart() {
        let spec = spec(
            vec![panel(0, vec![line("a", "lines"), line("b", "lines"), line("c", "lines")])],
            false,
        );
        let model = build_graph_set(&spec, &store(), None, Theme::Light).unwrap();
        assert_eq!(model.chart_ids(), vec!["graph-a000"]);
        assert_eq!(model.charts[0].figure.data.len(), 3);
        assert_eq!(model.charts[0].export_name, "graph-a#000");
        assert!(!model.charts[0].has_markers);
    }

    #[test]
    fn range_is_clamped_and_sliced() {
        let spec = spec(vec![panel(0, vec![line("a", "lines")])], false);
        let model =
            build_graph_set(&spec, &store(), Some(XRange::new(-5.0, 3.0)), Theme::Light).unwrap();
        assert_eq!(model.x_min, 0.0);
        assert_eq!(model.x_max, 3.0);
        assert_eq!(model.charts[0].figure.data[0].y, vec![0.0, 2.0, 4.0, 6.0]);

        // End before start runs to the data end.
        let model =
            build_graph_set(&spec, &store(), Some(XRange::new(4.0, 2.0)), Theme::Light).unwrap();
        assert_eq!(model.x_min, 4.0);
        assert_eq!(model.x_max, 10.0);
    }

    #[test]
    fn slider_marks_and_step() {
        let spec = spec(vec![panel(0, vec![line("a", "lines")])], false);
        let model = build_graph_set(&spec, &store(), None, Theme::Light).unwrap();
        assert_eq!(model.slider.marks.len(), 11);
        assert_eq!(model.slider.marks[0].label, "0.0000s");
        assert_eq!(model.slider.marks[10].label, "10.0000s");
        // 10 / 11 samples, rounded to three decimals.
        assert_eq!(model.slider.step, 0.909);
    }

    #[test]
    fn scale_and_offset_apply_to_both_axes() {
        let mut spec = spec(vec![panel(0, vec![line("c", "lines")])], false);
        spec.x.scale = 0.5;
        spec.x.offset = 1.0;
        spec.panels[0].lines[0].source.scale = 3.0;
        spec.panels[0].lines[0].source.offset = -1.0;
        let model = build_graph_set(&spec, &store(), None, Theme::Light).unwrap();
        let trace = &model.charts[0].figure.data[0];
        assert_eq!(trace.x[0], 1.0);
        assert_eq!(trace.x[10], 6.0);
        assert!(trace.y.iter().all(|&v| v == 2.0));
    }

    #[test]
    fn subplots_share_one_chart() {
        let spec = spec(
            vec![
                panel(0, vec![line("a", "lines")]),
                panel(1, vec![line("b", "lines+markers"), line("c", "lines")]),
            ],
            true,
        );
        let model = build_graph_set(&spec, &store(), None, Theme::Light).unwrap();
        assert_eq!(model.chart_ids(), vec!["graph-a"]);
        let chart = &model.charts[0];
        assert_eq!(chart.height, 800.0);
        assert!(chart.has_markers);
        assert_eq!(chart.figure.data[0].yaxis.as_deref(), Some("y"));
        assert_eq!(chart.figure.data[2].yaxis.as_deref(), Some("y2"));
        assert_eq!(chart.figure.layout.annotations.len(), 2);
        assert_eq!(chart.figure.layout.xaxis.anchor.as_deref(), Some("y2"));
        assert!(chart.figure.layout.yaxes.contains_key("yaxis2"));
    }

    #[test]
    fn subplot_domains_stack_top_down() {
        let domains = subplot_domains(2, 0.1);
        assert!((domains[0][1] - 1.0).abs() < 1e-12);
        assert!((domains[0][0] - 0.55).abs() < 1e-12);
        assert!((domains[1][1] - 0.45).abs() < 1e-12);
        assert!(domains[1][0].abs() < 1e-12);
    }

    #[test]
    fn missing_inputs_are_errors() {
        let spec = spec(vec![panel(0, vec![line("nope", "lines")])], false);
        assert!(matches!(
            build_graph_set(&spec, &store(), None, Theme::Light),
            Err(BuildError::MissingColumn { .. })
        ));
        assert!(matches!(
            build_graph_set(&spec, &DatasetStore::new(), None, Theme::Light),
            Err(BuildError::MissingDataset(_))
        ));
    }

    #[test]
    fn dark_theme_colours_every_axis() {
        let spec = spec(
            vec![panel(0, vec![line("a", "lines")]), panel(1, vec![line("b", "lines")])],
            true,
        );
        let model = build_graph_set(&spec, &store(), None, Theme::Dark).unwrap();
        let layout = &model.charts[0].figure.layout;
        assert_eq!(layout.plot_bgcolor, Theme::Dark.plot_bg());
        assert_eq!(layout.xaxis.gridcolor.as_deref(), Some(Theme::Dark.grid_color()));
        assert!(layout
            .yaxes
            .values()
            .all(|a| a.gridcolor.as_deref() == Some(Theme::Dark.grid_color())));
    }

    #[test]
    fn building_twice_gives_the_same_model() {
        let spec = spec(vec![panel(0, vec![line("a", "markers")])], false);
        let window = Some(XRange::new(2.0, 8.0));
        let first = build_graph_set(&spec, &store(), window, Theme::Light).unwrap();
        let second = build_graph_set(&spec, &store(), window, Theme::Light).unwrap();
        assert_eq!(first, second);
        assert!(first.charts[0].has_markers);
    }
}
