//! Fixed defaults shared by the compiler, builder and server.

/// Workbook read when no `--configfile` is given.
pub const DEFAULT_CONFIG_PATH: &str = "./dash-config.xlsx";

/// Port the dashboard is served on.
pub const DEFAULT_PORT: u16 = 8050;

/// Directory that receives the standalone HTML exports.
pub const GRAPH_DIR: &str = "graphs";

/// Name of the sheet holding page-level settings.
pub const HEADER_SHEET: &str = "header";

/// Substring that marks a sheet as a graph sheet.
pub const GRAPH_SHEET_MARKER: &str = "graph";

/// Datafile value that refers to the header sheet's datafile.
pub const MASTER_DATAFILE: &str = "master";

/// Page title used when the header sheet has no `Pagetitle`.
pub const DEFAULT_PAGE_TITLE: &str = "Dashboard server for plotting";

/// Number of labelled marks on every x-range slider.
pub const SLIDER_MARKS: usize = 11;

/// Slider step used when the data gives no usable step.
pub const FALLBACK_SLIDER_STEP: f64 = 0.001;

/// Chart height in pixels when a sheet has no `Height` row.
pub const DEFAULT_HEIGHT: f64 = 450.0;

/// Hover format for axes without an explicit `Format`.
pub const DEFAULT_HOVER_FORMAT: &str = ".4f";

/// Vertical gap between stacked subplot panels, as a fraction of the figure.
pub const SUBPLOT_SPACING: f64 = 0.075;

/// plotly.js bundle referenced by the served page and the exports.
pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
