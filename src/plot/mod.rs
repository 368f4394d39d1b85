//! Chart models built from a compiled graph sheet and its dataset.

pub mod builder;
pub mod export;
pub mod figure;

pub use builder::{build_graph_set, ChartSpec, GraphSetModel, SliderMark, SliderSpec, XRange};
pub use export::{export_chart, export_graph_set};
pub use figure::Figure;
