//! # dashplot
//!
//! Spreadsheet-driven line-chart dashboards.
//!
//! A workbook describes one dashboard tab per `graph` sheet: which datafile to
//! read, which column drives the x axis, and which columns are drawn as lines
//! (with scale, offset and styling). The crate compiles the workbook, loads the
//! datafiles, builds plotly.js figures for every tab and serves them as a
//! tabbed page with x-range sliders and click/selection read-outs.
//!
//! ```ignore
//! let config = dashplot::config::load_config("dash-config.xlsx")?;
//! let report = dashplot::data::loader::load_all(&config);
//! let state = dashplot::state::AppState::new(config, report.store, None);
//! ```

pub mod cleanup;
pub mod config;
pub mod data;
pub mod error;
pub mod host;
pub mod interaction;
pub mod plot;
pub mod server;
pub mod settings;
pub mod state;
pub mod ui;

pub use error::{Error, Result};
