use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::{HeaderInfo, PlotConfig};
use crate::data::DatasetStore;
use crate::error::{Error, Result};
use crate::interaction::{
    range_message, ClickEvent, ClickHistory, SliderEvent, SliderReset, NONE_CLICKED,
};
use crate::state::tab_state::TabState;
use crate::state::theme::Theme;

/// Everything the server needs between requests.
#[derive(Debug)]
pub struct AppState {
    pub header: HeaderInfo,
    pub store: DatasetStore,
    pub tabs: Vec<TabState>,
    pub clicks: HashMap<String, ClickHistory>,
    pub theme: Theme,
    /// Where `to_disk` charts are written; `None` disables exports.
    pub export_dir: Option<PathBuf>,
}

impl AppState {
    /// Create one tab per included sheet and build each over its full range.
    pub fn new(config: PlotConfig, store: DatasetStore, export_dir: Option<PathBuf>) -> Self {
        let tabs: Vec<TabState> = config
            .included_sheets()
            .enumerate()
            .map(|(index, sheet)| TabState::new(index, sheet))
            .collect();
        let clicks = tabs
            .iter()
            .flat_map(TabState::chart_ids)
            .map(|id| (id, ClickHistory::default()))
            .collect();

        let mut state = Self {
            header: config.header,
            store,
            tabs,
            clicks,
            theme: Theme::default(),
            export_dir,
        };
        state.build_all();
        state
    }

    /// Build every tab over its current range; failures stay on the tab and
    /// are shown in its content.
    pub fn build_all(&mut self) {
        let export_dir = self.export_dir.as_deref();
        for tab in &mut self.tabs {
            // Errors are logged and kept on the tab.
            let _ = tab.rebuild(&self.store, tab.range, self.theme, export_dir);
        }
        tracing::info!(
            "Built {} tab(s), {} with errors",
            self.tabs.len(),
            self.tabs.iter().filter(|t| t.error.is_some()).count()
        );
    }

    /// Switch chart colours and rebuild every tab in place.
    pub fn set_theme(&mut self, theme: Theme) {
        if self.theme == theme {
            return;
        }
        tracing::info!("Switching charts to the {} theme", theme.label());
        self.theme = theme;
        self.build_all();
    }

    pub fn tab(&self, index: usize) -> Result<&TabState> {
        self.tabs.get(index).ok_or(Error::UnknownTab(index))
    }

    /// Rebuild a tab for a slider change or submit and return the read-out.
    pub fn apply_slider(&mut self, index: usize, event: SliderEvent) -> Result<String> {
        let export_dir = self.export_dir.clone();
        let store = &self.store;
        let tab = self
            .tabs
            .get_mut(index)
            .ok_or(Error::UnknownTab(index))?;

        let range = match tab.original {
            Some((min, max)) => event.resolve(min, max),
            None => event.resolve(f64::NEG_INFINITY, f64::INFINITY),
        };
        tab.rebuild(store, Some(range), self.theme, export_dir.as_deref())?;
        Ok(range_message(range))
    }

    /// Return a tab to its full range.
    pub fn reset_slider(&mut self, index: usize) -> Result<SliderReset> {
        let export_dir = self.export_dir.clone();
        let store = &self.store;
        let tab = self
            .tabs
            .get_mut(index)
            .ok_or(Error::UnknownTab(index))?;

        tab.rebuild(store, None, self.theme, export_dir.as_deref())?;
        let (min, max) = tab.original.unwrap_or((0.0, 0.0));
        Ok(SliderReset::new(min, max))
    }

    /// Record a click on a chart. Histories for unseen ids are created on demand.
    pub fn click(&mut self, chart_id: &str, event: ClickEvent) -> String {
        let (Some(x), Some(y)) = (event.x, event.y) else {
            return NONE_CLICKED.to_string();
        };
        self.clicks
            .entry(chart_id.to_string())
            .or_default()
            .record(x, y)
            .message()
    }
}
