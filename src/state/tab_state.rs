use std::path::Path;

use crate::config::{GraphSetSpec, GraphSheet};
use crate::data::DatasetStore;
use crate::error::BuildError;
use crate::plot::{build_graph_set, export_graph_set, GraphSetModel, XRange};
use crate::state::theme::Theme;

/// One dashboard tab and the model it currently shows.
#[derive(Debug, Clone)]
pub struct TabState {
    /// Position among the included tabs; the page addresses it as `Tab {index}`.
    pub index: usize,
    pub label: String,
    pub spec: GraphSetSpec,
    /// Full x extent from the first successful build, used by submit and reset.
    pub original: Option<(f64, f64)>,
    pub range: Option<XRange>,
    pub model: Option<GraphSetModel>,
    pub error: Option<String>,
}

impl TabState {
    pub fn new(index: usize, sheet: &GraphSheet) -> Self {
        Self {
            index,
            label: sheet.tab_label.clone(),
            spec: sheet.spec.clone(),
            original: None,
            range: None,
            model: None,
            error: None,
        }
    }

    /// Rebuild for `range`, replacing the model wholesale. A failed build
    /// clears the model and keeps the error for display.
    pub fn rebuild(
        &mut self,
        store: &DatasetStore,
        range: Option<XRange>,
        theme: Theme,
        export_dir: Option<&Path>,
    ) -> Result<&GraphSetModel, BuildError> {
        let model = match build_graph_set(&self.spec, store, range, theme) {
            Ok(model) => model,
            Err(e) => {
                tracing::error!("Failed to build tab '{}': {}", self.label, e);
                self.model = None;
                self.error = Some(e.to_string());
                return Err(e);
            }
        };

        if self.original.is_none() {
            self.original = Some((model.x_min, model.x_max));
        }
        if let Some(dir) = export_dir.filter(|_| self.spec.to_disk) {
            if let Err(e) = export_graph_set(&model, dir) {
                tracing::error!("Failed to export tab '{}': {}", self.label, e);
            }
        }

        self.range = range;
        self.error = None;
        Ok(self.model.insert(model))
    }

    pub fn chart_ids(&self) -> Vec<String> {
        self.spec.chart_ids()
    }
}
