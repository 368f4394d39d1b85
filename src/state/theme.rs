use egui::Visuals;
use serde::{Deserialize, Serialize};

/// Colour scheme shared by the charts and the host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn visuals(&self) -> Visuals {
        match self {
            Theme::Dark => Visuals::dark(),
            Theme::Light => Visuals::light(),
        }
    }

    /// CSS colour of the plotting area.
    pub fn plot_bg(&self) -> &'static str {
        match self {
            Theme::Light => "aliceblue",
            Theme::Dark => "#1e1e28",
        }
    }

    /// CSS colour of the axis grid lines.
    pub fn grid_color(&self) -> &'static str {
        match self {
            Theme::Light => "lightgrey",
            Theme::Dark => "dimgrey",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Light
    }
}
