pub mod app_state;
pub mod tab_state;
pub mod theme;

pub use app_state::AppState;
pub use tab_state::TabState;
pub use theme::Theme;
