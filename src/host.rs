//! Desktop window that owns the dashboard session.
//!
//! The served page is embedded in the central panel as a child webview. Where
//! no webview can be created the window opens the page in the system browser
//! and lists the tab states instead. Closing the window ends the process.

use eframe::egui;

use crate::server::{lock, SharedState};
use crate::state::theme::Theme;

#[cfg(not(target_os = "linux"))]
mod embed {
    use eframe::egui;
    use wry::dpi::{LogicalPosition, LogicalSize};
    use wry::{Rect, WebView, WebViewBuilder};

    /// The served page in a webview parented to the host window.
    pub struct EmbeddedPage {
        view: WebView,
        bounds: egui::Rect,
    }

    impl EmbeddedPage {
        pub fn create(cc: &eframe::CreationContext<'_>, url: &str) -> Option<Self> {
            match WebViewBuilder::new().with_url(url).build_as_child(cc) {
                Ok(view) => Some(Self {
                    view,
                    bounds: egui::Rect::NOTHING,
                }),
                Err(e) => {
                    tracing::warn!("Cannot embed the dashboard: {}", e);
                    None
                }
            }
        }

        /// Keep the webview over `rect`, in window points.
        pub fn place(&mut self, rect: egui::Rect) {
            if rect == self.bounds {
                return;
            }
            self.bounds = rect;
            let bounds = Rect {
                position: LogicalPosition::new(rect.min.x, rect.min.y).into(),
                size: LogicalSize::new(rect.width(), rect.height()).into(),
            };
            if let Err(e) = self.view.set_bounds(bounds) {
                tracing::warn!("Cannot resize the embedded dashboard: {}", e);
            }
        }

        pub fn reload(&self, url: &str) {
            if let Err(e) = self.view.load_url(url) {
                tracing::warn!("Cannot reload the embedded dashboard: {}", e);
            }
        }
    }
}

/// Child webviews need a GTK window on Linux, which eframe does not provide.
#[cfg(target_os = "linux")]
mod embed {
    use eframe::egui;

    pub enum EmbeddedPage {}

    impl EmbeddedPage {
        pub fn create(_cc: &eframe::CreationContext<'_>, _url: &str) -> Option<Self> {
            tracing::info!("No embedded webview on this platform");
            None
        }

        pub fn place(&mut self, _rect: egui::Rect) {
            match *self {}
        }

        pub fn reload(&self, _url: &str) {
            match *self {}
        }
    }
}

use embed::EmbeddedPage;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tab summary copied out of the shared state once per frame.
struct TabRow {
    label: String,
    charts: usize,
    error: Option<String>,
}

pub struct HostWindow {
    title: String,
    url: String,
    state: SharedState,
    theme: Theme,
    page: Option<EmbeddedPage>,
    opened: bool,
}

impl HostWindow {
    pub fn new(cc: &eframe::CreationContext<'_>, title: String, url: String, state: SharedState) -> Self {
        let ctx = &cc.egui_ctx;
        let mut style = (*ctx.style()).clone();
        style.text_styles.insert(
            egui::TextStyle::Body,
            egui::FontId::proportional(15.0),
        );
        style.text_styles.insert(
            egui::TextStyle::Heading,
            egui::FontId::proportional(22.0),
        );
        style.spacing.button_padding = egui::vec2(10.0, 5.0);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        ctx.set_style(style);

        let theme = lock(&state).theme;
        ctx.set_visuals(theme.visuals());
        let page = EmbeddedPage::create(cc, &url);

        Self {
            title,
            url,
            state,
            theme,
            opened: page.is_some(),
            page,
        }
    }

    /// Apply a theme to this window and to the charts, then refresh the page.
    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        lock(&self.state).set_theme(theme);
        if let Some(page) = &self.page {
            page.reload(&self.url);
        }
    }

    fn tab_rows(&self) -> Vec<TabRow> {
        lock(&self.state)
            .tabs
            .iter()
            .map(|t| TabRow {
                label: t.label.clone(),
                charts: t.model.as_ref().map_or(0, |m| m.charts.len()),
                error: t.error.clone(),
            })
            .collect()
    }

    fn open_dashboard(&self, ctx: &egui::Context) {
        tracing::info!("Opening {}", self.url);
        ctx.open_url(egui::OpenUrl::new_tab(&self.url));
    }
}

impl eframe::App for HostWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(self.theme.visuals());

        if !self.opened {
            self.opened = true;
            self.open_dashboard(ctx);
        }

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 8)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(&self.title);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let theme_label = match self.theme {
                            Theme::Dark => "Light Mode",
                            Theme::Light => "Dark Mode",
                        };
                        if ui.button(theme_label).clicked() {
                            self.set_theme(self.theme.toggle());
                        }
                        if self.page.is_some() && ui.button("Open in browser").clicked() {
                            self.open_dashboard(ctx);
                        }
                        ui.separator();
                        ui.small(format!("v{VERSION}"));
                    });
                });
            });

        egui::TopBottomPanel::bottom("footer")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 6)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("Serving on").weak());
                    ui.hyperlink(&self.url);
                    ui.separator();
                    ui.label(egui::RichText::new(format!("{} theme", self.theme.label())).weak());
                });
            });

        if let Some(page) = &mut self.page {
            egui::CentralPanel::default()
                .frame(egui::Frame::NONE)
                .show(ctx, |ui| page.place(ui.max_rect()));
            return;
        }

        let rows = self.tab_rows();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);
            if ui
                .add(egui::Button::new(egui::RichText::new("Open dashboard").strong()).min_size(egui::vec2(160.0, 28.0)))
                .clicked()
            {
                self.open_dashboard(ctx);
            }
            ui.add_space(12.0);

            if rows.is_empty() {
                ui.label(egui::RichText::new("No graph sheets are included.").weak());
                return;
            }

            egui::ScrollArea::vertical().show(ui, |ui| {
                egui::Grid::new("tabs")
                    .striped(true)
                    .num_columns(3)
                    .show(ui, |ui| {
                        ui.strong("Tab");
                        ui.strong("Charts");
                        ui.strong("Status");
                        ui.end_row();
                        for row in &rows {
                            ui.label(&row.label);
                            ui.label(row.charts.to_string());
                            match &row.error {
                                Some(e) => {
                                    ui.colored_label(egui::Color32::from_rgb(255, 80, 80), e);
                                }
                                None => {
                                    ui.label("ok");
                                }
                            }
                            ui.end_row();
                        }
                    });
            });
        });
    }
}

/// Run the host window on the calling thread until it is closed.
pub fn run(title: String, url: String, state: SharedState) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(&title)
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([400.0, 240.0]),
        ..Default::default()
    };

    eframe::run_native(
        "dashplot",
        options,
        Box::new(move |cc| Ok(Box::new(HostWindow::new(cc, title, url, state)))),
    )
}
