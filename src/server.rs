//! HTTP front end: serves the page and answers the interaction requests.

use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::error::Error;
use crate::interaction::{range_message, ClickEvent, SelectionEvent, SliderEvent};
use crate::plot::{Figure, XRange};
use crate::state::{AppState, TabState};
use crate::ui::page;

pub type SharedState = Arc<Mutex<AppState>>;

/// Lock the state; a handler that panicked mid-update leaves it usable.
pub fn lock(state: &SharedState) -> MutexGuard<'_, AppState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::UnknownTab(_) => StatusCode::NOT_FOUND,
            Error::Build(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ChartUpdate {
    pub id: String,
    pub figure: Figure,
}

/// Reply to a slider change, submit or reset.
#[derive(Debug, Serialize)]
pub struct RangeResponse {
    pub message: String,
    pub value: [f64; 2],
    pub clear_inputs: bool,
    pub charts: Vec<ChartUpdate>,
}

impl RangeResponse {
    fn new(tab: &TabState, message: String, value: [f64; 2], clear_inputs: bool) -> Self {
        let charts = tab
            .model
            .iter()
            .flat_map(|m| m.charts.iter())
            .map(|c| ChartUpdate {
                id: c.id.clone(),
                figure: c.figure.clone(),
            })
            .collect();
        Self {
            message,
            value,
            clear_inputs,
            charts,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/tabs/:index", get(tab))
        .route("/tabs/:index/range", post(range))
        .route("/tabs/:index/reset", post(reset))
        .route("/charts/:id/click", post(click))
        .route("/charts/:id/select", post(select))
        .with_state(state)
}

async fn index(State(state): State<SharedState>) -> Html<String> {
    Html(page::render_page(&lock(&state)))
}

async fn tab(
    State(state): State<SharedState>,
    Path(index): Path<usize>,
) -> Result<Html<String>, Error> {
    let html = page::render_tab(&lock(&state), index)?;
    Ok(Html(html))
}

async fn range(
    State(state): State<SharedState>,
    Path(index): Path<usize>,
    Json(event): Json<SliderEvent>,
) -> Result<Json<RangeResponse>, Error> {
    let mut app = lock(&state);
    let message = app.apply_slider(index, event)?;
    let tab = app.tab(index)?;
    let value = tab
        .range
        .map_or(event.value, |r: XRange| [r.start, r.end]);
    Ok(Json(RangeResponse::new(tab, message, value, false)))
}

async fn reset(
    State(state): State<SharedState>,
    Path(index): Path<usize>,
) -> Result<Json<RangeResponse>, Error> {
    let mut app = lock(&state);
    let reset = app.reset_slider(index)?;
    let message = range_message(XRange::new(reset.value[0], reset.value[1]));
    let tab = app.tab(index)?;
    Ok(Json(RangeResponse::new(tab, message, reset.value, true)))
}

async fn click(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(event): Json<ClickEvent>,
) -> Json<MessageResponse> {
    let message = lock(&state).click(&id, event);
    Json(MessageResponse { message })
}

async fn select(Path(id): Path<String>, Json(event): Json<SelectionEvent>) -> Json<MessageResponse> {
    tracing::debug!("Selection on chart '{}'", id);
    Json(MessageResponse {
        message: event.message(),
    })
}

/// Bind the listening socket up front so a busy port fails before any window opens.
pub fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind(addr)?;
    listener.set_nonblocking(true)?;
    Ok(listener)
}

/// Serve on a named background thread with its own runtime.
pub fn spawn(
    state: SharedState,
    listener: TcpListener,
) -> std::io::Result<JoinHandle<std::io::Result<()>>> {
    std::thread::Builder::new()
        .name("dash-server".to_string())
        .spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener)?;
                tracing::info!("Serving dashboard on http://{}", listener.local_addr()?);
                axum::serve(listener, router(state)).await
            })
        })
}
