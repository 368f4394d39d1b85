mod common;

use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use dashplot::config::compile;
use dashplot::data::load_all;
use dashplot::server::router;
use dashplot::state::AppState;

fn app() -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let datafile = common::write_datafile(dir.path());
    let config = compile(&common::workbook(&datafile)).unwrap();
    let report = load_all(&config);
    let state = AppState::new(config, report.store, None);
    (dir, router(Arc::new(Mutex::new(state))))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn serves_page_and_tabs() {
    let (_dir, app) = app();
    let (status, body) = send(app.clone(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("<!DOCTYPE html>"));

    let (status, body) = send(app.clone(), get("/tabs/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("data-chart=\"graph-all\""));

    let (status, body) = send(app, get("/tabs/5")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Unknown tab index 5"));
}

#[tokio::test]
async fn click_read_out_uses_history() {
    let (_dir, app) = app();
    send(app.clone(), post_json("/charts/graph-alt000/click", r#"{"x": 2.0, "y": 3.0}"#)).await;
    let (status, body) = send(
        app,
        post_json("/charts/graph-alt000/click", r#"{"x": 5.0, "y": 3.5}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        json["message"],
        "Previous [x, y]: [2.000000, 3.000000]\nCurrent [x, y]: [5.000000, 3.500000]\nRange [x, y]: [3.000000, 0.500000]"
    );
}

#[tokio::test]
async fn selection_read_out() {
    let (_dir, app) = app();
    let (_, body) = send(
        app.clone(),
        post_json("/charts/graph-alt001/select", r#"{"range": {"x": [1.0, 2.0], "y": [0.0, 4.0]}}"#),
    )
    .await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(json["message"].as_str().unwrap().starts_with("Top left [x, y]: [1.000000, 4.000000]"));

    let (_, body) = send(app, post_json("/charts/graph-alt001/select", r#"{"range": null}"#)).await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["message"], "none selected");
}

#[tokio::test]
async fn range_and_reset_return_new_figures() {
    let (_dir, app) = app();
    let (status, body) = send(
        app.clone(),
        post_json("/tabs/0/range", r#"{"value": [2.0, 5.0]}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["message"], "Selected range [2.000000, 5.000000]");
    assert_eq!(json["charts"].as_array().unwrap().len(), 2);
    assert_eq!(json["charts"][0]["figure"]["data"][0]["x"].as_array().unwrap().len(), 4);
    assert_eq!(json["clear_inputs"], false);

    let (status, body) = send(app, post_json("/tabs/0/reset", "{}")).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["value"][0], 0.0);
    assert_eq!(json["value"][1], 10.0);
    assert_eq!(json["clear_inputs"], true);
    assert_eq!(json["charts"][0]["figure"]["data"][0]["x"].as_array().unwrap().len(), 11);
}
