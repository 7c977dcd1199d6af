use std::fs;
use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use ride_flow_map::config::ServerConfig;
use ride_flow_map::server::{CSV_NOT_FOUND, build_router};
use tower::ServiceExt;

fn config(dir: &tempfile::TempDir) -> ServerConfig {
    ServerConfig {
        public_dir: dir.path().join("public"),
        csv_path: dir.path().join("data").join("pickup_dropoff_flows.csv"),
        port: 0,
    }
}

async fn get(config: ServerConfig, uri: &str) -> (StatusCode, Option<String>, String) {
    let resp = build_router(Arc::new(config))
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_data_missing_returns_404() {
    let dir = tempfile::tempdir().unwrap();
    let (status, _, body) = get(config(&dir), "/data").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, CSV_NOT_FOUND);
    assert_eq!(body, "CSV file not found");
}

#[tokio::test]
async fn test_data_serves_whole_csv() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(&dir);
    fs::create_dir_all(cfg.csv_path.parent().unwrap()).unwrap();
    let csv = "pickup_lat,pickup_lon,probability_%\n40.7128,-74.006,65.0\n";
    fs::write(&cfg.csv_path, csv).unwrap();

    let (status, content_type, body) = get(cfg, "/data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, csv);
    assert!(content_type.unwrap().starts_with("text/csv"));
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(&dir);
    fs::create_dir_all(&cfg.public_dir).unwrap();
    fs::write(cfg.public_dir.join("index.html"), "<h1>flows</h1>").unwrap();

    let (status, content_type, body) = get(cfg.clone(), "/index.html").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<h1>flows</h1>");
    assert!(content_type.unwrap().starts_with("text/html"));

    let (status, _, body) = get(cfg, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<h1>flows</h1>");
}

#[tokio::test]
async fn test_missing_static_asset_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(&dir);
    fs::create_dir_all(&cfg.public_dir).unwrap();

    let (status, _, _) = get(cfg, "/script.js").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
