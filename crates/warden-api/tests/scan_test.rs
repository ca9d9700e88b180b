//! Scan API integration tests.
//!
//! Run with: `cargo test -p warden-api --test scan_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::fixtures;
use helpers::{closed_port, test_config, test_server, FakeClamd};
use serde_json::{json, Value};

fn file_form(bytes: Vec<u8>, filename: &str, mime: &str) -> MultipartForm {
    let part = Part::bytes(bytes).file_name(filename).mime_type(mime);
    MultipartForm::new().add_part("file", part)
}

#[tokio::test]
async fn test_health_with_daemon_up() {
    let clamd = FakeClamd::start("stream: OK\n").await;
    let server = test_server(test_config(clamd.port));

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "warden");
    assert_eq!(body["clamav"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_with_daemon_down_is_degraded() {
    let server = test_server(test_config(closed_port().await));

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "degraded");
    assert!(body["clamav"].as_str().unwrap().starts_with("unhealthy"));
}

#[tokio::test]
async fn test_scan_clean_png() {
    let clamd = FakeClamd::start("stream: OK\n").await;
    let server = test_server(test_config(clamd.port));

    let response = server
        .post("/scan")
        .multipart(file_form(
            fixtures::create_test_png(32, 32),
            "photo.png",
            "image/png",
        ))
        .await;

    assert_eq!(response.status_code(), 200);
    let report: Value = response.json();
    assert_eq!(report["overall_safe"], true, "report: {}", report);
    assert_eq!(report["file_path"], "photo.png");
    assert_eq!(report["file_category"], "image");
    assert_eq!(report["mime_type"], "image/png");
    assert_eq!(report["malware_scan"]["status"], "clean");
    assert_eq!(report["content_analysis"]["status"], "safe");
    assert_eq!(report["image"]["width"], 32);
    assert_eq!(report["file_hash"].as_str().unwrap().len(), 64);
    assert_eq!(report["errors"], json!([]));

    let scans = clamd.scan_requests();
    assert_eq!(scans.len(), 1);
    assert!(scans[0].ends_with(".png"), "sent {:?}", scans[0]);
}

#[tokio::test]
async fn test_scan_removes_temp_file() {
    let clamd = FakeClamd::start("stream: OK\n").await;
    let server = test_server(test_config(clamd.port));

    let response = server
        .post("/scan")
        .multipart(file_form(fixtures::create_test_pdf(), "invoice.pdf", "application/pdf"))
        .await;
    assert_eq!(response.status_code(), 200);

    let scans = clamd.scan_requests();
    let scanned = scans[0].trim_start_matches("SCAN ");
    assert!(!std::path::Path::new(scanned).exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_uploaded_file_is_readable_by_daemon_user() {
    let clamd = FakeClamd::start("stream: OK\n").await;
    let server = test_server(test_config(clamd.port));

    let response = server
        .post("/scan")
        .multipart(file_form(fixtures::create_test_pdf(), "a.pdf", "application/pdf"))
        .await;
    assert_eq!(response.status_code(), 200);

    let modes = clamd.scanned_file_modes();
    assert_eq!(modes.len(), 1);
    assert_eq!(modes[0] & 0o044, 0o044, "mode {:o}", modes[0]);
}

#[tokio::test]
async fn test_scan_infected_upload() {
    let clamd = FakeClamd::start("stream: Eicar-Test-Signature FOUND\n").await;
    let server = test_server(test_config(clamd.port));

    let response = server
        .post("/scan")
        .multipart(file_form(
            b"X5O!P%@AP[4\\PZX54(P^)7CC)7}$EICAR-STANDARD-ANTIVIRUS-TEST-FILE!$H+H*".to_vec(),
            "eicar.txt",
            "text/plain",
        ))
        .await;

    assert_eq!(response.status_code(), 200);
    let report: Value = response.json();
    assert_eq!(report["overall_safe"], false);
    assert_eq!(report["malware_scan"]["status"], "infected");
    assert_eq!(report["malware_scan"]["signature"], "Eicar-Test-Signature");
    assert_eq!(
        report["errors"],
        json!(["Malware detected: Eicar-Test-Signature"])
    );
    assert!(report["content_analysis"].is_null());
}

#[tokio::test]
async fn test_scan_daemon_unreachable_fails_closed() {
    let server = test_server(test_config(closed_port().await));

    let response = server
        .post("/scan")
        .multipart(file_form(fixtures::create_test_pdf(), "invoice.pdf", "application/pdf"))
        .await;

    assert_eq!(response.status_code(), 200);
    let report: Value = response.json();
    assert_eq!(report["overall_safe"], false);
    assert_eq!(report["malware_scan"]["status"], "error");
    assert!(report["errors"][0]
        .as_str()
        .unwrap()
        .starts_with("Malware scan failed:"));
}

#[tokio::test]
async fn test_scan_renamed_executable_never_reaches_daemon() {
    let clamd = FakeClamd::start("stream: OK\n").await;
    let server = test_server(test_config(clamd.port));

    let response = server
        .post("/scan")
        .multipart(file_form(
            fixtures::create_elf_binary(),
            "holiday.jpg",
            "image/jpeg",
        ))
        .await;

    assert_eq!(response.status_code(), 200);
    let report: Value = response.json();
    assert_eq!(report["overall_safe"], false);
    assert_eq!(report["file_type_valid"], false);
    assert!(report["file_category"].is_null());
    assert_eq!(report["mime_type"], "application/x-executable");
    assert!(report["errors"][0]
        .as_str()
        .unwrap()
        .starts_with("Invalid file type"));
    assert!(clamd.scan_requests().is_empty());
}

#[tokio::test]
async fn test_scan_without_file_field() {
    let server = test_server(test_config(closed_port().await));

    let form = MultipartForm::new().add_text("comment", "no file here");
    let response = server.post("/scan").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(body["error"], "No file provided");
}

#[tokio::test]
async fn test_scan_empty_file_is_reported_invalid() {
    let clamd = FakeClamd::start("stream: OK\n").await;
    let server = test_server(test_config(clamd.port));

    let response = server
        .post("/scan")
        .multipart(file_form(Vec::new(), "empty.txt", "text/plain"))
        .await;

    assert_eq!(response.status_code(), 200);
    let report: Value = response.json();
    assert_eq!(report["overall_safe"], false);
    assert_eq!(report["file_type_valid"], false);
    assert_eq!(report["mime_type"], "application/x-empty");
    assert!(report["errors"][0]
        .as_str()
        .unwrap()
        .starts_with("Invalid file type"));
    assert!(clamd.scan_requests().is_empty());
}

#[tokio::test]
async fn test_scan_path_existing_file() {
    let clamd = FakeClamd::start("stream: OK\n").await;
    let server = test_server(test_config(clamd.port));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan-me.png");
    std::fs::write(&path, fixtures::create_test_png(20, 20)).unwrap();

    let response = server
        .post("/scan-path")
        .json(&json!({ "file_path": path.to_str().unwrap() }))
        .await;

    assert_eq!(response.status_code(), 200);
    let report: Value = response.json();
    assert_eq!(report["file_path"], path.to_str().unwrap());
    assert_eq!(report["overall_safe"], true, "report: {}", report);
    assert!(path.exists());
}

#[tokio::test]
async fn test_scan_path_missing_file() {
    let server = test_server(test_config(closed_port().await));

    let response = server
        .post("/scan-path")
        .json(&json!({ "file_path": "/definitely/not/here.png" }))
        .await;

    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["error"], "File not found");
}

#[tokio::test]
async fn test_scan_path_bad_body() {
    let server = test_server(test_config(closed_port().await));

    let response = server.post("/scan-path").json(&json!({ "path": "/tmp/x" })).await;
    assert_eq!(response.status_code(), 400);

    let response = server.post("/scan-path").json(&json!({ "file_path": "  " })).await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_body_over_limit_is_rejected() {
    let mut config = test_config(closed_port().await);
    config.server.upload_body_limit_bytes = 1024;
    let server = test_server(config);

    let response = server
        .post("/scan-path")
        .json(&json!({ "file_path": "a".repeat(4096) }))
        .await;

    assert_eq!(response.status_code(), 413);
    let body: Value = response.json();
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_validate_pdf_without_scanning() {
    let clamd = FakeClamd::start("stream: OK\n").await;
    let server = test_server(test_config(clamd.port));

    let response = server
        .post("/validate")
        .multipart(file_form(fixtures::create_test_pdf(), "invoice.pdf", "application/pdf"))
        .await;

    assert_eq!(response.status_code(), 200);
    let report: Value = response.json();
    assert_eq!(report["valid"], true);
    assert_eq!(report["file_type_valid"], true);
    assert_eq!(report["size_valid"], true);
    assert_eq!(report["file_category"], "document");
    assert_eq!(report["mime_type"], "application/pdf");
    assert!(clamd.scan_requests().is_empty());
}

#[tokio::test]
async fn test_validate_reports_oversize() {
    let mut config = test_config(closed_port().await);
    config.scan.max_file_size_bytes = 10;
    let server = test_server(config);

    let response = server
        .post("/validate")
        .multipart(file_form(fixtures::create_test_png(32, 32), "photo.png", "image/png"))
        .await;

    assert_eq!(response.status_code(), 200);
    let report: Value = response.json();
    assert_eq!(report["file_type_valid"], true);
    assert_eq!(report["size_valid"], false);
    assert_eq!(report["valid"], false);
}

#[tokio::test]
async fn test_openapi_document() {
    let server = test_server(test_config(closed_port().await));

    let response = server.get("/api-docs/openapi.json").await;

    assert_eq!(response.status_code(), 200);
    let doc: Value = response.json();
    assert!(doc["paths"]["/scan"].is_object());
    assert!(doc["paths"]["/scan-path"].is_object());
}
