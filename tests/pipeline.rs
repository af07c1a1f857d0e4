//! End-to-end tests for the upload pipeline.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use nofakepng::matting::HttpMatting;

mod common;
use common::{
    client, jpeg_fixture, png_fixture, spawn_app, start_mock_matting, test_config, upload,
    EchoMatting,
};

#[tokio::test]
async fn valid_jpeg_comes_back_as_png() {
    let (addr, _shutdown) = spawn_app(test_config(), Arc::new(EchoMatting)).await;

    let res = upload(addr, jpeg_fixture(500, 500), "image/jpeg").await;

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "image/png");

    let body = res.bytes().await.unwrap();
    let output = image::load_from_memory(&body).expect("response must decode as an image");
    assert_eq!(image::guess_format(&body).unwrap(), image::ImageFormat::Png);
    assert_eq!(output.width(), 500);
    assert_eq!(output.height(), 500);
}

#[tokio::test]
async fn banner_and_health_endpoints_respond() {
    let (addr, _shutdown) = spawn_app(test_config(), Arc::new(EchoMatting)).await;
    let client = client();

    let res = client
        .get(format!("http://{}/", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("NoFakePNG"));

    let res = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn disallowed_declared_type_is_rejected_with_400() {
    let (addr, _shutdown) = spawn_app(test_config(), Arc::new(EchoMatting)).await;

    let res = upload(addr, png_fixture(10, 10), "application/pdf").await;

    assert_eq!(res.status(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("Invalid file type"));
}

#[tokio::test]
async fn corrupt_bytes_with_valid_declared_type_are_rejected_with_400() {
    let (addr, _shutdown) = spawn_app(test_config(), Arc::new(EchoMatting)).await;

    let mut bytes = png_fixture(100, 100);
    bytes.truncate(bytes.len() / 2);
    let res = upload(addr, bytes, "image/png").await;

    assert_eq!(res.status(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("not a valid image"));
}

#[tokio::test]
async fn oversized_dimensions_are_rejected_with_400() {
    let (addr, _shutdown) = spawn_app(test_config(), Arc::new(EchoMatting)).await;

    let res = upload(addr, png_fixture(4001, 2), "image/png").await;

    assert_eq!(res.status(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("4000"));
}

#[tokio::test]
async fn oversized_upload_is_rejected_with_413() {
    let mut config = test_config();
    config.upload.max_file_size_bytes = 64 * 1024;
    config.upload.chunk_bytes = 16 * 1024;
    let (addr, _shutdown) = spawn_app(config, Arc::new(EchoMatting)).await;

    // 256 KiB against a 64 KiB ceiling. The declared type is fine; the size
    // check fires before any decode is attempted.
    let res = upload(addr, vec![0u8; 256 * 1024], "image/png").await;

    assert_eq!(res.status(), 413);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("maximum allowed size"));
}

#[tokio::test]
async fn upload_without_file_field_is_rejected_with_400() {
    let (addr, _shutdown) = spawn_app(test_config(), Arc::new(EchoMatting)).await;

    let part = reqwest::multipart::Part::bytes(png_fixture(10, 10))
        .file_name("upload.png")
        .mime_str("image/png")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("not-the-file", part);
    let res = client()
        .post(format!("http://{}/remove-background", addr))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn matting_backend_round_trip_through_http() {
    // The mock model always answers with a fixed 1x1 PNG.
    let backend = start_mock_matting(StatusCode::OK, png_fixture(1, 1), Duration::ZERO).await;

    let mut config = test_config();
    config.matting.endpoint = format!("http://{}/remove", backend);
    let matting = Arc::new(HttpMatting::new(&config.matting).unwrap());
    let (addr, _shutdown) = spawn_app(config, matting).await;

    let res = upload(addr, png_fixture(20, 20), "image/png").await;

    assert_eq!(res.status(), 200);
    let body = res.bytes().await.unwrap();
    let output = image::load_from_memory(&body).unwrap();
    assert_eq!(output.width(), 1);
}

#[tokio::test]
async fn matting_backend_failure_is_a_generic_500() {
    let backend = start_mock_matting(
        StatusCode::INTERNAL_SERVER_ERROR,
        b"model exploded: stack trace here".to_vec(),
        Duration::ZERO,
    )
    .await;

    let mut config = test_config();
    config.matting.endpoint = format!("http://{}/remove", backend);
    let matting = Arc::new(HttpMatting::new(&config.matting).unwrap());
    let (addr, _shutdown) = spawn_app(config, matting).await;

    let res = upload(addr, png_fixture(20, 20), "image/png").await;

    assert_eq!(res.status(), 500);
    let body: serde_json::Value = res.json().await.unwrap();
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("Background removal failed"));
    assert!(!detail.contains("stack trace"));
}

#[tokio::test]
async fn slow_matting_backend_hits_the_deadline_with_504() {
    let backend = start_mock_matting(
        StatusCode::OK,
        png_fixture(1, 1),
        Duration::from_secs(5),
    )
    .await;

    let mut config = test_config();
    config.matting.endpoint = format!("http://{}/remove", backend);
    config.matting.timeout_secs = 1;
    let matting = Arc::new(HttpMatting::new(&config.matting).unwrap());
    let (addr, _shutdown) = spawn_app(config, matting).await;

    let res = upload(addr, png_fixture(20, 20), "image/png").await;

    assert_eq!(res.status(), 504);
}
