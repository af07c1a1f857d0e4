//! Shared utilities for integration testing.

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{http::StatusCode, routing::post, Router};
use image::{DynamicImage, ImageFormat, RgbImage};
use tokio::net::TcpListener;

use nofakepng::config::ServiceConfig;
use nofakepng::http::HttpServer;
use nofakepng::lifecycle::Shutdown;
use nofakepng::matting::{Matting, MattingError};

/// Matting fake that hands the input image straight back.
pub struct EchoMatting;

#[async_trait]
impl Matting for EchoMatting {
    async fn remove_background(&self, image: DynamicImage) -> Result<DynamicImage, MattingError> {
        Ok(image)
    }
}

/// Test configuration: rate limiting off unless a test turns it on.
#[allow(dead_code)]
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.rate_limit.enabled = false;
    config.observability.metrics_enabled = false;
    config
}

/// Start the service on an ephemeral port.
///
/// The returned `Shutdown` must be kept alive for the lifetime of the test;
/// dropping it stops the server.
pub async fn spawn_app(config: ServiceConfig, matting: Arc<dyn Matting>) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, matting);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    // The listener is already bound, so connections queue until the server
    // task starts accepting; no readiness wait is needed.
    (addr, shutdown)
}

/// Start a mock matting model backend answering every POST the same way.
#[allow(dead_code)]
pub async fn start_mock_matting(status: StatusCode, body: Vec<u8>, delay: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new().route(
        "/remove",
        post(move || {
            let body = body.clone();
            async move {
                tokio::time::sleep(delay).await;
                (status, body)
            }
        }),
    );

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

#[allow(dead_code)]
pub fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::new(width, height)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

#[allow(dead_code)]
pub fn jpeg_fixture(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::new(width, height)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();
    bytes
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Upload `bytes` as the `file` part of a multipart form.
pub async fn upload(addr: SocketAddr, bytes: Vec<u8>, mime: &str) -> reqwest::Response {
    let part = reqwest::multipart::Part::bytes(bytes)
        .file_name("upload.bin")
        .mime_str(mime)
        .unwrap();
    let form = reqwest::multipart::Form::new().part("file", part);

    client()
        .post(format!("http://{}/remove-background", addr))
        .multipart(form)
        .send()
        .await
        .expect("service unreachable")
}
