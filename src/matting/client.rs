//! HTTP client for the matting model backend.
//!
//! # Responsibilities
//! - Ship the validated image to the model endpoint as PNG
//! - Enforce a deadline on the whole exchange
//! - Decode the model's answer back into pixels

use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::config::MattingConfig;
use crate::imaging::encode_png;
use crate::matting::{Matting, MattingError};

/// Matting collaborator backed by an HTTP model server.
#[derive(Clone)]
pub struct HttpMatting {
    client: reqwest::Client,
    endpoint: Url,
    timeout_secs: u64,
}

impl HttpMatting {
    pub fn new(config: &MattingConfig) -> Result<Self, url::ParseError> {
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.parse()?,
            timeout_secs: config.timeout_secs,
        })
    }

    async fn exchange(&self, png: Vec<u8>) -> Result<DynamicImage, MattingError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "image/png")
            .body(png)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MattingError::Status(status));
        }

        let bytes = response.bytes().await?;
        let image = image::load_from_memory(&bytes)?;
        Ok(image)
    }
}

#[async_trait]
impl Matting for HttpMatting {
    async fn remove_background(&self, image: DynamicImage) -> Result<DynamicImage, MattingError> {
        let png = encode_png(&image)?;
        let deadline = Duration::from_secs(self.timeout_secs);

        match tokio::time::timeout(deadline, self.exchange(png)).await {
            Ok(result) => result,
            Err(_) => Err(MattingError::DeadlineExceeded(self.timeout_secs)),
        }
    }
}
