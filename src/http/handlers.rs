//! Request handlers.
//!
//! # Responsibilities
//! - Drive the per-request pipeline: ingest → validate → transform → encode
//! - Resolve the upload field and its declared content type
//! - Serve the banner and health endpoints
//!
//! # Design Decisions
//! - Admission already happened in middleware; by the time a handler runs
//!   the client holds a slot in its rate window
//! - The first failing step terminates the request; no state is retried

use std::time::Instant;

use axum::{
    extract::{multipart::Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::imaging::{encode_png, guard};
use crate::observability::metrics;
use crate::security::limits::{read_bounded, UploadBudget};

#[derive(Serialize)]
pub struct ServiceStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET / — service banner.
pub async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "NoFakePNG API - remove the background from your images"
    }))
}

/// GET /health — liveness probe.
pub async fn health() -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// POST /remove-background — the upload pipeline.
pub async fn remove_background(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let started = Instant::now();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::MalformedUpload)?
    {
        if field.name() != Some("file") {
            continue;
        }

        let declared_mime = field.content_type().unwrap_or_default().to_string();

        // Ingest: stream the field under the byte ceiling.
        let budget = UploadBudget::new(&state.config.upload);
        let bytes = read_bounded(field, &budget).await?;

        // Validate: declared type, real structure, dimensions.
        let (metadata, image) = guard::validate(&declared_mime, &bytes, &state.policy)?;
        tracing::debug!(
            width = metadata.width,
            height = metadata.height,
            color = ?metadata.color,
            declared_mime = %metadata.declared_mime,
            upload_bytes = bytes.len(),
            "Upload validated"
        );

        // Transform: hand the pixels to the external collaborator.
        let matting_started = Instant::now();
        let output = state
            .matting
            .remove_background(image)
            .await
            .map_err(ApiError::Transform)?;
        metrics::record_matting(matting_started);

        // Encode: lossless PNG out.
        let png = encode_png(&output).map_err(|e| ApiError::Transform(e.into()))?;

        metrics::record_response(200);
        metrics::record_request_duration(started);
        tracing::info!(
            width = metadata.width,
            height = metadata.height,
            response_bytes = png.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Background removed"
        );

        return Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response());
    }

    Err(ApiError::MissingFile)
}
