//! Failure taxonomy at the HTTP boundary.
//!
//! # Responsibilities
//! - Map every pipeline failure to exactly one status and a JSON detail
//! - Keep internal error text out of responses; full detail goes to traces
//! - Attach the Retry-After hint to rate-limit rejections
//!
//! # Design Decisions
//! - Client errors (400/413) are permanent: retrying the same input never
//!   succeeds, so the detail names what to change
//! - 429 is the only retryable outcome and says when to retry
//! - Transform failures collapse to a generic 500/504 body

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::matting::MattingError;
use crate::observability::metrics;
use crate::security::limits::BodyError;
use crate::imaging::GuardError;

/// Everything that can terminate a request before a PNG is produced.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Too many requests. Please try again in {retry_after_secs} seconds.")]
    RateLimited { retry_after_secs: u64 },

    #[error("The file exceeds the maximum allowed size of {limit_bytes} bytes.")]
    PayloadTooLarge { limit_bytes: usize },

    #[error("Invalid file type. Please upload an image (JPEG, PNG, WebP or BMP).")]
    InvalidType,

    #[error("The uploaded file is not a valid image.")]
    InvalidImage,

    #[error("The image is too large. Maximum allowed dimensions are {max}x{max} pixels.")]
    DimensionTooLarge { width: u32, height: u32, max: u32 },

    #[error("The upload is malformed. Expected a multipart form with a 'file' field.")]
    MalformedUpload,

    #[error("No 'file' field found in the upload.")]
    MissingFile,

    #[error("Background removal failed. Please try again later.")]
    Transform(#[source] MattingError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InvalidType
            | ApiError::InvalidImage
            | ApiError::DimensionTooLarge { .. }
            | ApiError::MalformedUpload
            | ApiError::MissingFile => StatusCode::BAD_REQUEST,
            ApiError::Transform(MattingError::DeadlineExceeded(_)) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Transform(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // The Display text is the entire client-visible detail. The matting
        // source error is logged here and goes no further.
        if let ApiError::Transform(source) = &self {
            tracing::error!(error = %source, "Background removal failed");
        }

        metrics::record_response(status.as_u16());

        let body = Json(json!({ "detail": self.to_string() }));
        let mut response = (status, body).into_response();

        if let ApiError::RateLimited { retry_after_secs } = self {
            if let Ok(value) = header::HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

impl From<BodyError> for ApiError {
    fn from(err: BodyError) -> Self {
        match err {
            BodyError::TooLarge { limit_bytes } => ApiError::PayloadTooLarge { limit_bytes },
            BodyError::Read(_) => ApiError::MalformedUpload,
        }
    }
}

impl From<GuardError> for ApiError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::InvalidType(_) => ApiError::InvalidType,
            GuardError::InvalidImage(_) => ApiError::InvalidImage,
            GuardError::DimensionTooLarge { width, height, max } => {
                ApiError::DimensionTooLarge { width, height, max }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_failure_maps_to_one_status() {
        assert_eq!(
            ApiError::RateLimited { retry_after_secs: 5 }.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::PayloadTooLarge { limit_bytes: 1 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(ApiError::InvalidType.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidImage.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::DimensionTooLarge {
                width: 5000,
                height: 3000,
                max: 4000
            }
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Transform(MattingError::DeadlineExceeded(30)).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::Transform(MattingError::Status(
                reqwest::StatusCode::INTERNAL_SERVER_ERROR
            ))
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn rate_limited_response_carries_retry_after_header() {
        let response = ApiError::RateLimited { retry_after_secs: 42 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "42"
        );
    }

    #[test]
    fn transform_detail_never_leaks_the_source_error() {
        let err = ApiError::Transform(MattingError::Status(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        ));
        assert!(!err.to_string().contains("500"));
        assert!(!err.to_string().to_lowercase().contains("status"));
    }
}
