//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, addresses parse)
//! - Check the matting endpoint is a usable URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ServiceConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("rate_limit.requests_per_window must be greater than zero")]
    ZeroRequestsPerWindow,

    #[error("rate_limit.window_secs must be greater than zero")]
    ZeroWindow,

    #[error("upload.max_file_size_bytes must be greater than zero")]
    ZeroMaxFileSize,

    #[error("upload.chunk_bytes must be greater than zero")]
    ZeroChunkSize,

    #[error("image.max_dimension_pixels must be greater than zero")]
    ZeroMaxDimension,

    #[error("image.allowed_mime_types must not be empty")]
    EmptyMimeList,

    #[error("matting.endpoint '{0}' is not a valid URL")]
    InvalidMattingEndpoint(String),

    #[error("matting.timeout_secs must be greater than zero")]
    ZeroMattingTimeout,

    #[error("observability.metrics_address '{0}' is not a valid socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.rate_limit.requests_per_window == 0 {
        errors.push(ValidationError::ZeroRequestsPerWindow);
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::ZeroWindow);
    }

    if config.upload.max_file_size_bytes == 0 {
        errors.push(ValidationError::ZeroMaxFileSize);
    }
    if config.upload.chunk_bytes == 0 {
        errors.push(ValidationError::ZeroChunkSize);
    }

    if config.image.max_dimension_pixels == 0 {
        errors.push(ValidationError::ZeroMaxDimension);
    }
    if config.image.allowed_mime_types.is_empty() {
        errors.push(ValidationError::EmptyMimeList);
    }

    if Url::parse(&config.matting.endpoint).is_err() {
        errors.push(ValidationError::InvalidMattingEndpoint(
            config.matting.endpoint.clone(),
        ));
    }
    if config.matting.timeout_secs == 0 {
        errors.push(ValidationError::ZeroMattingTimeout);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn zero_limits_are_rejected() {
        let mut config = ServiceConfig::default();
        config.rate_limit.requests_per_window = 0;
        config.upload.max_file_size_bytes = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = ServiceConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.image.allowed_mime_types.clear();
        config.matting.endpoint = "::not a url::".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
