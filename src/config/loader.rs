//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Why a configuration file was refused.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {}", list_violations(.0))]
    Validation(Vec<ValidationError>),
}

fn list_violations(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(&fs::read_to_string(path)?)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_falls_back_to_defaults() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config.rate_limit.requests_per_window, 10);
        assert_eq!(config.upload.max_file_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.image.max_dimension_pixels, 4000);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [rate_limit]
            requests_per_window = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.rate_limit.requests_per_window, 3);
        assert_eq!(config.rate_limit.window_secs, 60);
    }

    #[test]
    fn validation_failure_lists_every_violation() {
        let mut config = ServiceConfig::default();
        config.rate_limit.requests_per_window = 0;
        config.image.allowed_mime_types.clear();

        let errors = validate_config(&config).unwrap_err();
        let message = ConfigError::Validation(errors).to_string();
        assert!(message.contains("requests_per_window"));
        assert!(message.contains("allowed_mime_types"));
        assert!(message.contains("; "));
    }
}
