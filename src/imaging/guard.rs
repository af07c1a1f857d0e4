//! Upload validation: declared type, real structure, dimensions.

use image::{ColorType, DynamicImage, GenericImageView};
use thiserror::Error;

use crate::config::ImageConfig;

/// Validation policy derived from configuration.
#[derive(Debug, Clone)]
pub struct ImagePolicy {
    allowed_mime_types: Vec<String>,
    max_dimension: u32,
}

impl ImagePolicy {
    pub fn new(config: &ImageConfig) -> Self {
        Self {
            allowed_mime_types: config.allowed_mime_types.clone(),
            max_dimension: config.max_dimension_pixels,
        }
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }
}

/// Facts about a validated upload, kept for logging.
///
/// Derived once from the buffered bytes and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub color: ColorType,
    pub declared_mime: String,
}

/// Validation failures, in check order.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("declared content type '{0}' is not an accepted image type")]
    InvalidType(String),

    #[error("upload does not decode as an image: {0}")]
    InvalidImage(#[source] image::ImageError),

    #[error("image is {width}x{height}, exceeding the {max}x{max} pixel limit")]
    DimensionTooLarge { width: u32, height: u32, max: u32 },
}

/// Validate an upload against the policy.
///
/// Checks run in order and the first failure short-circuits: declared MIME
/// (cheap, no decode), container decode, then pixel dimensions.
pub fn validate(
    declared_mime: &str,
    bytes: &[u8],
    policy: &ImagePolicy,
) -> Result<(ImageMetadata, DynamicImage), GuardError> {
    if !policy
        .allowed_mime_types
        .iter()
        .any(|allowed| allowed == declared_mime)
    {
        return Err(GuardError::InvalidType(declared_mime.to_string()));
    }

    let image = image::load_from_memory(bytes).map_err(GuardError::InvalidImage)?;

    let (width, height) = image.dimensions();
    if width > policy.max_dimension || height > policy.max_dimension {
        return Err(GuardError::DimensionTooLarge {
            width,
            height,
            max: policy.max_dimension,
        });
    }

    let metadata = ImageMetadata {
        width,
        height,
        color: image.color(),
        declared_mime: declared_mime.to_string(),
    };

    Ok((metadata, image))
}
