//! External matting collaborator.
//!
//! # Data Flow
//! ```text
//! validated DynamicImage
//!     → Matting::remove_background (opaque, potentially slow, fallible)
//!     → DynamicImage with transparent background
//! ```
//!
//! # Design Decisions
//! - The model is a black box behind a trait; the pipeline never learns how
//!   backgrounds are removed
//! - The production implementation talks HTTP to a model backend with a
//!   bounded deadline; tests substitute in-process fakes
//! - Failures collapse to a generic client message at the HTTP boundary;
//!   full detail stays in server-side traces

pub mod client;

use async_trait::async_trait;
use image::DynamicImage;
use thiserror::Error;

/// Failure modes of a matting call.
#[derive(Debug, Error)]
pub enum MattingError {
    #[error("matting request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("matting backend answered with status {0}")]
    Status(reqwest::StatusCode),

    #[error("matting image codec error: {0}")]
    Codec(#[from] image::ImageError),

    #[error("matting call exceeded the {0} second deadline")]
    DeadlineExceeded(u64),
}

/// The external transformation collaborator.
///
/// Takes a decoded image, returns a decoded image with the background
/// removed. Anything beyond that contract is out of this crate's hands.
#[async_trait]
pub trait Matting: Send + Sync {
    async fn remove_background(&self, image: DynamicImage) -> Result<DynamicImage, MattingError>;
}

pub use client::HttpMatting;
