//! Image validation and encoding subsystem.
//!
//! # Data Flow
//! ```text
//! buffered upload bytes
//!     → guard.rs (declared MIME check → decode → dimension check)
//!     → DynamicImage + ImageMetadata
//!     → [matting collaborator transforms pixels]
//!     → encode.rs (lossless PNG for the response body)
//! ```
//!
//! # Design Decisions
//! - Checks are ordered cheapest-first; the MIME check rejects before any
//!   decode work is spent
//! - Decoding is the authority on whether bytes are a real image; the
//!   declared type is never trusted past the first check
//! - The decoded image is returned alongside the metadata so the pipeline
//!   never decodes twice

pub mod encode;
pub mod guard;

pub use encode::encode_png;
pub use guard::{GuardError, ImageMetadata, ImagePolicy};
