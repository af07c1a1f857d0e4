//! Streaming upload ingest with a byte ceiling.
//!
//! # Responsibilities
//! - Pull the upload in fixed-size chunks instead of buffering blindly
//! - Enforce the configured ceiling and abort as soon as it is exceeded
//! - Surface transport errors distinctly from the size violation
//!
//! # Design Decisions
//! - The running count is checked after every chunk, so a malicious or
//!   oversized upload is cut off early; peak memory stays within one chunk
//!   of the ceiling
//! - Generic over the byte stream so multipart fields and test streams use
//!   the same path

use std::io;

use axum::body::Bytes;
use futures_util::{Stream, TryStreamExt};
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;

use crate::config::UploadConfig;

/// Per-request byte budget.
#[derive(Debug, Clone, Copy)]
pub struct UploadBudget {
    /// Hard ceiling on accepted bytes.
    pub max_bytes: usize,
    /// Read granularity.
    pub chunk_bytes: usize,
}

impl UploadBudget {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            max_bytes: config.max_file_size_bytes,
            chunk_bytes: config.chunk_bytes,
        }
    }
}

/// Failure modes of the bounded reader.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("upload exceeds the configured ceiling of {limit_bytes} bytes")]
    TooLarge { limit_bytes: usize },

    #[error("failed to read upload stream: {0}")]
    Read(#[from] io::Error),
}

/// Consume `stream` in fixed-size chunks, failing fast once the running
/// byte count exceeds the budget.
pub async fn read_bounded<S, E>(stream: S, budget: &UploadBudget) -> Result<Vec<u8>, BodyError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let stream = stream.map_err(|e| io::Error::new(io::ErrorKind::Other, e));
    let mut reader = StreamReader::new(Box::pin(stream));

    let mut body = Vec::new();
    let mut chunk = vec![0u8; budget.chunk_bytes];

    loop {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..read]);
        if body.len() > budget.max_bytes {
            return Err(BodyError::TooLarge {
                limit_bytes: budget.max_bytes,
            });
        }
    }

    Ok(body)
}
