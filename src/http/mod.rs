//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, rate-limit admission)
//!     → handlers.rs (ingest → validate → transform → encode)
//!     → error.rs (one status + JSON detail per failure kind)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, HttpServer};
