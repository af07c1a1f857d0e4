//! Admission control subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (per-client sliding window, reject with 429 + Retry-After)
//!     → limits.rs (streaming body ingest with a byte ceiling, reject with 413)
//!     → pass to image validation
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any admission check failure
//! - Admission happens before a single body byte is buffered
//! - No trust in client input

pub mod limits;
pub mod rate_limit;

pub use limits::{read_bounded, BodyError, UploadBudget};
pub use rate_limit::{Decision, SlidingWindowLimiter};
