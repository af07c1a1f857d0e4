//! NoFakePNG — background-removal API service.
//!
//! A single-endpoint HTTP service built with Tokio and Axum. Uploads are
//! gated by an admission and validation pipeline before anything expensive
//! happens; the actual pixel transformation is delegated to an external
//! matting model behind the [`matting::Matting`] trait.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────────┐
//!                      │                NOFAKEPNG SERVICE                  │
//!                      │                                                   │
//!  POST /remove-       │  ┌──────────┐   ┌──────────┐   ┌──────────────┐   │
//!  background          │  │ security │──▶│ security │──▶│   imaging    │   │
//!  ────────────────────┼─▶│rate_limit│   │  limits  │   │    guard     │   │
//!                      │  └──────────┘   └──────────┘   └──────┬───────┘   │
//!                      │   admission      bounded              │           │
//!                      │   (429)          ingest (413)         ▼           │
//!                      │                                ┌──────────────┐   │
//!                      │                                │   matting    │───┼──▶ model
//!  200 image/png       │  ┌──────────┐                  │ collaborator │◀──┼─── backend
//!  ◀───────────────────┼──│ imaging  │◀─────────────────┴──────────────┘   │
//!                      │  │  encode  │                                     │
//!                      │  └──────────┘                                     │
//!                      │                                                   │
//!                      │  ┌─────────────────────────────────────────────┐  │
//!                      │  │            Cross-Cutting Concerns           │  │
//!                      │  │  ┌────────┐ ┌─────────────┐ ┌───────────┐   │  │
//!                      │  │  │ config │ │observability│ │ lifecycle │   │  │
//!                      │  │  └────────┘ └─────────────┘ └───────────┘   │  │
//!                      │  └─────────────────────────────────────────────┘  │
//!                      └───────────────────────────────────────────────────┘
//! ```
//!
//! Each request moves through a strictly ordered pipeline: admission →
//! ingest → validate → transform → encode. The first failing step terminates
//! the request; there is no retry or backtracking within a request.

// Core subsystems
pub mod config;
pub mod http;
pub mod imaging;
pub mod matting;
pub mod security;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
