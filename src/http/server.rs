//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, request ID, timeout, CORS, body limit)
//! - Attach rate-limit admission to the upload route
//! - Spawn the limiter sweeper
//! - Serve with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{CorsConfig, ServiceConfig};
use crate::http::handlers;
use crate::imaging::ImagePolicy;
use crate::lifecycle::{signals, ShutdownSignal};
use crate::matting::Matting;
use crate::security::rate_limit::{rate_limit_middleware, spawn_sweeper, SlidingWindowLimiter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub policy: Arc<ImagePolicy>,
    pub limiter: Arc<SlidingWindowLimiter>,
    pub matting: Arc<dyn Matting>,
}

/// HTTP server for the background-removal service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    limiter: Arc<SlidingWindowLimiter>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and matting
    /// collaborator.
    pub fn new(config: ServiceConfig, matting: Arc<dyn Matting>) -> Self {
        let limiter = Arc::new(SlidingWindowLimiter::new(&config.rate_limit));
        let state = AppState {
            config: Arc::new(config.clone()),
            policy: Arc::new(ImagePolicy::new(&config.image)),
            limiter: limiter.clone(),
            matting,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let mut upload = Router::new().route("/remove-background", post(handlers::remove_background));
        if config.rate_limit.enabled {
            upload = upload.route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_middleware,
            ));
        }

        // Our streaming reader is the authority on 413; the framework limit
        // only caps non-file multipart overhead.
        let body_limit = config
            .upload
            .max_file_size_bytes
            .saturating_add(2 * config.upload.chunk_bytes);

        Router::new()
            .route("/", get(handlers::index))
            .route("/health", get(handlers::health))
            .merge(upload)
            .with_state(state)
            .layer(DefaultBodyLimit::max(body_limit))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(cors_layer(&config.cors))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            requests_per_window = self.config.rate_limit.requests_per_window,
            window_secs = self.config.rate_limit.window_secs,
            max_file_size_bytes = self.config.upload.max_file_size_bytes,
            max_dimension_pixels = self.config.image.max_dimension_pixels,
            "HTTP server starting"
        );

        if self.config.rate_limit.enabled {
            spawn_sweeper(
                self.limiter.clone(),
                Duration::from_secs(self.config.rate_limit.sweep_interval_secs),
                shutdown.resubscribe(),
            );
        }

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.recv() => {},
                    _ = signals::shutdown_signal() => {},
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_credentials(true)
}
