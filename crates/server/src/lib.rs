//! prescription-server library crate
//!
//! Exposes `build_app`, the orchestrator and the Gemini transport for
//! integration tests. The actual binary entrypoint is in `main.rs`.

pub mod ai;
pub mod config;
mod error;
pub mod image;
mod middleware;
pub mod orchestrator;
mod routes;

use std::sync::Arc;

use axum::{Extension, Router, extract::DefaultBodyLimit, middleware as axum_mw, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use ai::{GeminiClient, ModelTransport};
use config::Config;
use orchestrator::Orchestrator;

pub use middleware::request_id::REQUEST_ID_HEADER;
pub use routes::IMAGE_FIELD;

/// Headroom for multipart framing on top of the image ceiling
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Build the Gemini-backed orchestrator described by `config`
pub fn gemini_orchestrator(config: &Config) -> Result<Orchestrator<GeminiClient>, reqwest::Error> {
    let client = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_base_url.clone(),
        config.gemini_model.clone(),
        config.request_timeout,
    )?;
    Ok(Orchestrator::new(client))
}

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so integration tests can construct the app with a
/// stub transport and without binding to a TCP port.
pub fn build_app<T: ModelTransport + 'static>(
    orchestrator: Orchestrator<T>,
    config: &Config,
) -> Router {
    let state = Arc::new(orchestrator);

    // Create rate limiter
    let rate_limiter = middleware::create_rate_limiter(config.rate_limit_rps);

    // Model-backed routes (rate limited)
    let api_routes = Router::new()
        .nest("/api", routes::api_routes::<T>())
        .layer(DefaultBodyLimit::max(
            image::MAX_IMAGE_BYTES + MULTIPART_OVERHEAD,
        ))
        .layer(axum_mw::from_fn(middleware::rate_limit_middleware))
        .layer(Extension(rate_limiter));

    // Install Prometheus metrics recorder.
    // Use build_recorder() + set_global_recorder() so that repeated calls
    // (e.g. in integration tests) don't panic; the second install is
    // silently ignored and we still get a valid handle for /metrics.
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    let prometheus_handle = recorder.handle();
    let _ = metrics::set_global_recorder(recorder);

    // Operational routes (not rate limited)
    let public_routes = Router::new()
        .route("/health", get(routes::health::check::<T>))
        .route("/metrics", get(routes::metrics::get))
        .layer(Extension(prometheus_handle));

    // Build CORS layer
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Build application
    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .with_state(state)
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}
