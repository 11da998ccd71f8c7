#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the district risk map.
//!
//! Serves the per-district risk scores and the city-wide risk timeline as
//! JSON. Every response carries cache-disabling headers since scores are
//! recomputed from the data directory on each request.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{App, HttpServer, middleware, web};
use risk_map_pipeline::{PipelineConfig, RiskPipeline};

/// `Cache-Control` value of every response.
pub const NO_STORE: &str = "no-store, max-age=0";

/// Looks up the model credential held in the named variable.
pub type CredentialLookup = fn(&str) -> Option<String>;

/// Reads the credential from the process environment.
#[must_use]
pub fn env_credential(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

/// Shared application state.
pub struct AppState {
    /// Scoring pipeline.
    pub pipeline: Arc<RiskPipeline>,
    /// Source of the credential, consulted on every scoring request.
    pub credential: CredentialLookup,
}

/// Registers the `/api` routes.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/risk-score", web::get().to(handlers::risk_score))
            .route("/risk-timeline", web::get().to(handlers::risk_timeline)),
    );
}

/// Starts the HTTP server.
///
/// Reads the pipeline configuration from the environment and binds to
/// `BIND_ADDR`:`PORT` (default `127.0.0.1:8080`). This is an async
/// function; the caller is responsible for providing the async runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the configuration is invalid, the
/// HTTP server fails to bind, or it encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = PipelineConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    log::info!(
        "Scoring from {} in {} mode with model {}",
        config.data_dir.display(),
        config.mode,
        config.model
    );

    let state = web::Data::new(AppState {
        pipeline: Arc::new(RiskPipeline::new(config)),
        credential: env_credential,
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::DefaultHeaders::new().add((header::CACHE_CONTROL, NO_STORE)))
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(api_routes)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
