//! ED4E API server entry point.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use ed4e_api::error::AppError;
use ed4e_api::routes;
use ed4e_api::state::AppState;
use ed4e_core::clock::{Clock, SystemClock};
use ed4e_core::rng::{DeterministicRng, SystemRng};
use ed4e_rules::domain::config::RulesConfig;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Loads the rules configuration named by `ED4E_RULES_CONFIG`, or the
/// defaults when it is unset.
fn load_rules_config() -> Result<RulesConfig, AppError> {
    let Ok(path) = std::env::var("ED4E_RULES_CONFIG") else {
        return Ok(RulesConfig::default());
    };
    let yaml = std::fs::read_to_string(&path)
        .map_err(|e| AppError::Config(format!("cannot read rules config {path}: {e}")))?;
    let config = RulesConfig::from_yaml_str(&yaml)?;
    tracing::info!(path = %path, "loaded rules configuration");
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting ED4E API server");

    // Read configuration from environment.
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
    let config = load_rules_config()?;

    // Build application state.
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(SystemClock);
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(SystemRng::new()));
    let app_state = AppState::new(Arc::new(config), clock, rng);

    // Build router.
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/steps", routes::steps::router())
        .nest("/api/v1/tests", routes::resolution::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
