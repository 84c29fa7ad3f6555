//! Gateway server setup
//!
//! WebSocket server configuration and routes.

mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use pulse_common::{AppConfig, AppError, JwtVerifier};
use pulse_engine::RealtimeHub;
use pulse_store::{PgMessageRepository, PgPrincipalRepository, PgRoomRepository};

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/ws", get(gateway_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    let cors = create_cors_layer(state.config());

    create_router()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Create the CORS layer from configuration
///
/// In production only configured origins are allowed; in development an
/// empty origin list means any origin.
fn create_cors_layer(config: &AppConfig) -> CorsLayer {
    let base_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if config.app.env.is_production() || !config.cors.allowed_origins.is_empty() {
        let origins: Vec<HeaderValue> = config
            .cors
            .allowed_origins
            .iter()
            .filter_map(|origin| {
                origin.parse::<HeaderValue>().ok().or_else(|| {
                    tracing::warn!("Invalid CORS origin: {}", origin);
                    None
                })
            })
            .collect();

        if origins.is_empty() {
            tracing::warn!("CORS: no valid allowed origins configured; cross-origin requests will be blocked");
        }
        base_layer.allow_origin(AllowOrigin::list(origins))
    } else {
        tracing::warn!("CORS: allowing any origin (development mode)");
        base_layer.allow_origin(Any)
    }
}

/// Initialize all dependencies and create `GatewayState`
pub async fn create_gateway_state(config: AppConfig) -> Result<GatewayState, AppError> {
    tracing::info!("Connecting to PostgreSQL...");
    let pool = pulse_store::create_pool(&config.database)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    tracing::info!("PostgreSQL connection established");

    let principals = Arc::new(PgPrincipalRepository::new(pool.clone()));
    let rooms = Arc::new(PgRoomRepository::new(pool.clone()));
    let messages = Arc::new(PgMessageRepository::new(pool));

    let verifier = Arc::new(JwtVerifier::new(&config.jwt.secret));

    let hub = Arc::new(RealtimeHub::new(principals.clone(), rooms.clone()));

    Ok(GatewayState::new(
        hub,
        principals,
        rooms,
        messages,
        verifier,
        config,
    ))
}

/// Run the gateway server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    tracing::info!("Starting gateway server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Gateway listening on ws://{}/ws", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .server
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid server address: {e}")))?;

    let state = create_gateway_state(config).await?;
    let app = create_app(state);

    run_server(app, addr).await
}
