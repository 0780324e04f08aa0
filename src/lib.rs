//! Australian address verification service.
//!
//! Checks that a suburb, postcode and state agree with each other according
//! to the Australia Post locality directory, proxies free-text locality
//! searches, and keeps an activity log of what users looked up in
//! Elasticsearch.
//!
//! # Routes
//! - `POST /api/graphql` `verifyAddress(suburb, postcode, state)` and `searchLocations(q, state)`
//! - `GET /api/logs` the 20 most recent activity events
//! - `POST /api/logs` record an activity event
//! - `GET /healthz`
//!
//! # Setup
//!
//! ```sh
//! AUS_POST_BASE_URL=https://.../postcode/search.json \
//! AUS_POST_TOKEN=... \
//! ELASTIC_NODE=https://...:443 \
//! ELASTIC_API_KEY=... \
//! CORS_ALLOW_ORIGIN=https://verifier.example.com \
//! RUST_LOG=info cargo run
//! ```
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use color_eyre::eyre::WrapErr;
use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
};
use log::{error, info};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub mod activity;
pub mod auspost;
pub mod config;
pub mod error;
pub mod record;
pub mod routes;
pub mod state;
pub mod verify;

use config::Config;
use routes::{graphql_handler, health_handler, record_log_handler, recent_logs_handler};
use state::AppState;

/// CORS for the UI origin, `*` lets any origin call the API
pub fn cors_layer(allowed_origin: &str) -> color_eyre::Result<CorsLayer> {
    let origin = match allowed_origin.trim() {
        "*" => AllowOrigin::any(),
        exact => AllowOrigin::exact(
            HeaderValue::from_str(exact).wrap_err_with(|| format!("invalid CORS origin: {exact}"))?,
        ),
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60)))
}

pub fn router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/api/graphql", post(graphql_handler))
        .route("/api/logs", get(recent_logs_handler).post(record_log_handler))
        .route("/healthz", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn serve(config: Config) -> color_eyre::Result<()> {
    info!("Initializing state...");
    let state = AppState::new(&config)?;
    let app = router(state, cors_layer(&config.allowed_origin)?);

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address)
        .await
        .wrap_err_with(|| format!("cannot bind to {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("cannot listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("cannot install terminate handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
