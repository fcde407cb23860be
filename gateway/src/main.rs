use anyhow::Result;
use axum::{
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geofence::ZoneRegistry;

mod history;
mod routes;
mod validate;

use history::HistoryStore;

#[derive(Clone)]
pub struct AppState {
    pub zones: Arc<ZoneRegistry>,
    pub history: Arc<HistoryStore>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "sentinel_gateway=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let zones = ZoneRegistry::with_default_zones();
    tracing::info!("   Loaded {} geofence zones", zones.all().len());

    let state = AppState {
        zones: Arc::new(zones),
        history: Arc::new(HistoryStore::new()),
    };

    let api_routes = Router::new()
        .route("/location/update", post(routes::update_location))
        .route("/safety-score", post(routes::compute_safety_score))
        .route("/zones", get(routes::list_zones))
        .with_state(state);

    let app = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let port = std::env::var("SENTINEL_GATEWAY_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "18701".to_string());
    let addr = format!("0.0.0.0:{}", port);

    tracing::info!("Sentinel gateway starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "sentinel-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
