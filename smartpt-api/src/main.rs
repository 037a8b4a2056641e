//! Smart PT API server
//!
//! Serves disruption reporting, trip planning, the chat assistant and
//! account management for the Smart PT companion app.

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smartpt_api::{
    routes, AppState, Config, GeminiClient, GoogleMapsClient, HttpAuthProvider, RoutePlanner,
    SqliteStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smartpt_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!(?config, "Loaded configuration");

    // One SQLite store backs both reports and sessions
    let store = Arc::new(SqliteStore::open(&config.database_path)?);

    // Outbound provider clients
    let auth = Arc::new(HttpAuthProvider::from_config(&config));
    let maps = Arc::new(GoogleMapsClient::from_config(&config));
    let model = Arc::new(GeminiClient::from_config(&config));
    let planner = RoutePlanner::new(maps.clone());

    // Create app state
    let state = Arc::new(AppState::new(
        store.clone(),
        store,
        auth,
        maps,
        planner,
        model,
    ));

    // Create router
    let app = routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Smart PT API listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
