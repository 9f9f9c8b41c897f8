mod config;
mod errors;
mod graph_client;
mod handlers;
mod models;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::graph_client::GraphScoreClient;
use crate::models::Credentials;

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration from the environment (fatal if
/// any credential is missing), builds the Graph client and the HTTP routes,
/// then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "secure_score_dashboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; missing credentials abort before the listener binds
    let config = Config::from_env()?;

    let credentials = Credentials {
        client_id: config.client_id.clone(),
        tenant_id: config.tenant_id.clone(),
        client_secret: config.client_secret.clone(),
    };

    let graph_client = GraphScoreClient::new(
        config.auth_base_url.clone(),
        config.graph_base_url.clone(),
        credentials,
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize Graph client: {}", e))?;
    tracing::info!("Graph client initialized: {}", config.graph_base_url);

    // Build application state
    let app_state = Arc::new(handlers::AppState {
        config: config.clone(),
        graph_client,
    });

    let app = handlers::router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
