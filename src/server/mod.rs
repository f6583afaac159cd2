pub mod handlers;
pub mod types;

use crate::{
    Result,
    cloudflare::{CloudflareSchemaClient, WorkersAiClient},
    config::Config,
    storage::R2Store,
};
use axum::{
    Router,
    routing::{get, post},
};
use handlers::AppState;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate_image", post(handlers::generate_image))
        .route("/api/image", get(handlers::get_image))
        .route("/api/images", get(handlers::list_images))
        .route("/api/schema", get(handlers::get_schema))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    let credentials = config.cloudflare.credentials();
    if credentials.account_id.is_none() || credentials.api_token.is_none() {
        warn!("Cloudflare credentials incomplete; generation and schema lookups will fail");
    }

    let store = R2Store::new(&config.storage, credentials.account_id.as_deref()).await?;

    let app_state = AppState {
        image_model: Arc::new(WorkersAiClient::new(&config.cloudflare)),
        store: Arc::new(store),
        schema_client: Arc::new(CloudflareSchemaClient::new(&config.cloudflare)),
        credentials,
        default_model: config.inference.default_model.clone(),
        page_size: config.storage.page_size,
    };

    let app = router(app_state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
