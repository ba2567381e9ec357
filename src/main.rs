use tracing_subscriber::EnvFilter;

use savour_sync::api::{create_router, AppState};
use savour_sync::config::Config;
use savour_sync::db::create_store;
use savour_sync::graph::MatchGraph;
use savour_sync::services::ingestion;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("savour_sync=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // Build the graph from order history
    let graph = if config.orders_csv.exists() {
        let (graph, _report) = ingestion::ingest_csv(&config.orders_csv)?;
        graph
    } else {
        tracing::warn!(
            path = %config.orders_csv.display(),
            "Order history not found, starting with an empty graph"
        );
        MatchGraph::new()
    };

    let store = create_store(&config).await?;

    // Initialize application state
    let state = AppState::new(graph, store);

    // Create the router with all routes
    let app = create_router(state);

    // Start the server
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Server running");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
