use gateway::config::AppConfig;
use gateway::{create_router, AppState};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = AppConfig::load()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(config.log_level()?)
        .init();

    tracing::info!(profile = %config.profile, "Starting pricing gateway");

    let state = AppState::from_config(&config)?;

    // Load the catalog before serving the first request
    state.engine.catalog().reload(None).await?;

    let app = create_router(state);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
