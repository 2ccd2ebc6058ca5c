use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use catalog_server::build_router;
use catalog_server::config::AppConfig;
use catalog_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::load().context("Failed to load config")?;
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let dashboard_path = config.storage.dashboard_path.clone();

    let state = AppState::init(config)
        .await
        .context("Failed to open storage")?;
    info!(
        upload_dir = %state.config.storage.upload_dir.display(),
        database = %state.records.path().display(),
        max_files = state.config.storage.max_files,
        "Storage ready"
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    let local_addr = listener.local_addr()?;
    info!("Server running at http://{}", local_addr);
    info!("Dashboard: http://{}{}", local_addr, dashboard_path);

    axum::serve(listener, build_router(state)).await?;

    Ok(())
}
