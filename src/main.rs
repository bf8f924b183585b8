use anyhow::Context;
use devcamper::logging::init_tracing;
use devcamper::router::init_router;
use devcamper::state::AppState;
use devcamper_config::AppConfig;
use devcamper_db::run_migrations;
use dotenvy::dotenv;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing().context("Failed to create log directory")?;

    let config = AppConfig::from_env()?;
    let port = config.server.port;
    let environment = config.server.environment;

    tokio::fs::create_dir_all(&config.upload.dir)
        .await
        .context("Failed to create upload directory")?;

    let state = AppState::init(config).await?;
    run_migrations(&state.db).await?;

    let app = init_router(state);
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;

    tracing::info!(
        port,
        environment = environment.as_str(),
        "Server running, API reference at /scalar"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
