use anyhow::Context;
use edu_api::{config::ApiConfig, state::ApiState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env().context("invalid configuration")?;

    edu_api::tracing::init_tracing(&config.env);
    tracing::debug!(?config, "Loaded configuration");

    let metrics_handle = edu_api::metrics::init_metrics()?;
    tracing::info!("Prometheus metrics exporter initialized");

    let state = ApiState::from_config(&config).await?;
    let app = edu_api::router::app(state, Some(metrics_handle));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, environment = ?config.env, "Review service listening");

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
    tracing::info!("Shutdown signal received");
}
