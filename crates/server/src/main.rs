use anyhow::Context;
use server::{config::ServerConfig, deployment::Deployment};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    utils::logging::init_tracing().context("invalid RUST_LOG")?;

    let config = ServerConfig::from_env()?;
    let deployment = Deployment::from_config(&config)
        .await
        .context("failed to open the database")?;

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Server listening");

    server::serve(listener, deployment, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutting down; flushing pending notes");
}
