use std::future::Future;

use tokio::net::TcpListener;
use tracing::info;

use crate::deployment::Deployment;

pub mod config;
pub mod deployment;
pub mod error;
pub mod extract;
pub mod routes;

/// Serves the API until `signal` resolves. Open event streams are ended at that
/// point so in-flight connections can drain, then pending planning notes are
/// written.
pub async fn serve(
    listener: TcpListener,
    deployment: Deployment,
    signal: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let shutdown = deployment.shutdown().clone();
    let notes = deployment.routine().notes().clone();

    axum::serve(listener, routes::router(deployment))
        .with_graceful_shutdown(async move {
            signal.await;
            shutdown.cancel();
        })
        .await?;

    notes.flush_all().await;
    info!("Server stopped");
    Ok(())
}
