use tracing::info;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Resolves on SIGINT or SIGTERM; used for axum's graceful shutdown.
#[cfg(unix)]
pub async fn wait_for_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("SIGTERM handler unavailable ({e}); falling back to Ctrl+C only");
            let _ = tokio::signal::ctrl_c().await;
            info!("Received Ctrl+C, shutting down");
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
        _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
    }
}

#[cfg(not(unix))]
pub async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Received Ctrl+C, shutting down");
}
