//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT (Ctrl+C) or SIGTERM
//! - Wait for an in-process trigger from `Shutdown`
//! - Resolve on whichever comes first
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A handler that fails to install only logs; the other sources still work

use tokio::sync::broadcast;

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install SIGTERM handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

/// Resolve when the process is asked to stop.
pub async fn shutdown_signal(mut trigger: broadcast::Receiver<()>) {
    tokio::select! {
        _ = ctrl_c() => tracing::info!("Ctrl+C received"),
        _ = terminate() => tracing::info!("SIGTERM received"),
        _ = trigger.recv() => tracing::info!("Shutdown triggered"),
    }
}
