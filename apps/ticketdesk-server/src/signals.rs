use anyhow::Result;
use tokio::signal;

/// Resolves on Ctrl+C or SIGTERM.
pub async fn wait_for_shutdown() -> Result<()> {
    let source = tokio::select! {
        result = ctrl_c() => result?,
        result = sigterm() => result?,
    };

    tracing::info!(signal = source, "Shutdown signal received, draining connections");
    Ok(())
}

async fn ctrl_c() -> Result<&'static str> {
    signal::ctrl_c().await.inspect_err(|e| {
        tracing::error!(%e, "Ctrl+C handler failed");
    })?;
    Ok("ctrl_c")
}

#[cfg(unix)]
async fn sigterm() -> Result<&'static str> {
    let mut stream = signal::unix::signal(signal::unix::SignalKind::terminate()).inspect_err(|e| {
        tracing::error!(%e, "Failed to install SIGTERM handler");
    })?;
    stream.recv().await;
    Ok("sigterm")
}

#[cfg(not(unix))]
async fn sigterm() -> Result<&'static str> {
    std::future::pending().await
}
