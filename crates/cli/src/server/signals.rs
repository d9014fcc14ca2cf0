use polydns_application::use_cases::ReloadConfigUseCase;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Waits for SIGINT or SIGTERM.
pub async fn wait_for_shutdown() {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Received SIGINT, initiating shutdown"),
        _ = wait_for_sigterm() => info!("Received SIGTERM, initiating shutdown"),
    }
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!(error = %e, "Failed to register SIGTERM handler");
            std::future::pending::<()>().await
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}

/// Reloads `path` on every SIGHUP until `shutdown` fires. A failed reload
/// keeps the running configuration.
#[cfg(unix)]
pub async fn reload_on_hangup(
    reload: Arc<ReloadConfigUseCase>,
    path: Option<String>,
    shutdown: CancellationToken,
) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(hangup) => hangup,
        Err(e) => {
            warn!(error = %e, "Failed to register SIGHUP handler; hot reload disabled");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            received = hangup.recv() => {
                if received.is_none() {
                    break;
                }
                let Some(path) = path.as_deref() else {
                    warn!("SIGHUP received but no configuration file is in use");
                    continue;
                };
                match reload.reload_from_file(path) {
                    Ok(_) => info!(path = %path, "Reloaded configuration on SIGHUP"),
                    Err(e) => error!(path = %path, error = %e, "Configuration reload failed"),
                }
            }
        }
    }
}

#[cfg(not(unix))]
pub async fn reload_on_hangup(
    _reload: Arc<ReloadConfigUseCase>,
    _path: Option<String>,
    shutdown: CancellationToken,
) {
    shutdown.cancelled().await;
}
