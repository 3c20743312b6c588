//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics
//! - Start the config watcher
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last, so traffic only arrives once everything is ready

use std::path::PathBuf;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use url::Url;

use crate::config::watcher::ConfigWatcher;
use crate::config::{load_config, ConfigError, TestbedConfig};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::{logging, metrics};
use crate::services::ServiceKind;

/// What to start.
#[derive(Debug, Clone)]
pub struct StartupOptions {
    pub service: ServiceKind,
    pub config_path: Option<PathBuf>,
    /// Overrides the service's configured bind address.
    pub bind: Option<String>,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to watch configuration file: {0}")]
    Watch(#[from] notify::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Bind address of `service` in `config`.
pub fn bind_address(config: &TestbedConfig, service: ServiceKind) -> &str {
    match service {
        ServiceKind::Orchestrator => &config.orchestrator.bind_address,
        ServiceKind::External => &config.external.bind_address,
        ServiceKind::Internal => &config.internal.bind_address,
    }
}

/// Point `service` at an overridden listen address.
///
/// For the orchestrator, `self_url` follows the new port so traffic
/// simulation keeps reaching this process.
pub fn apply_bind_override(config: &mut TestbedConfig, service: ServiceKind, address: &str) {
    match service {
        ServiceKind::Orchestrator => config.orchestrator.bind_address = address.to_string(),
        ServiceKind::External => config.external.bind_address = address.to_string(),
        ServiceKind::Internal => config.internal.bind_address = address.to_string(),
    }
    if service != ServiceKind::Orchestrator {
        return;
    }

    let port = address
        .rsplit_once(':')
        .and_then(|(_, port)| port.parse::<u16>().ok())
        .filter(|&port| port != 0);
    let self_url = &mut config.orchestrator.self_url;

    let Some(port) = port else {
        tracing::warn!(address, self_url = %self_url, "No fixed port in bind address, self_url left unchanged");
        return;
    };

    let moved = Url::parse(self_url)
        .ok()
        .and_then(|mut url| url.set_port(Some(port)).ok().map(|()| url));
    match moved {
        Some(url) => {
            *self_url = url.as_str().trim_end_matches('/').to_string();
            tracing::info!(self_url = %self_url, "self_url follows bind override");
        }
        _ => tracing::warn!(self_url = %self_url, "Cannot move self_url to the overridden port"),
    }
}

/// Re-apply a bind override to every reloaded config.
fn pin_bind_override(
    mut updates: mpsc::UnboundedReceiver<TestbedConfig>,
    service: ServiceKind,
    address: String,
) -> mpsc::UnboundedReceiver<TestbedConfig> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(mut config) = updates.recv().await {
            apply_bind_override(&mut config, service, &address);
            if tx.send(config).is_err() {
                break;
            }
        }
    });
    rx
}

/// Run one service until SIGINT/SIGTERM.
pub async fn launch(options: StartupOptions) -> Result<(), StartupError> {
    let mut config = match &options.config_path {
        Some(path) => load_config(path)?,
        None => TestbedConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(
        service = %options.service,
        config = ?options.config_path,
        "telemetry-testbed v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics();
    }

    let (_watcher, config_updates) = match &options.config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, config.clone());
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let (address, config_updates) = match &options.bind {
        Some(bind) => {
            apply_bind_override(&mut config, options.service, bind);
            let updates = pin_bind_override(config_updates, options.service, bind.clone());
            (bind.clone(), updates)
        }
        None => (bind_address(&config, options.service).to_string(), config_updates),
    };

    let server = HttpServer::new(options.service, config);
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    server
        .run(listener, config_updates, server_shutdown)
        .await
        .map_err(StartupError::Serve)?;

    tracing::info!(service = %options.service, "Shutdown complete");
    Ok(())
}
