//! Configuration file watcher for hot reload.
//!
//! Only settings read per request take effect on reload. Bind addresses,
//! the route prefix, the inbound timeout, the rate limiter and the random
//! seed are wired into the server at startup; changes to them are reported
//! and otherwise ignored until restart.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::TestbedConfig;

/// Watches the testbed config file and forwards changed, valid configs.
pub struct ConfigWatcher {
    path: PathBuf,
    last: TestbedConfig,
    update_tx: mpsc::UnboundedSender<TestbedConfig>,
}

impl ConfigWatcher {
    /// `current` is the config the services were started with; reloads that
    /// parse to the same value are dropped.
    pub fn new(
        path: &Path,
        current: TestbedConfig,
    ) -> (Self, mpsc::UnboundedReceiver<TestbedConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                last: current,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned handle must be kept alive for as long as reloads are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();
        let last = Mutex::new(self.last);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    let mut last = last.lock().unwrap_or_else(PoisonError::into_inner);
                    match reload(&path, &mut last) {
                        Ok(Some(config)) => {
                            tracing::info!(path = ?path, "Config reloaded");
                            let _ = tx.send(config);
                        }
                        Ok(None) => tracing::debug!(path = ?path, "Config unchanged"),
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Re-read `path`. Returns the new config when it differs from `last`.
fn reload(path: &Path, last: &mut TestbedConfig) -> Result<Option<TestbedConfig>, ConfigError> {
    let config = load_config(path)?;
    if config == *last {
        return Ok(None);
    }

    for setting in restart_only_changes(last, &config) {
        tracing::warn!(setting, "Changed setting only applies after restart");
    }
    *last = config.clone();
    Ok(Some(config))
}

/// Names of changed settings that the running services cannot pick up.
pub fn restart_only_changes(old: &TestbedConfig, new: &TestbedConfig) -> Vec<&'static str> {
    let checks = [
        (
            "orchestrator.bind_address",
            old.orchestrator.bind_address != new.orchestrator.bind_address,
        ),
        (
            "external.bind_address",
            old.external.bind_address != new.external.bind_address,
        ),
        (
            "internal.bind_address",
            old.internal.bind_address != new.internal.bind_address,
        ),
        (
            "orchestrator.route_prefix",
            old.orchestrator.route_prefix != new.orchestrator.route_prefix,
        ),
        ("timeouts", old.timeouts != new.timeouts),
        ("rate_limit", old.rate_limit != new.rate_limit),
        ("observability", old.observability != new.observability),
        ("random_seed", old.random_seed != new.random_seed),
    ];

    checks
        .into_iter()
        .filter_map(|(name, changed)| changed.then_some(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(file: &tempfile::NamedTempFile, content: &str) {
        file.as_file().set_len(0).unwrap();
        let mut handle = file.reopen().unwrap();
        handle.write_all(content.as_bytes()).unwrap();
        handle.flush().unwrap();
    }

    #[test]
    fn test_reload_skips_unchanged_config() {
        let file = tempfile::NamedTempFile::new().unwrap();
        write_config(&file, "");

        let mut last = TestbedConfig::default();
        assert!(reload(file.path(), &mut last).unwrap().is_none());

        write_config(&file, "[external]\nfailure_probability = 0.9\n");
        let updated = reload(file.path(), &mut last).unwrap().unwrap();
        assert_eq!(updated.external.failure_probability, 0.9);
        assert_eq!(last, updated);

        assert!(reload(file.path(), &mut last).unwrap().is_none());
    }

    #[test]
    fn test_reload_keeps_last_on_invalid_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        write_config(&file, "[external]\nfailure_probability = 2.0\n");

        let mut last = TestbedConfig::default();
        assert!(reload(file.path(), &mut last).is_err());
        assert_eq!(last, TestbedConfig::default());
    }

    #[test]
    fn test_restart_only_changes() {
        let old = TestbedConfig::default();
        let mut new = old.clone();
        new.external.failure_probability = 0.1;
        assert!(restart_only_changes(&old, &new).is_empty());

        new.orchestrator.route_prefix = "/v2".into();
        new.rate_limit.enabled = true;
        assert_eq!(
            restart_only_changes(&old, &new),
            vec!["orchestrator.route_prefix", "rate_limit"]
        );
    }

    #[test]
    fn test_seed_change_needs_restart() {
        let old = TestbedConfig::default();
        let new = TestbedConfig {
            random_seed: Some(42),
            ..old.clone()
        };
        assert_eq!(restart_only_changes(&old, &new), vec!["random_seed"]);
    }

    #[test]
    fn test_watching_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (watcher, _updates) =
            ConfigWatcher::new(&dir.path().join("absent.toml"), TestbedConfig::default());
        assert!(watcher.run().is_err());
    }
}
