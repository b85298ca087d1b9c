//! Configuration file watcher for hot reload.
//!
//! Watches the TOML file and, when it names one, the `callers_file` JSON
//! rules. The rules path is re-resolved after every successful reload.

use std::path::{Path, PathBuf};
use std::sync::mpsc as std_mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::caller::CallerRegistry;
use crate::config::loader::{load_config, load_registry};
use crate::observability::metrics;

/// Watches the configuration files and emits a freshly built registry
/// whenever one of them changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<CallerRegistry>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for registry updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<CallerRegistry>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching in a background thread.
    ///
    /// The thread exits once the update receiver is dropped.
    pub fn run(self) -> Result<JoinHandle<()>, notify::Error> {
        let (event_tx, event_rx) = std_mpsc::channel::<notify::Result<Event>>();
        let mut watcher = RecommendedWatcher::new(
            event_tx,
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        let mut callers_path = load_config(&self.path).ok().and_then(|l| l.callers_path);
        if let Some(callers) = &callers_path {
            watch_callers(&mut watcher, callers);
        }

        tracing::info!(path = ?self.path, callers = ?callers_path, "Config watcher started");

        let handle = thread::spawn(move || {
            while !self.update_tx.is_closed() {
                let event = match event_rx.recv_timeout(Duration::from_millis(500)) {
                    Ok(Ok(event)) => event,
                    Ok(Err(e)) => {
                        tracing::error!("Watch error: {:?}", e);
                        continue;
                    }
                    Err(std_mpsc::RecvTimeoutError::Timeout) => continue,
                    Err(std_mpsc::RecvTimeoutError::Disconnected) => break,
                };
                if !(event.kind.is_modify() || event.kind.is_create()) {
                    continue;
                }

                tracing::info!(paths = ?event.paths, "Config file change detected, reloading...");
                match load_registry(&self.path) {
                    Ok((loaded, registry)) => {
                        if loaded.callers_path != callers_path {
                            if let Some(old) = &callers_path {
                                let _ = watcher.unwatch(old);
                            }
                            if let Some(new) = &loaded.callers_path {
                                watch_callers(&mut watcher, new);
                            }
                            callers_path = loaded.callers_path;
                        }
                        if self.update_tx.send(registry).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to reload config: {}. Keeping current caller rules.",
                            e
                        );
                        metrics::record_reload(false);
                    }
                }
            }
            tracing::debug!(path = ?self.path, "Config watcher stopped");
        });

        Ok(handle)
    }
}

fn watch_callers(watcher: &mut RecommendedWatcher, path: &Path) {
    match watcher.watch(path, RecursiveMode::NonRecursive) {
        Ok(()) => tracing::debug!(path = ?path, "Watching caller rules file"),
        Err(e) => tracing::warn!(path = ?path, error = %e, "Cannot watch caller rules file"),
    }
}
