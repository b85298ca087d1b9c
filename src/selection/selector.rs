//! Host selector service.
//!
//! # Responsibilities
//! - Hold the live caller registry and selection settings
//! - Optionally drop ignored hosts before resolving
//! - Log and count every decision

use std::sync::Arc;

use crate::caller::{CallerRegistry, SharedRegistry};
use crate::config::SelectionConfig;
use crate::observability::metrics;
use crate::selection::context::PreferenceContext;
use crate::selection::resolver::{resolve, Selection};

/// Entry point for request handlers.
#[derive(Debug)]
pub struct HostSelector {
    registry: Arc<SharedRegistry>,
    config: SelectionConfig,
}

impl HostSelector {
    pub fn new(registry: Arc<SharedRegistry>, config: SelectionConfig) -> Self {
        Self { registry, config }
    }

    /// Convenience constructor around a freshly built registry.
    pub fn from_registry(registry: CallerRegistry, config: SelectionConfig) -> Self {
        Self::new(Arc::new(SharedRegistry::new(registry)), config)
    }

    pub fn registry(&self) -> &Arc<SharedRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Name of the parameter, cookie and header the HTTP layer should read.
    pub fn pref_key(&self) -> &str {
        &self.config.pref_key
    }

    /// Choose a host for this request. `None` means the route has no viable
    /// backend.
    pub fn select(&self, allowed: &[String], ctx: &PreferenceContext) -> Option<Selection> {
        let registry = self.registry.load();

        let filtered;
        let candidates = if self.config.enforce_ignore {
            filtered = registry.filter_ignored(&ctx.client_ip, allowed);
            if filtered.len() != allowed.len() {
                tracing::debug!(
                    client_ip = %ctx.client_ip,
                    dropped = allowed.len() - filtered.len(),
                    "Dropped ignored hosts"
                );
            }
            filtered.as_slice()
        } else {
            allowed
        };

        match resolve(candidates, ctx, &registry) {
            Some(selection) => {
                tracing::debug!(
                    client_ip = %ctx.client_ip,
                    host = %selection.host,
                    reason = %selection.reason,
                    "Host selected"
                );
                metrics::record_selection(selection.reason);
                Some(selection)
            }
            None => {
                tracing::warn!(
                    client_ip = %ctx.client_ip,
                    allowed = allowed.len(),
                    "No host available for request"
                );
                metrics::record_empty_selection();
                None
            }
        }
    }
}
