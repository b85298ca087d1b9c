//! Ordered caller rule registry.
//!
//! # Responsibilities
//! - Hold caller entries in specificity order
//! - Guarantee an enabled catch-all (`*.*.*.*`) member after initialization
//! - Look up the rule for a client IP (first match wins)
//!
//! # Design Decisions
//! - Entries without a wildcard sort first, then later-wildcard patterns
//! - Stable sort: ties keep insertion order
//! - Lookups never fail; the fallback entry is returned when nothing matches

use std::cmp::Reverse;

use crate::caller::entry::CallerEntry;
use crate::caller::pattern::IP_ALL;
use crate::config::CallerConfig;
use crate::error::SelectorError;

/// Ordered collection of caller rules.
#[derive(Debug, Clone)]
pub struct CallerRegistry {
    entries: Vec<CallerEntry>,
    fallback: CallerEntry,
}

impl Default for CallerRegistry {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl CallerRegistry {
    /// Create a registry from entries. Call [`initialize`](Self::initialize)
    /// before serving lookups.
    pub fn new(entries: Vec<CallerEntry>) -> Self {
        Self::with_fallback(entries, CallerEntry::fallback())
    }

    /// Create a registry with an explicit fallback entry.
    pub fn with_fallback(entries: Vec<CallerEntry>, fallback: CallerEntry) -> Self {
        Self { entries, fallback }
    }

    /// Build and initialize a registry from persisted rules.
    pub fn from_configs(configs: &[CallerConfig]) -> Result<Self, SelectorError> {
        let mut entries = Vec::with_capacity(configs.len());
        for config in configs {
            let entry = CallerEntry::from_config(config).map_err(|e| {
                tracing::warn!(ip = %config.ip, error = %e, "Invalid caller ip pattern");
                SelectorError::Pattern(e)
            })?;
            entries.push(entry);
        }
        let mut registry = Self::new(entries);
        registry.initialize()?;
        Ok(registry)
    }

    /// Recompile every member, make sure the catch-all exists, then sort.
    pub fn initialize(&mut self) -> Result<(), SelectorError> {
        for entry in &mut self.entries {
            if let Err(e) = entry.recompile() {
                tracing::warn!(ip = %entry.ip(), error = %e, "Invalid caller ip pattern");
                return Err(SelectorError::Pattern(e));
            }
        }

        let has_all = self
            .entries
            .iter()
            .any(|e| e.enabled && e.ip() == IP_ALL);
        if !has_all {
            tracing::debug!("No enabled catch-all caller rule, adding default");
            self.entries.push(CallerEntry::universal("default all"));
        }

        self.sort();
        Ok(())
    }

    /// Append an entry and restore specificity order.
    pub fn add(&mut self, entry: CallerEntry) {
        self.entries.push(entry);
        self.sort();
    }

    /// Rule for `ip`: the first enabled member that applies, else the
    /// fallback entry.
    pub fn find_by_ip(&self, ip: &str) -> &CallerEntry {
        self.entries
            .iter()
            .filter(|e| e.enabled)
            .find(|e| e.applies_to(ip))
            .unwrap_or(&self.fallback)
    }

    /// True if the rule for `ip` ignores `host`.
    pub fn ignored_for(&self, ip: &str, host: &str) -> bool {
        self.find_by_ip(ip).is_ignored(host)
    }

    /// `allowed` minus the hosts ignored by the rule for `ip`.
    pub fn filter_ignored(&self, ip: &str, allowed: &[String]) -> Vec<String> {
        let entry = self.find_by_ip(ip);
        allowed
            .iter()
            .filter(|h| !entry.is_ignored(h))
            .cloned()
            .collect()
    }

    pub fn entries(&self) -> &[CallerEntry] {
        &self.entries
    }

    pub fn fallback(&self) -> &CallerEntry {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sort(&mut self) {
        // `sort_by_key` is stable.
        self.entries.sort_by_key(|e| match e.matcher().wildcard_pos() {
            None => (0, Reverse(0)),
            Some(pos) => (1, Reverse(pos)),
        });
    }
}
