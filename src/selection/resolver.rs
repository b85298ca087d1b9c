//! Preference resolution.
//!
//! # Priority
//! ```text
//! empty allowed set          → no selection
//! empty registry             → random
//! request param ∩ allowed    → first hit
//! cookie ∩ allowed           → first hit
//! header ∩ allowed           → first hit
//! caller.preferred ∩ allowed → first hit (enabled caller only)
//! otherwise                  → random
//! ```
//!
//! Ignore lists are not applied here; see `HostSelector`.

use std::fmt;

use crate::caller::entry::first_common;
use crate::caller::CallerRegistry;
use crate::selection::context::{PreferenceContext, PreferenceSource};

/// Which rule picked the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionReason {
    Source(PreferenceSource),
    Caller,
    Random,
}

impl SelectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source(source) => source.as_str(),
            Self::Caller => "caller",
            Self::Random => "random",
        }
    }
}

impl fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The chosen host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub host: String,
    pub reason: SelectionReason,
}

impl Selection {
    fn new(host: &str, reason: SelectionReason) -> Self {
        Self {
            host: host.to_string(),
            reason,
        }
    }
}

/// Pick one host out of `allowed`. Returns `None` only when `allowed` is
/// empty.
pub fn resolve(
    allowed: &[String],
    ctx: &PreferenceContext,
    registry: &CallerRegistry,
) -> Option<Selection> {
    if allowed.is_empty() {
        return None;
    }
    if registry.is_empty() {
        return random(allowed);
    }

    for source in PreferenceSource::ALL {
        if let Some(host) = first_common(ctx.hosts(source), allowed) {
            return Some(Selection::new(host, SelectionReason::Source(source)));
        }
    }

    let caller = registry.find_by_ip(&ctx.client_ip);
    if caller.enabled {
        if let Some(host) = caller.preferred_in(allowed) {
            return Some(Selection::new(host, SelectionReason::Caller));
        }
    }

    random(allowed)
}

/// Host-only form of [`resolve`].
pub fn resolve_host(
    allowed: &[String],
    ctx: &PreferenceContext,
    registry: &CallerRegistry,
) -> Option<String> {
    resolve(allowed, ctx, registry).map(|s| s.host)
}

fn random(allowed: &[String]) -> Option<Selection> {
    if allowed.is_empty() {
        return None;
    }
    let host = &allowed[fastrand::usize(..allowed.len())];
    Some(Selection::new(host, SelectionReason::Random))
}
