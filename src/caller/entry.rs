//! A single caller rule.

use crate::caller::pattern::{IpPattern, PatternError, IP_ALL};
use crate::config::CallerConfig;

/// Client identity rule: who the caller is and where it wants to go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerEntry {
    /// Free-text label.
    pub note: String,
    /// Disabled entries are never matched.
    pub enabled: bool,
    /// Preferred hosts, most preferred first.
    pub preferred: Vec<String>,
    /// Hosts this caller must never be routed to.
    pub ignored: Vec<String>,
    matcher: IpPattern,
}

impl CallerEntry {
    /// Create a disabled entry with no preferences for the given pattern.
    pub fn new(ip: &str) -> Result<Self, PatternError> {
        Ok(Self {
            note: String::new(),
            enabled: false,
            preferred: Vec::new(),
            ignored: Vec::new(),
            matcher: IpPattern::compile(ip)?,
        })
    }

    /// Build an entry from its persisted form.
    pub fn from_config(config: &CallerConfig) -> Result<Self, PatternError> {
        Ok(Self {
            note: config.note.clone(),
            enabled: config.enable,
            preferred: config.pref.clone(),
            ignored: config.ignore.clone(),
            matcher: IpPattern::compile(&config.ip)?,
        })
    }

    /// The entry used when no registry member matches an address.
    pub fn fallback() -> Self {
        Self::universal("default")
    }

    /// Enabled catch-all entry with the given note.
    pub(crate) fn universal(note: &str) -> Self {
        Self {
            note: note.to_string(),
            enabled: true,
            preferred: Vec::new(),
            ignored: Vec::new(),
            matcher: IpPattern::compile(IP_ALL).expect("universal pattern is valid"),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_preferred<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ignored<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// The IP pattern text.
    pub fn ip(&self) -> &str {
        self.matcher.as_str()
    }

    pub fn matcher(&self) -> &IpPattern {
        &self.matcher
    }

    /// Re-derive the matcher from the pattern text.
    pub fn recompile(&mut self) -> Result<(), PatternError> {
        self.matcher = IpPattern::compile(self.matcher.as_str())?;
        Ok(())
    }

    /// True if this entry applies to `ip`: literal equality or pattern match.
    pub fn applies_to(&self, ip: &str) -> bool {
        self.ip() == ip || self.matcher.matches(ip)
    }

    /// True if `host` is on this caller's ignore list.
    pub fn is_ignored(&self, host: &str) -> bool {
        self.ignored.iter().any(|h| h == host)
    }

    /// First preferred host that is also in `allowed`.
    pub fn preferred_in<'a>(&self, allowed: &'a [String]) -> Option<&'a String> {
        first_common(&self.preferred, allowed)
    }

    /// Convert back to the persisted form.
    pub fn to_config(&self) -> CallerConfig {
        CallerConfig {
            note: self.note.clone(),
            ip: self.ip().to_string(),
            enable: self.enabled,
            pref: self.preferred.clone(),
            ignore: self.ignored.clone(),
        }
    }
}

/// First element of `wanted` (in its order) that appears in `allowed`,
/// returned as the `allowed` element.
pub(crate) fn first_common<'a>(wanted: &[String], allowed: &'a [String]) -> Option<&'a String> {
    wanted
        .iter()
        .find_map(|w| allowed.iter().find(|a| *a == w))
}
