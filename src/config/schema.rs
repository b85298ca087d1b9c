//! Configuration schema definitions.
//!
//! This module defines the configuration structure for the selector.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Key used for the request parameter, cookie and header that carry a
/// preferred host.
pub const DEFAULT_PREF_KEY: &str = "api_pref";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct SelectorConfig {
    /// Selection behavior.
    pub selection: SelectionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Optional JSON file holding more caller rules, relative to the
    /// config file.
    pub callers_file: Option<String>,

    /// Inline caller rules.
    pub callers: Vec<CallerConfig>,
}

/// Persisted caller rule: `{note, ip, enable, pref[], ignore[]}`.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct CallerConfig {
    #[serde(default)]
    pub note: String,

    /// IP pattern, `*` matches one octet's digits.
    pub ip: String,

    #[serde(default)]
    pub enable: bool,

    /// Preferred hosts in order.
    #[serde(default)]
    pub pref: Vec<String>,

    /// Hosts never to route this caller to.
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// Selection behavior.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SelectionConfig {
    /// Name of the parameter, cookie and header carrying preferences.
    pub pref_key: String,

    /// Drop hosts on the matched caller's ignore list before resolving.
    pub enforce_ignore: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            pref_key: DEFAULT_PREF_KEY.to_string(),
            enforce_ignore: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
