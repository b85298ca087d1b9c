//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile every caller pattern up front
//! - Validate value ranges (non-empty key, parseable metrics address)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SelectorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::caller::{IpPattern, PatternError};
use crate::config::schema::{CallerConfig, SelectorConfig};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("caller #{index}: {source}")]
    CallerPattern { index: usize, source: PatternError },

    #[error("selection.pref_key must not be empty")]
    EmptyPrefKey,

    #[error("invalid observability.metrics_address {0:?}")]
    MetricsAddress(String),
}

/// Validate a loaded configuration, including caller rules pulled from
/// `callers_file`.
pub fn validate_config(
    config: &SelectorConfig,
    callers: &[CallerConfig],
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.selection.pref_key.trim().is_empty() {
        errors.push(ValidationError::EmptyPrefKey);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    for (index, caller) in callers.iter().enumerate() {
        if let Err(source) = IpPattern::compile(&caller.ip) {
            errors.push(ValidationError::CallerPattern { index, source });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
