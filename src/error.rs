//! Error types for host selection.

use thiserror::Error;

use crate::caller::PatternError;

#[derive(Error, Debug)]
pub enum SelectorError {
    #[error("Invalid caller pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

pub type Result<T> = std::result::Result<T, SelectorError>;
