//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) [+ callers JSON file]
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, pattern compilation)
//!     → LoadedConfig → CallerRegistry
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → new registry swapped into SharedRegistry
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A failed reload keeps the current registry

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_registry, ConfigError, LoadedConfig};
pub use schema::{
    CallerConfig, ObservabilityConfig, SelectionConfig, SelectorConfig, DEFAULT_PREF_KEY,
};
