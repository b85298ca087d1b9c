//! Backend host selection for a reverse-proxy control plane.
//!
//! Given the backends allowed for a route and what a request asked for,
//! pick the one host that should serve it, honoring per-client rules
//! keyed by source IP.

pub mod caller;
pub mod config;
pub mod error;
pub mod observability;
pub mod selection;

pub use caller::{CallerEntry, CallerRegistry, SharedRegistry};
pub use config::SelectorConfig;
pub use error::SelectorError;
pub use selection::{HostSelector, PreferenceContext, PreferenceSource, Selection};
