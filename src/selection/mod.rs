//! Host selection subsystem.
//!
//! # Data Flow
//! ```text
//! allowed hosts (route collaborator) + PreferenceContext (HTTP layer)
//!     → selector.rs (optional ignore filtering, logging, metrics)
//!     → resolver.rs (param → cookie → header → caller → random)
//!     → Selection { host, reason } or None
//! ```
//!
//! # Design Decisions
//! - Resolution is a pure function of its inputs and a registry snapshot
//! - Empty allowed set is a value (`None`), not an error
//! - Ties inside a source go to the first requested host

pub mod context;
pub mod resolver;
pub mod selector;

pub use context::{PreferenceContext, PreferenceSource};
pub use resolver::{resolve, resolve_host, Selection, SelectionReason};
pub use selector::HostSelector;
