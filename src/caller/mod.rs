//! Caller identification subsystem.
//!
//! # Data Flow
//! ```text
//! CallerConfig[] (config file / JSON rules)
//!     → entry.rs (compile ip pattern)
//!     → registry.rs (add catch-all, sort by specificity)
//!     → shared.rs (publish for concurrent readers)
//!
//! Per request:
//!     client ip → registry.find_by_ip → CallerEntry (or fallback)
//! ```
//!
//! # Design Decisions
//! - Patterns compiled once, when the entry is built
//! - First match wins, so ordering is part of the semantics
//! - A bad pattern fails the whole registry build

pub mod entry;
pub mod pattern;
pub mod registry;
pub mod shared;

pub use entry::CallerEntry;
pub use pattern::{IpPattern, PatternError, IP_ALL};
pub use registry::CallerRegistry;
pub use shared::SharedRegistry;
