//! Package-reference version resolution
//!
//! - [`version`]: version parsing, ordering and range expressions
//! - [`revision`]: append-biased revision ledgers and a per-reference store
//! - [`config`]: resolver and logging configuration
//! - [`logging`]: tracing subscriber setup

pub mod config;
pub mod logging;
pub mod revision;
pub mod version;

pub use revision::{RevisionEntry, RevisionList, RevisionStore};
pub use version::{ParseError, Version, VersionRange};
