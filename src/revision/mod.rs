//! Revision ledgers for package references
//!
//! A ledger is an append-biased list of `(revision, time)` entries persisted
//! as `{"revisions": [{"revision": "...", "time": 1700000000.5}, ...]}`,
//! oldest first. Listings are returned latest first.
//!
//! # Modules
//!
//! - [`list`]: `RevisionList` and its JSON form
//! - [`store`]: Per-reference ledgers with independent locking
//! - [`error`]: Format and store errors

pub mod error;
pub mod list;
pub mod store;

pub use error::{FormatError, StoreError};
pub use list::{Clock, RevisionEntry, RevisionList, SystemClock};
pub use store::RevisionStore;
