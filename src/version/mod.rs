//! Version resolution layer
//!
//! Parses version-range expressions and evaluates whether a concrete version
//! satisfies them.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌─────────────┐     ┌─────────┐
//! │ VersionRange │────▶│ ConditionSet │────▶│  Condition  │────▶│ Version │
//! │     (OR)     │     │    (AND)     │     │ (op, bound) │     │  (cmp)  │
//! └──────────────┘     └──────────────┘     └─────────────┘     └─────────┘
//! ```
//!
//! # Modules
//!
//! - [`semver`]: `Version` value type and ordering
//! - [`condition`]: operators, single conditions and AND-sets
//! - [`range`]: `VersionRange` parsing, containment and candidate filtering
//! - [`error`]: Parse errors

pub mod condition;
pub mod error;
pub mod range;
pub mod semver;

pub use condition::{Condition, ConditionSet, Operator};
pub use error::ParseError;
pub use range::VersionRange;
pub use semver::{Version, VersionItem};
