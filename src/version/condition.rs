//! Comparison conditions and the AND-sets parsed from one range alternative
//!
//! Sub-expression forms:
//! - `1.2.3`, `=1.2.3` - exact match
//! - `>1.2.3`, `>=1.2.3`, `<1.2.3`, `<=1.2.3` - comparison operators
//! - `~1.2.3` - tilde (>=1.2.3- <1.3-), `~1` - (>=1- <2-)
//! - `^1.2.3` - caret (>=1.2.3- <2-), pinned at the first non-zero component
//! - `*` or empty - any version (>=0.0.0-)
//!
//! Inclusive lower bounds on a release carry the empty pre-release marker so
//! that `>=1.0.0` also covers `1.0.0-rc1` once pre-releases are allowed.
//!
//! A trailing `-` on any sub-expression opts the whole alternative into
//! pre-release resolution.

use std::cmp::Ordering;
use std::fmt;

use tracing::debug;

use crate::version::error::ParseError;
use crate::version::semver::{Version, VersionItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
        }
    }

    /// Whether `candidate.cmp(bound)` satisfies this operator
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Le => ordering != Ordering::Greater,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Ge => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `operator version` test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub operator: Operator,
    pub version: Version,
}

impl Condition {
    pub fn new(operator: Operator, version: Version) -> Self {
        Self { operator, version }
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.operator.accepts(version.cmp(&self.version))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.version)
    }
}

#[derive(Debug, Clone, Copy)]
enum Prefix {
    Compare(Operator),
    Tilde,
    Caret,
}

// Longest prefixes first so `>=` is not read as `>`
const PREFIXES: &[(&str, Prefix)] = &[
    (">=", Prefix::Compare(Operator::Ge)),
    ("<=", Prefix::Compare(Operator::Le)),
    (">", Prefix::Compare(Operator::Gt)),
    ("<", Prefix::Compare(Operator::Lt)),
    ("^", Prefix::Caret),
    ("~", Prefix::Tilde),
    ("=", Prefix::Compare(Operator::Eq)),
];

/// Conditions of one range alternative, all of which must hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionSet {
    conditions: Vec<Condition>,
    prerelease: bool,
}

impl ConditionSet {
    /// Parse one alternative (space-separated sub-expressions).
    ///
    /// `prerelease` is the range-wide opt-in; a trailing `-` on any
    /// sub-expression turns it on for this set.
    pub fn parse(expression: &str, prerelease: bool) -> Result<Self, ParseError> {
        let mut prerelease = prerelease;
        let mut conditions = Vec::new();

        for sub_expression in expression.split_whitespace() {
            let sub_expression = match sub_expression.strip_suffix('-') {
                Some(stripped) => {
                    prerelease = true;
                    stripped
                }
                None => sub_expression,
            };
            conditions.extend(parse_sub_expression(sub_expression)?);
        }

        let set = Self {
            conditions,
            prerelease,
        };
        debug!("Parsed condition set '{}' as [{}]", expression.trim(), set);
        Ok(set)
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn prerelease(&self) -> bool {
        self.prerelease
    }

    /// Check `version` against every condition.
    ///
    /// Pre-release versions pass the gate only when `resolve_prerelease` is
    /// `Some(true)`, or it is `None` and this set opted in. `Some(false)`
    /// always rejects them.
    pub fn is_valid(&self, version: &Version, resolve_prerelease: Option<bool>) -> bool {
        if version.is_prerelease() && !resolve_prerelease.unwrap_or(self.prerelease) {
            return false;
        }
        self.conditions.iter().all(|condition| condition.matches(version))
    }
}

impl fmt::Display for ConditionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{condition}")?;
        }
        Ok(())
    }
}

fn parse_sub_expression(expression: &str) -> Result<Vec<Condition>, ParseError> {
    if expression.is_empty() || expression == "*" {
        return Ok(vec![Condition::new(Operator::Ge, Version::zero())]);
    }

    let (prefix, body) = PREFIXES
        .iter()
        .find_map(|(token, prefix)| expression.strip_prefix(token).map(|rest| (*prefix, rest)))
        .unwrap_or((Prefix::Compare(Operator::Eq), expression));

    if body.is_empty() {
        return Err(ParseError::MissingVersion(expression.to_string()));
    }
    let version = Version::parse(body)?;

    match prefix {
        Prefix::Compare(Operator::Ge) => {
            Ok(vec![Condition::new(Operator::Ge, version.lower_bound())])
        }
        Prefix::Compare(operator) => Ok(vec![Condition::new(operator, version)]),
        Prefix::Tilde => {
            let index = if version.main().len() > 1 { 1 } else { 0 };
            let bound = version.upper_bound(index)?;
            Ok(vec![
                Condition::new(Operator::Ge, version.lower_bound()),
                Condition::new(Operator::Lt, bound),
            ])
        }
        Prefix::Caret => {
            let index = first_non_zero(version.main());
            let bound = version.upper_bound(index)?;
            Ok(vec![
                Condition::new(Operator::Ge, version.lower_bound()),
                Condition::new(Operator::Lt, bound),
            ])
        }
    }
}

fn first_non_zero(items: &[VersionItem]) -> usize {
    items
        .iter()
        .position(|item| item.as_number() != Some(0))
        .unwrap_or(items.len())
}
