//! Version value type shared by range matching and resolution
//!
//! A version is a dotted sequence of components with optional pre-release
//! (`-`) and build (`+`) parts, each of which is itself a nested version:
//!
//! - `1.2.3` -> main `[1, 2, 3]`
//! - `1.2.3-rc.1` -> main `[1, 2, 3]`, pre `rc.1`
//! - `1.2.3+build5` -> main `[1, 2, 3]`, build `build5`
//!
//! Trailing zero components are not significant: `1.0 == 1.0.0`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::version::error::ParseError;
use crate::version::range::VersionRange;

/// One dotted component of a version.
///
/// Numbers compare numerically and text compares lexically. Across kinds the
/// order is: empty text, then every number, then every other text. So
/// `1.2.1a` sorts above `1.2.3` even though `"1a" < "3"` as strings; a plain
/// string comparison between kinds would not be a total order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionItem {
    Number(u64),
    Text(String),
}

impl VersionItem {
    fn parse(item: &str) -> Self {
        item.parse::<u64>()
            .map(VersionItem::Number)
            .unwrap_or_else(|_| VersionItem::Text(item.to_string()))
    }

    pub fn as_number(&self) -> Option<u64> {
        match self {
            VersionItem::Number(n) => Some(*n),
            VersionItem::Text(_) => None,
        }
    }

    fn is_zero(&self) -> bool {
        matches!(self, VersionItem::Number(0))
    }

    // Empty text (the bare `-` marker) < numbers < other text
    fn rank(&self) -> u8 {
        match self {
            VersionItem::Text(t) if t.is_empty() => 0,
            VersionItem::Number(_) => 1,
            VersionItem::Text(_) => 2,
        }
    }
}

impl Ord for VersionItem {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (VersionItem::Number(a), VersionItem::Number(b)) => a.cmp(b),
            (VersionItem::Text(a), VersionItem::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for VersionItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VersionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionItem::Number(n) => write!(f, "{n}"),
            VersionItem::Text(t) => f.write_str(t),
        }
    }
}

/// An immutable, totally ordered version
#[derive(Debug, Clone)]
pub struct Version {
    value: String,
    main: Vec<VersionItem>,
    pre: Option<Box<Version>>,
    build: Option<Box<Version>>,
}

impl Version {
    /// Parse a version string.
    ///
    /// Any non-empty string is accepted; components that are not unsigned
    /// integers are kept as text and compared lexically.
    pub fn parse(value: &str) -> Result<Self, ParseError> {
        if value.is_empty() {
            return Err(ParseError::EmptyVersion);
        }
        Ok(Self::from_parts(value))
    }

    /// `0.0.0-`, the lower bound of an unconstrained range
    pub fn zero() -> Self {
        Self::from_parts("0.0.0-")
    }

    fn from_parts(value: &str) -> Self {
        let (rest, build) = match value.split_once('+') {
            Some((rest, build)) => (rest, Some(Box::new(Self::from_parts(build)))),
            None => (value, None),
        };
        let (rest, pre) = match rest.split_once('-') {
            Some((rest, pre)) => (rest, Some(Box::new(Self::from_parts(pre)))),
            None => (rest, None),
        };

        Self {
            value: value.to_string(),
            main: rest.split('.').map(VersionItem::parse).collect(),
            pre,
            build,
        }
    }

    pub fn main(&self) -> &[VersionItem] {
        &self.main
    }

    pub fn pre(&self) -> Option<&Version> {
        self.pre.as_deref()
    }

    pub fn build(&self) -> Option<&Version> {
        self.build.as_deref()
    }

    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some()
    }

    pub fn major(&self) -> Option<&VersionItem> {
        self.main.first()
    }

    pub fn minor(&self) -> Option<&VersionItem> {
        self.main.get(1)
    }

    pub fn patch(&self) -> Option<&VersionItem> {
        self.main.get(2)
    }

    pub fn micro(&self) -> Option<&VersionItem> {
        self.main.get(3)
    }

    /// Main components without trailing zeros
    fn significant(&self) -> &[VersionItem] {
        let len = self
            .main
            .iter()
            .rposition(|item| !item.is_zero())
            .map_or(0, |i| i + 1);
        &self.main[..len]
    }

    /// Components up to `index`, with the one at `index` incremented.
    /// Missing components count as zero.
    fn bumped_items(&self, index: usize) -> Result<Vec<String>, ParseError> {
        let not_numeric = || ParseError::NotNumeric {
            version: self.value.clone(),
            index,
        };

        let mut items: Vec<String> = (0..index)
            .map(|i| self.main.get(i).map_or_else(|| "0".to_string(), ToString::to_string))
            .collect();

        let next = match self.main.get(index) {
            None => 1,
            Some(VersionItem::Number(n)) => n.checked_add(1).ok_or_else(not_numeric)?,
            Some(VersionItem::Text(_)) => return Err(not_numeric()),
        };
        items.push(next.to_string());

        Ok(items)
    }

    /// Exclusive upper bound used by tilde and caret ranges.
    ///
    /// `1.2.3`.upper_bound(1) is `1.3-`: the empty pre-release marker makes
    /// the bound sort below every `1.3` pre-release as well.
    pub fn upper_bound(&self, index: usize) -> Result<Version, ParseError> {
        let items = self.bumped_items(index)?;
        Ok(Self::from_parts(&format!("{}-", items.join("."))))
    }

    /// Inclusive lower bound that also admits pre-releases of this version.
    ///
    /// `1.2.3`.lower_bound() is `1.2.3-`. Versions that already carry a
    /// pre-release or build are returned unchanged.
    pub fn lower_bound(&self) -> Version {
        if self.pre.is_some() || self.build.is_some() {
            return self.clone();
        }
        Self::from_parts(&format!("{}-", self.value))
    }

    fn is_marker(&self) -> bool {
        self.value.is_empty()
    }

    /// Next version at `index`, zeroing the following components.
    ///
    /// `1.2.3`.bump(1) is `1.3.0`.
    pub fn bump(&self, index: usize) -> Result<Version, ParseError> {
        let mut items = self.bumped_items(index)?;
        items.resize(self.main.len().max(index + 1), "0".to_string());
        Ok(Self::from_parts(&items.join(".")))
    }

    /// Whether this version is contained in the range `expression`
    pub fn in_range(
        &self,
        expression: &str,
        resolve_prerelease: Option<bool>,
    ) -> Result<bool, ParseError> {
        Ok(VersionRange::parse(expression)?.contains(self, resolve_prerelease))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.significant()
            .cmp(other.significant())
            .then_with(|| match (&self.pre, &other.pre) {
                (Some(a), Some(b)) => match (a.is_marker(), b.is_marker()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    (false, false) => a.cmp(b),
                },
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| self.build.cmp(&other.build))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
        self.pre.hash(state);
        self.build.hash(state);
    }
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
