//! Version range expressions
//!
//! ```text
//! range       := alternative ("||" alternative)* ("," option)*
//! alternative := sub-expression (" " sub-expression)*
//! option      := "include_prerelease"
//! ```
//!
//! Alternatives are ORed, sub-expressions inside an alternative are ANDed.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::version::condition::ConditionSet;
use crate::version::error::ParseError;
use crate::version::semver::Version;

const INCLUDE_PRERELEASE: &str = "include_prerelease";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    expression: String,
    condition_sets: Vec<ConditionSet>,
}

impl VersionRange {
    /// Parse a range expression such as `>=1.0 <2.0 || ^3.1, include_prerelease`.
    ///
    /// Fails if any alternative has an operator with no version after it.
    pub fn parse(expression: &str) -> Result<Self, ParseError> {
        let (version_expression, options) = expression.split_once(',').unwrap_or((expression, ""));

        let mut prerelease = false;
        for option in options.split(',').map(str::trim).filter(|o| !o.is_empty()) {
            if option.contains(INCLUDE_PRERELEASE) {
                prerelease = true;
            } else {
                warn!(
                    "Ignoring unknown version range option '{}' in '{}'",
                    option, expression
                );
            }
        }

        let condition_sets = version_expression
            .split("||")
            .map(|alternative| ConditionSet::parse(alternative, prerelease))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Parsed version range '{}' into {} alternative(s)",
            expression,
            condition_sets.len()
        );

        Ok(Self {
            expression: expression.to_string(),
            condition_sets,
        })
    }

    pub fn condition_sets(&self) -> &[ConditionSet] {
        &self.condition_sets
    }

    /// Whether `version` is inside the range.
    ///
    /// `resolve_prerelease`:
    /// - `Some(true)`: pre-releases can always be resolved
    /// - `Some(false)`: pre-releases are never resolved
    /// - `None`: pre-releases are resolved only if the expression says so
    pub fn contains(&self, version: &Version, resolve_prerelease: Option<bool>) -> bool {
        self.condition_sets
            .iter()
            .any(|set| set.is_valid(version, resolve_prerelease))
    }

    /// Candidates contained in the range, in input order
    pub fn satisfying<'a, I>(
        &'a self,
        candidates: I,
        resolve_prerelease: Option<bool>,
    ) -> impl Iterator<Item = &'a Version>
    where
        I: IntoIterator<Item = &'a Version>,
    {
        candidates
            .into_iter()
            .filter(move |version| self.contains(version, resolve_prerelease))
    }

    /// The greatest candidate contained in the range
    pub fn max_satisfying<'a, I>(
        &self,
        candidates: I,
        resolve_prerelease: Option<bool>,
    ) -> Option<&'a Version>
    where
        I: IntoIterator<Item = &'a Version>,
    {
        candidates
            .into_iter()
            .filter(|version| self.contains(version, resolve_prerelease))
            .max()
    }
}

impl FromStr for VersionRange {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn contains(expression: &str, version: &str, resolve_prerelease: Option<bool>) -> bool {
        VersionRange::parse(expression)
            .unwrap()
            .contains(&Version::parse(version).unwrap(), resolve_prerelease)
    }

    fn versions(items: &[&str]) -> Vec<Version> {
        items.iter().map(|s| Version::parse(s).unwrap()).collect()
    }

    // exact match
    #[rstest]
    #[case("1.0.0", "1.0.0", true)]
    #[case("1.0.0", "1.0", true)]
    #[case("1.0.0", "1.0.1", false)]
    #[case("=2.1", "2.1.0", true)]
    fn contains_exact(#[case] expression: &str, #[case] version: &str, #[case] expected: bool) {
        assert_eq!(contains(expression, version, None), expected);
    }

    // tilde (~) range
    #[rstest]
    #[case("~1.2.3", "1.2.3", true)]
    #[case("~1.2.3", "1.2.9", true)]
    #[case("~1.2.3", "1.2.2", false)]
    #[case("~1.2.3", "1.3.0", false)]
    #[case("~1", "1.9.9", true)]
    #[case("~1", "2.0.0", false)]
    #[case("~1", "0.9", false)]
    fn contains_tilde(#[case] expression: &str, #[case] version: &str, #[case] expected: bool) {
        assert_eq!(contains(expression, version, None), expected);
    }

    // caret (^) range
    #[rstest]
    #[case("^1.2.3", "1.2.3", true)]
    #[case("^1.2.3", "1.9.9", true)]
    #[case("^1.2.3", "1.2.2", false)]
    #[case("^1.2.3", "2.0.0", false)]
    #[case("^0.2.3", "0.2.9", true)]
    #[case("^0.2.3", "0.3.0", false)]
    #[case("^0.0.3", "0.0.3", true)]
    #[case("^0.0.3", "0.0.4", false)]
    fn contains_caret(#[case] expression: &str, #[case] version: &str, #[case] expected: bool) {
        assert_eq!(contains(expression, version, None), expected);
    }

    // AND / OR composition
    #[rstest]
    #[case(">=1.0.0 <2.0.0", "1.5.0", true)]
    #[case(">=1.0.0 <2.0.0", "2.0.0", false)]
    #[case(">1.0.0 <=2.0.0", "2.0.0", true)]
    #[case(">1.0.0 <=2.0.0", "1.0.0", false)]
    #[case("1.0 || 2.0", "1.5", false)]
    #[case("1.0 || 2.0", "2.0", true)]
    #[case(">=1.0 <1.5 || >=2.0", "1.2", true)]
    #[case(">=1.0 <1.5 || >=2.0", "1.7", false)]
    #[case(">=1.0 <1.5 || >=2.0", "3.0", true)]
    #[case("*", "0.0.1", true)]
    #[case("", "12.4", true)]
    fn contains_composite(#[case] expression: &str, #[case] version: &str, #[case] expected: bool) {
        assert_eq!(contains(expression, version, None), expected);
    }

    #[rstest]
    #[case(">=1.0.0", "1.0.0-rc1", None, false)]
    #[case(">=1.0.0-", "1.0.0-rc1", None, true)]
    #[case(">=1.0.0", "1.0.0-rc1", Some(true), true)]
    #[case(">=1.0.0-", "1.0.0-rc1", Some(false), false)]
    #[case(">=1.0.0, include_prerelease", "1.0.0-rc1", None, true)]
    #[case(">=1.0.0, include_prerelease", "1.0.0-rc1", Some(false), false)]
    #[case(">=1.0.0 || >=3.0-", "1.0.0-rc1", None, false)]
    #[case(">=1.0.0 || >=0.5-", "1.0.0-rc1", None, true)]
    #[case("~1.2-", "1.3.0-alpha", None, false)]
    #[case("~1.2-", "1.2.5-alpha", None, true)]
    fn contains_prerelease(
        #[case] expression: &str,
        #[case] version: &str,
        #[case] resolve_prerelease: Option<bool>,
        #[case] expected: bool,
    ) {
        assert_eq!(contains(expression, version, resolve_prerelease), expected);
    }

    #[test]
    fn include_prerelease_applies_to_every_alternative() {
        let range = VersionRange::parse("1.0 || 2.0, include_prerelease").unwrap();
        assert!(range.condition_sets().iter().all(ConditionSet::prerelease));
    }

    #[test]
    fn unknown_options_are_ignored() {
        let range = VersionRange::parse(">=1.0, loose").unwrap();
        assert!(!range.condition_sets()[0].prerelease());
        assert!(range.contains(&Version::parse("1.1").unwrap(), None));
    }

    #[test]
    fn display_returns_expression_verbatim() {
        let expression = ">=1.0 <2.0-  ||  ~3, include_prerelease";
        assert_eq!(VersionRange::parse(expression).unwrap().to_string(), expression);
    }

    #[rstest]
    #[case(">=")]
    #[case(">=1.0 || <")]
    #[case("~")]
    fn parse_fails_without_partial_range(#[case] expression: &str) {
        assert!(matches!(
            VersionRange::parse(expression),
            Err(ParseError::MissingVersion(_))
        ));
    }

    #[test]
    fn satisfying_keeps_input_order() {
        let candidates = versions(&["2.1", "1.0", "1.5", "3.0", "1.9-rc"]);
        let range = VersionRange::parse(">=1.0 <2.0 || >=3").unwrap();

        let matched: Vec<String> = range
            .satisfying(&candidates, None)
            .map(ToString::to_string)
            .collect();
        assert_eq!(matched, vec!["1.0", "1.5", "3.0"]);
    }

    #[rstest]
    #[case("^1.0", None, Some("1.9"))]
    #[case("^1.0", Some(true), Some("1.10-rc"))]
    #[case("~2.0", None, None)]
    #[case("*", None, Some("3.0"))]
    fn max_satisfying_picks_greatest(
        #[case] expression: &str,
        #[case] resolve_prerelease: Option<bool>,
        #[case] expected: Option<&str>,
    ) {
        let candidates = versions(&["1.0", "1.9", "1.10-rc", "3.0", "0.1"]);
        let range = VersionRange::parse(expression).unwrap();

        assert_eq!(
            range
                .max_satisfying(&candidates, resolve_prerelease)
                .map(ToString::to_string),
            expected.map(ToString::to_string)
        );
    }
}
