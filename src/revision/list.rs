//! Ordered revision ledger for a single package reference

use chrono::{DateTime, SecondsFormat, Utc};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::revision::error::FormatError;

/// Source of revision timestamps
#[cfg_attr(test, automock)]
pub trait Clock: Send + Sync {
    /// Seconds since the UNIX epoch
    fn now(&self) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionEntry {
    pub revision: String,
    pub time: f64,
}

impl RevisionEntry {
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_micros((self.time * 1_000_000.0).round() as i64)
    }

    /// UTC time formatted for listings, e.g. `2024-05-01T10:20:30Z`
    pub fn to_iso8601(&self) -> Option<String> {
        self.datetime().map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

#[derive(Deserialize)]
struct Persisted {
    revisions: Vec<RevisionEntry>,
}

/// Revisions in append order, oldest first
#[derive(Debug, Clone, Default)]
pub struct RevisionList {
    entries: Vec<RevisionEntry>,
}

impl RevisionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loads(contents: &str) -> Result<Self, FormatError> {
        let persisted: Persisted = serde_json::from_str(contents)?;
        Ok(Self {
            entries: persisted.revisions,
        })
    }

    pub fn dumps(&self) -> String {
        json!({ "revisions": self.entries }).to_string()
    }

    /// Record `revision_id` as the latest revision, timestamped now.
    pub fn add_revision(&mut self, revision_id: &str) {
        self.add_revision_at(revision_id, SystemClock.now());
    }

    /// Record `revision_id` as the latest revision with the given time.
    ///
    /// Re-adding the current latest revision is a no-op, since every
    /// uploaded file of a revision reports it again. Any older entry with the
    /// same id is moved to the end.
    pub fn add_revision_at(&mut self, revision_id: &str, time: f64) {
        if self
            .latest_revision()
            .is_some_and(|latest| latest.revision == revision_id)
        {
            debug!("Revision {} is already the latest", revision_id);
            return;
        }

        if let Some(index) = self.find_revision_index(revision_id) {
            self.entries.remove(index);
        }
        self.entries.push(RevisionEntry {
            revision: revision_id.to_string(),
            time,
        });
    }

    pub fn latest_revision(&self) -> Option<&RevisionEntry> {
        self.entries.last()
    }

    pub fn get_time(&self, revision_id: &str) -> Option<f64> {
        self.find_revision_index(revision_id).map(|index| self.entries[index].time)
    }

    /// Entries latest first
    pub fn as_list(&self) -> Vec<RevisionEntry> {
        self.entries.iter().rev().cloned().collect()
    }

    /// Remove `revision_id` if present, returning the removed entry.
    pub fn remove_revision(&mut self, revision_id: &str) -> Option<RevisionEntry> {
        let index = self.find_revision_index(revision_id)?;
        Some(self.entries.remove(index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find_revision_index(&self, revision_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.revision == revision_id)
    }
}

impl PartialEq for RevisionList {
    fn eq(&self, other: &Self) -> bool {
        self.dumps() == other.dumps()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn list_of(entries: &[(&str, f64)]) -> RevisionList {
        let mut list = RevisionList::new();
        for (revision, time) in entries {
            list.add_revision_at(revision, *time);
        }
        list
    }

    fn ids(list: &RevisionList) -> Vec<String> {
        list.as_list().into_iter().map(|e| e.revision).collect()
    }

    #[test]
    fn dumps_uses_persisted_shape() {
        let list = list_of(&[("abc", 1.5), ("def", 2.0)]);
        assert_eq!(
            list.dumps(),
            r#"{"revisions":[{"revision":"abc","time":1.5},{"revision":"def","time":2.0}]}"#
        );
    }

    #[test]
    fn loads_reads_persisted_shape_in_order() {
        let list = RevisionList::loads(
            r#"{"revisions": [{"revision": "r1", "time": 10}, {"revision": "r2", "time": 20.25}]}"#,
        )
        .unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list.latest_revision().map(|e| e.revision.as_str()), Some("r2"));
        assert_eq!(list.get_time("r1"), Some(10.0));
        assert_eq!(ids(&list), vec!["r2", "r1"]);
    }

    #[test]
    fn loads_then_dumps_round_trips() {
        let list = list_of(&[("a", 1.0), ("b", 2.5), ("c", 1_700_000_000.123_456)]);
        assert_eq!(RevisionList::loads(&list.dumps()).unwrap(), list);
    }

    #[rstest]
    #[case("not json")]
    #[case("{}")]
    #[case(r#"{"revisions": {}}"#)]
    #[case(r#"{"revisions": [{"revision": "a"}]}"#)]
    #[case(r#"{"revisions": [{"time": 1}]}"#)]
    #[case(r#"{"revisions": [{"revision": 1, "time": 1}]}"#)]
    fn loads_rejects_malformed_contents(#[case] contents: &str) {
        assert!(matches!(
            RevisionList::loads(contents),
            Err(FormatError::Json(_))
        ));
    }

    #[test]
    fn add_revision_appends_new_ids() {
        let list = list_of(&[("a", 1.0), ("b", 2.0), ("c", 3.0)]);
        assert_eq!(ids(&list), vec!["c", "b", "a"]);
    }

    #[test]
    fn add_revision_of_latest_is_noop() {
        let mut list = list_of(&[("a", 1.0), ("b", 2.0)]);
        let before = list.dumps();

        list.add_revision_at("b", 99.0);

        assert_eq!(list.dumps(), before);
        assert_eq!(list.get_time("b"), Some(2.0));
    }

    #[rstest]
    #[case("a")]
    #[case("b")]
    fn add_revision_moves_existing_id_to_end(#[case] revision: &str) {
        let mut list = list_of(&[("a", 1.0), ("b", 2.0), ("c", 3.0)]);

        list.add_revision_at(revision, 4.0);

        assert_eq!(list.len(), 3);
        assert_eq!(ids(&list)[0], revision);
        assert_eq!(list.get_time(revision), Some(4.0));
    }

    #[test]
    fn add_revision_uses_current_time() {
        let before = SystemClock.now();
        let mut list = RevisionList::new();
        list.add_revision("a");

        let time = list.get_time("a").unwrap();
        assert!(time >= before);
    }

    #[test]
    fn latest_revision_of_empty_list_is_none() {
        assert!(RevisionList::new().latest_revision().is_none());
    }

    #[test]
    fn get_time_of_absent_id_is_none() {
        assert_eq!(list_of(&[("a", 1.0)]).get_time("b"), None);
    }

    #[rstest]
    #[case("a", vec!["c", "b"])]
    #[case("b", vec!["c", "a"])]
    #[case("c", vec!["b", "a"])]
    fn remove_revision_removes_entry(#[case] revision: &str, #[case] expected: Vec<&str>) {
        let mut list = list_of(&[("a", 1.0), ("b", 2.0), ("c", 3.0)]);

        let removed = list.remove_revision(revision);

        assert_eq!(removed.map(|e| e.revision), Some(revision.to_string()));
        assert_eq!(ids(&list), expected);
    }

    #[test]
    fn remove_revision_of_absent_id_is_noop() {
        let mut list = list_of(&[("a", 1.0), ("b", 2.0)]);
        let before = list.dumps();

        assert_eq!(list.remove_revision("z"), None);
        assert_eq!(list.dumps(), before);
    }

    #[test]
    fn equality_compares_serialized_form() {
        assert_eq!(list_of(&[("a", 1.0)]), list_of(&[("a", 1.0)]));
        assert_ne!(list_of(&[("a", 1.0)]), list_of(&[("a", 2.0)]));
        assert_ne!(
            list_of(&[("a", 1.0), ("b", 2.0)]),
            list_of(&[("b", 2.0), ("a", 1.0)])
        );
    }

    #[test]
    fn entry_formats_time_as_iso8601() {
        let entry = RevisionEntry {
            revision: "a".to_string(),
            time: 1_714_558_830.25,
        };
        assert_eq!(entry.to_iso8601().as_deref(), Some("2024-05-01T10:20:30Z"));
    }
}
