//! Per-reference revision ledgers
//!
//! Each reference's ledger is held in its persisted JSON form behind its own
//! lock. Mutations run a full `loads` -> mutate -> `dumps` cycle under that
//! lock, so ledgers of different references never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use crate::revision::error::StoreError;
use crate::revision::list::{Clock, RevisionEntry, RevisionList, SystemClock};

type Ledger = Arc<Mutex<String>>;

pub struct RevisionStore<C: Clock = SystemClock> {
    ledgers: Mutex<HashMap<String, Ledger>>,
    clock: C,
}

impl RevisionStore {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for RevisionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> RevisionStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            ledgers: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Acquire the reference map lock with proper error handling
    fn lock_ledgers(&self) -> Result<MutexGuard<'_, HashMap<String, Ledger>>, StoreError> {
        self.ledgers.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn ledger(&self, reference: &str) -> Result<Ledger, StoreError> {
        let mut ledgers = self.lock_ledgers()?;
        Ok(Arc::clone(ledgers.entry(reference.to_string()).or_default()))
    }

    fn existing_ledger(&self, reference: &str) -> Result<Option<Ledger>, StoreError> {
        Ok(self.lock_ledgers()?.get(reference).cloned())
    }

    fn load(contents: &str) -> Result<RevisionList, StoreError> {
        if contents.is_empty() {
            return Ok(RevisionList::new());
        }
        Ok(RevisionList::loads(contents)?)
    }

    /// Run `f` on the reference's list and persist the result, creating the
    /// ledger if the reference is new.
    fn update<T>(
        &self,
        reference: &str,
        f: impl FnOnce(&mut RevisionList) -> T,
    ) -> Result<T, StoreError> {
        Self::apply(&self.ledger(reference)?, f)
    }

    fn apply<T>(ledger: &Ledger, f: impl FnOnce(&mut RevisionList) -> T) -> Result<T, StoreError> {
        let mut contents = ledger.lock().map_err(|_| StoreError::LockPoisoned)?;

        let mut list = Self::load(&contents)?;
        let result = f(&mut list);
        *contents = list.dumps();

        Ok(result)
    }

    fn read<T>(
        &self,
        reference: &str,
        f: impl FnOnce(&RevisionList) -> T,
    ) -> Result<T, StoreError> {
        let Some(ledger) = self.existing_ledger(reference)? else {
            return Ok(f(&RevisionList::new()));
        };
        let contents = ledger.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(f(&Self::load(&contents)?))
    }

    /// Replace the reference's ledger with persisted `contents`.
    pub fn import(&self, reference: &str, contents: &str) -> Result<(), StoreError> {
        let imported = RevisionList::loads(contents)?;
        info!("Imported {} revision(s) for {}", imported.len(), reference);
        self.update(reference, |list| *list = imported)
    }

    /// Persisted form of the reference's ledger, if it was ever touched
    pub fn export(&self, reference: &str) -> Result<Option<String>, StoreError> {
        let Some(ledger) = self.existing_ledger(reference)? else {
            return Ok(None);
        };
        let contents = ledger.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(Some(Self::load(&contents)?.dumps()))
    }

    /// Record `revision_id` as the reference's latest revision.
    ///
    /// The timestamp is taken while the ledger is locked, so append order and
    /// time order agree across concurrent writers.
    pub fn add_revision(&self, reference: &str, revision_id: &str) -> Result<(), StoreError> {
        self.update(reference, |list| list.add_revision_at(revision_id, self.clock.now()))?;
        debug!("Added revision {} to {}", revision_id, reference);
        Ok(())
    }

    pub fn remove_revision(
        &self,
        reference: &str,
        revision_id: &str,
    ) -> Result<Option<RevisionEntry>, StoreError> {
        let Some(ledger) = self.existing_ledger(reference)? else {
            return Ok(None);
        };
        let removed = Self::apply(&ledger, |list| list.remove_revision(revision_id))?;
        if removed.is_some() {
            debug!("Removed revision {} from {}", revision_id, reference);
        }
        Ok(removed)
    }

    pub fn latest_revision(&self, reference: &str) -> Result<Option<RevisionEntry>, StoreError> {
        self.read(reference, |list| list.latest_revision().cloned())
    }

    pub fn get_time(&self, reference: &str, revision_id: &str) -> Result<Option<f64>, StoreError> {
        self.read(reference, |list| list.get_time(revision_id))
    }

    /// Revisions of the reference, latest first
    pub fn revisions(&self, reference: &str) -> Result<Vec<RevisionEntry>, StoreError> {
        self.read(reference, RevisionList::as_list)
    }

    /// Known references, sorted
    pub fn references(&self) -> Result<Vec<String>, StoreError> {
        let mut references: Vec<String> = self.lock_ledgers()?.keys().cloned().collect();
        references.sort();
        Ok(references)
    }
}
