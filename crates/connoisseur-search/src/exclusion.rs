//! The set of catalog rows that have already been handed out.
//!
//! The set only grows. A row id that is excluded stays excluded for the life
//! of the set; there is no way to return a track to the pool.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use connoisseur_core::{Error, Result, RowId};

#[derive(Debug)]
struct Mask {
    excluded: Vec<bool>,
    count: usize,
}

impl Mask {
    fn check(&self, row_id: RowId) -> Result<()> {
        if row_id.index() < self.excluded.len() {
            Ok(())
        } else {
            Err(Error::UnknownRow {
                row_id,
                len: self.excluded.len(),
            })
        }
    }

    fn contains(&self, row_id: RowId) -> bool {
        self.excluded.get(row_id.index()).copied().unwrap_or(false)
    }

    fn insert(&mut self, row_id: RowId) -> bool {
        let slot = &mut self.excluded[row_id.index()];
        if *slot {
            false
        } else {
            *slot = true;
            self.count += 1;
            true
        }
    }

    fn active_ids(&self) -> BTreeSet<RowId> {
        self.excluded
            .iter()
            .enumerate()
            .filter(|(_, excluded)| !**excluded)
            .map(|(index, _)| RowId::new(index))
            .collect()
    }
}

/// Consumed catalog rows, shared by every request against one catalog.
///
/// Reads and writes go through one mutex. [`ExclusionSet::lock`] hands out
/// the mutex guard so a caller can read the pool and commit its picks
/// without another caller interleaving.
#[derive(Debug)]
pub struct ExclusionSet {
    capacity: usize,
    inner: Mutex<Mask>,
}

impl ExclusionSet {
    /// An empty set for a catalog of `capacity` rows.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Mask {
                excluded: vec![false; capacity],
                count: 0,
            }),
        }
    }

    /// Number of rows in the catalog this set covers.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Take the lock for a read-then-commit critical section.
    ///
    /// The mask is only written after every check has passed, so a guard
    /// recovered from a poisoned lock still sees a consistent set.
    pub fn lock(&self) -> ExclusionGuard<'_> {
        ExclusionGuard {
            mask: self.inner.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    #[must_use]
    pub fn contains(&self, row_id: RowId) -> bool {
        self.lock().contains(row_id)
    }

    /// Exclude `row_id`. Returns `false` if it was already excluded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownRow`] if `row_id` is outside the catalog.
    pub fn add(&self, row_id: RowId) -> Result<bool> {
        self.lock().insert(row_id)
    }

    /// Row ids still available for matching.
    #[must_use]
    pub fn active_ids(&self) -> BTreeSet<RowId> {
        self.lock().active_ids()
    }

    #[must_use]
    pub fn excluded_count(&self) -> usize {
        self.lock().excluded_count()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.lock().remaining()
    }
}

/// Exclusive access to an [`ExclusionSet`] for as long as it lives.
#[derive(Debug)]
pub struct ExclusionGuard<'a> {
    mask: MutexGuard<'a, Mask>,
}

impl ExclusionGuard<'_> {
    #[must_use]
    pub fn contains(&self, row_id: RowId) -> bool {
        self.mask.contains(row_id)
    }

    pub fn insert(&mut self, row_id: RowId) -> Result<bool> {
        self.mask.check(row_id)?;
        Ok(self.mask.insert(row_id))
    }

    /// Exclude every row in `rows`, or none of them.
    ///
    /// Returns how many rows were newly excluded.
    pub fn commit(&mut self, rows: &[RowId]) -> Result<usize> {
        for row_id in rows {
            self.mask.check(*row_id)?;
        }
        Ok(rows.iter().filter(|row_id| self.mask.insert(**row_id)).count())
    }

    #[must_use]
    pub fn active_ids(&self) -> BTreeSet<RowId> {
        self.mask.active_ids()
    }

    /// Iterate over unexcluded row ids in ascending order without allocating
    /// a set.
    pub fn iter_active(&self) -> impl Iterator<Item = RowId> + '_ {
        self.mask
            .excluded
            .iter()
            .enumerate()
            .filter(|(_, excluded)| !**excluded)
            .map(|(index, _)| RowId::new(index))
    }

    #[must_use]
    pub fn excluded_count(&self) -> usize {
        self.mask.count
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.mask.excluded.len() - self.mask.count
    }
}
