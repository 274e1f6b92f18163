//! Nearest-neighbour matching over the normalized catalog.
//!
//! The pool is filtered by the exclusion set first and ranked second. Ranking
//! is by Euclidean distance in normalized space, with ties going to the lower
//! row id so results are reproducible.

use serde::Serialize;
use std::cmp::Ordering;

use connoisseur_core::{Catalog, CatalogItem, FeatureVector, RowId};

use crate::error::{SearchError, SearchResult};
use crate::exclusion::{ExclusionGuard, ExclusionSet};

/// A ranked row before it is resolved to a catalog item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub row_id: RowId,
    pub distance: f64,
}

impl Candidate {
    /// Ascending distance, then ascending row id.
    fn rank_order(a: &Self, b: &Self) -> Ordering {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.row_id.cmp(&b.row_id))
    }
}

/// A selected catalog track and its distance from the query.
#[derive(Debug, Clone, Copy)]
pub struct Match<'c> {
    pub item: &'c CatalogItem,
    pub distance: f64,
}

impl Match<'_> {
    #[must_use]
    pub const fn row_id(&self) -> RowId {
        self.item.row_id
    }

    /// Owned, serializable view for output.
    #[must_use]
    pub fn record(&self) -> MatchRecord {
        MatchRecord {
            row_id: self.item.row_id,
            track_name: self.item.track_name.clone(),
            artist_name: self.item.artist_name.clone(),
            track_id: self.item.track_id.clone(),
            search_query: self.item.search_query(),
            distance: self.distance,
        }
    }
}

/// What a match looks like to callers outside the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    pub row_id: RowId,
    pub track_name: String,
    pub artist_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_id: Option<String>,
    pub search_query: String,
    pub distance: f64,
}

/// Ranks catalog rows against a query.
///
/// Holds only a shared reference to the catalog; all mutable state lives in
/// the [`ExclusionSet`] passed to each call.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'c> {
    catalog: &'c Catalog,
}

impl<'c> Matcher<'c> {
    #[must_use]
    pub const fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    /// Return the `k` nearest unexcluded tracks and exclude them.
    ///
    /// The query is normalized before the exclusion lock is taken. Reading
    /// the pool, ranking, and committing the picks happen under one lock, so
    /// concurrent callers sharing `exclusions` never receive the same row.
    /// If fewer than `k` rows remain, all of them are returned.
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidCount`] if `k` is zero.
    /// - [`SearchError::ExclusionMismatch`] if `exclusions` was not sized for
    ///   this catalog.
    /// - [`SearchError::NoCandidates`] if every row is already excluded.
    ///
    /// On error the exclusion set is left untouched.
    pub fn find_nearest(
        &self,
        query: &FeatureVector,
        k: usize,
        exclusions: &ExclusionSet,
    ) -> SearchResult<Vec<Match<'c>>> {
        if k == 0 {
            return Err(SearchError::InvalidCount(k));
        }
        if exclusions.capacity() != self.catalog.len() {
            return Err(SearchError::ExclusionMismatch {
                exclusions: exclusions.capacity(),
                catalog: self.catalog.len(),
            });
        }

        let normalized = self.catalog.normalize(query);

        let selected = {
            let mut guard = exclusions.lock();
            let selected = self.rank(&normalized, k, &guard)?;
            let rows: Vec<RowId> = selected.iter().map(|c| c.row_id).collect();
            guard.commit(&rows)?;
            selected
        };

        log::debug!(
            "Matched {} of {} requested: {:?}",
            selected.len(),
            k,
            selected.iter().map(|c| c.row_id.index()).collect::<Vec<_>>()
        );

        selected
            .into_iter()
            .map(|candidate| -> SearchResult<Match<'c>> {
                Ok(Match {
                    item: self.catalog.item(candidate.row_id)?,
                    distance: candidate.distance,
                })
            })
            .collect()
    }

    /// Rank the unexcluded pool against an already-normalized query without
    /// committing anything.
    ///
    /// Returns at most `k` candidates in ascending `(distance, row_id)` order.
    pub fn rank(
        &self,
        normalized_query: &FeatureVector,
        k: usize,
        pool: &ExclusionGuard<'_>,
    ) -> SearchResult<Vec<Candidate>> {
        let rows = self.catalog.normalized_rows();
        let mut candidates: Vec<Candidate> = pool
            .iter_active()
            .filter_map(|row_id| {
                rows.get(row_id.index()).map(|row| Candidate {
                    row_id,
                    distance: normalized_query.distance(row),
                })
            })
            .collect();

        if candidates.is_empty() {
            log::warn!("No candidates left in a catalog of {} rows", rows.len());
            return Err(SearchError::NoCandidates { requested: k });
        }

        if candidates.len() > k {
            candidates.select_nth_unstable_by(k - 1, Candidate::rank_order);
            candidates.truncate(k);
        }
        candidates.sort_by(Candidate::rank_order);

        Ok(candidates)
    }
}
