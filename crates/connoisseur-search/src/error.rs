//! Matching error types.

use thiserror::Error;

/// Errors returned by a single match request.
///
/// None of these leave partial state behind: a failed request never adds
/// rows to the exclusion set.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Every catalog row has already been excluded.
    #[error("no candidates left: catalog exhausted ({requested} requested)")]
    NoCandidates { requested: usize },

    /// A match must ask for at least one track.
    #[error("invalid track count: {0} (must be at least 1)")]
    InvalidCount(usize),

    /// The exclusion set was sized for a different catalog.
    #[error("exclusion set covers {exclusions} rows but catalog has {catalog}")]
    ExclusionMismatch { exclusions: usize, catalog: usize },

    /// An error propagated from the core catalog layer.
    #[error(transparent)]
    Core(#[from] connoisseur_core::Error),
}

impl SearchError {
    /// Returns `true` when the request failed only because the catalog ran
    /// out of unexcluded tracks.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::NoCandidates { .. })
    }
}

/// Convenience alias for matching results.
pub type SearchResult<T> = std::result::Result<T, SearchError>;
