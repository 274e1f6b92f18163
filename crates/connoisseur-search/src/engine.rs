//! The process-wide matching engine.
//!
//! One engine owns the catalog and the exclusion set for the life of the
//! process. Build it once at startup and share it (for example behind an
//! `Arc`); every request then sees the same exclusions.

use connoisseur_core::{Catalog, CatalogSource, FeatureVector, LoadOptions};

use crate::error::{SearchError, SearchResult};
use crate::exclusion::ExclusionSet;
use crate::matcher::{Match, Matcher};

#[derive(Debug)]
pub struct VibeEngine {
    catalog: Catalog,
    exclusions: ExclusionSet,
}

impl VibeEngine {
    /// Wrap a loaded catalog with a fresh, empty exclusion set.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        let exclusions = ExclusionSet::new(catalog.len());
        Self {
            catalog,
            exclusions,
        }
    }

    /// Load a catalog from `source` and build an engine over it.
    ///
    /// Any startup error aborts construction; no partial engine is returned.
    pub fn load<S: CatalogSource + ?Sized>(source: &S, options: &LoadOptions) -> SearchResult<Self> {
        let catalog = Catalog::load(source, options)?;
        Ok(Self::new(catalog))
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    #[must_use]
    pub const fn matcher(&self) -> Matcher<'_> {
        Matcher::new(&self.catalog)
    }

    /// Tracks not yet handed out.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.exclusions.remaining()
    }

    /// The `k` nearest tracks not yet handed out. See [`Matcher::find_nearest`].
    pub fn find_nearest(&self, query: &FeatureVector, k: usize) -> SearchResult<Vec<Match<'_>>> {
        self.matcher().find_nearest(query, k, &self.exclusions)
    }

    /// The single nearest track not yet handed out.
    pub fn find_one(&self, query: &FeatureVector) -> SearchResult<Match<'_>> {
        self.find_nearest(query, 1)?
            .into_iter()
            .next()
            .ok_or(SearchError::NoCandidates { requested: 1 })
    }
}
