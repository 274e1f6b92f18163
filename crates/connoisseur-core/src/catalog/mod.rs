//! The immutable track catalog.
//!
//! A catalog is built once at startup: raw tracks are read from a
//! [`CatalogSource`], filtered by popularity (and optionally de-duplicated),
//! numbered, and normalized with parameters fitted over the survivors. After
//! that nothing in it changes.

pub mod csv_source;
pub mod source;

pub use csv_source::{read_csv, CsvSource};
pub use source::{open_source, CatalogSource};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::feature_space::{self, NormalizationParams};
use crate::model::{CatalogItem, FeatureVector, RawTrack, RowId, SCHEMA_VERSION};

/// Default popularity threshold; only tracks strictly above it are kept.
pub const DEFAULT_MIN_POPULARITY: u32 = 50;

/// How raw tracks are filtered into a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Keep tracks with `popularity > min_popularity`.
    pub min_popularity: u32,
    /// Keep only the first row for each `track_id`.
    pub dedupe_track_ids: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            min_popularity: DEFAULT_MIN_POPULARITY,
            dedupe_track_ids: false,
        }
    }
}

impl LoadOptions {
    #[must_use]
    pub const fn with_min_popularity(mut self, min_popularity: u32) -> Self {
        self.min_popularity = min_popularity;
        self
    }

    #[must_use]
    pub const fn with_dedupe(mut self, dedupe_track_ids: bool) -> Self {
        self.dedupe_track_ids = dedupe_track_ids;
        self
    }
}

/// Summary of how a catalog was built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub schema_version: u32,
    pub rows: usize,
    pub source_rows: usize,
    pub below_threshold: usize,
    pub duplicates: usize,
    pub options: LoadOptions,
    pub params: NormalizationParams,
}

#[derive(Debug)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    normalized: Vec<FeatureVector>,
    params: NormalizationParams,
    stats: CatalogStats,
}

impl Catalog {
    /// Read, filter and normalize every track from `source`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::EmptyCatalog`] when no track survives filtering and
    /// with [`Error::DegenerateDimension`] when a feature has no variance
    /// among the survivors. Source errors are propagated unchanged.
    pub fn load<S: CatalogSource + ?Sized>(source: &S, options: &LoadOptions) -> Result<Self> {
        log::info!("Loading catalog from {}", source.describe());
        let tracks = source.read_tracks()?;
        Self::from_tracks(tracks, options)
    }

    /// Build a catalog from tracks already in memory.
    pub fn from_tracks(tracks: Vec<RawTrack>, options: &LoadOptions) -> Result<Self> {
        let source_rows = tracks.len();
        let mut below_threshold = 0;
        let mut duplicates = 0;
        let mut seen: HashSet<String> = HashSet::new();
        let mut items = Vec::new();

        for track in tracks {
            if track.popularity <= options.min_popularity {
                below_threshold += 1;
                continue;
            }
            if options.dedupe_track_ids {
                if let Some(id) = &track.track_id {
                    if !seen.insert(id.clone()) {
                        duplicates += 1;
                        continue;
                    }
                }
            }
            items.push(CatalogItem::from_raw(RowId::new(items.len()), track));
        }

        if items.is_empty() {
            return Err(Error::EmptyCatalog {
                min_popularity: options.min_popularity,
            });
        }

        let raw: Vec<FeatureVector> = items.iter().map(|item| item.raw_features).collect();
        let params = feature_space::fit(&raw)?;
        let normalized = raw.iter().map(|v| params.transform(v)).collect();

        log::info!(
            "Catalog ready: {} of {} tracks kept (popularity > {}, {} duplicates dropped)",
            items.len(),
            source_rows,
            options.min_popularity,
            duplicates
        );

        let stats = CatalogStats {
            schema_version: SCHEMA_VERSION,
            rows: items.len(),
            source_rows,
            below_threshold,
            duplicates,
            options: *options,
            params,
        };

        Ok(Self {
            items,
            normalized,
            params,
            stats,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always `false` for a loaded catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn params(&self) -> &NormalizationParams {
        &self.params
    }

    #[must_use]
    pub const fn stats(&self) -> &CatalogStats {
        &self.stats
    }

    pub fn item(&self, row_id: RowId) -> Result<&CatalogItem> {
        self.items.get(row_id.index()).ok_or(Error::UnknownRow {
            row_id,
            len: self.items.len(),
        })
    }

    pub fn raw_features(&self, row_id: RowId) -> Result<&FeatureVector> {
        self.item(row_id).map(|item| &item.raw_features)
    }

    pub fn normalized_features(&self, row_id: RowId) -> Result<&FeatureVector> {
        self.normalized.get(row_id.index()).ok_or(Error::UnknownRow {
            row_id,
            len: self.items.len(),
        })
    }

    /// `(track_name, artist_name)` of a row.
    pub fn identity(&self, row_id: RowId) -> Result<(&str, &str)> {
        self.item(row_id)
            .map(|item| (item.track_name.as_str(), item.artist_name.as_str()))
    }

    /// Normalize a query with the parameters fitted at load time.
    #[must_use]
    pub fn normalize(&self, query: &FeatureVector) -> FeatureVector {
        self.params.transform(query)
    }

    pub fn items(&self) -> impl ExactSizeIterator<Item = &CatalogItem> {
        self.items.iter()
    }

    /// The normalized matrix, one row per item, indexed by row id.
    #[must_use]
    pub fn normalized_rows(&self) -> &[FeatureVector] {
        &self.normalized
    }
}
