//! Core domain model for connoisseur.
//!
//! This crate defines the versioned feature schema, feature vectors, z-score
//! normalization over a reference catalog, and the immutable track catalog
//! together with the sources it can be loaded from (CSV, SQLite, memory).

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod error;
pub mod feature_space;
pub mod model;
pub mod schema;

pub use catalog::{open_source, Catalog, CatalogSource, CatalogStats, CsvSource, LoadOptions};
pub use error::{Error, Result};
pub use feature_space::{fit, transform, NormalizationParams};
pub use model::{CatalogItem, Dimension, FeatureVector, RawTrack, RowId, VibeReading, VibeSummary};
pub use schema::TrackDatabase;
