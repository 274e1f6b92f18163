use thiserror::Error;

use crate::model::{Dimension, RowId};

#[derive(Debug, Error)]
pub enum Error {
    /// A feature dimension has zero variance across the fitted population.
    #[error("degenerate dimension: {dimension} has zero variance")]
    DegenerateDimension { dimension: Dimension },

    /// Filtering removed every row, or there was nothing to fit.
    #[error("empty catalog: no tracks with popularity above {min_popularity}")]
    EmptyCatalog { min_popularity: u32 },

    #[error("unknown row: {row_id} (catalog has {len} rows)")]
    UnknownRow { row_id: RowId, len: usize },

    #[error("missing feature dimension: {dimension}")]
    MissingDimension { dimension: Dimension },

    #[error("unknown feature dimension: {0}")]
    UnknownDimension(String),

    #[error("non-finite value for {dimension}: {value}")]
    NonFiniteValue { dimension: Dimension, value: f64 },

    /// The catalog source lacks columns the feature schema requires.
    #[error("catalog schema mismatch: missing columns {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    /// A stored catalog was written under a different feature schema.
    #[error("feature schema mismatch: source is v{found}, expected v{expected}")]
    SchemaVersionMismatch { found: String, expected: u32 },

    #[error("unsupported catalog source: {0}")]
    UnsupportedSource(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` for errors that can only happen while building a
    /// catalog, and that therefore abort startup.
    ///
    /// `InvalidData`, `Database` and `Io` are left out: they are also raised
    /// when parsing a query vibe or importing into a track database.
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            Self::DegenerateDimension { .. }
                | Self::EmptyCatalog { .. }
                | Self::SchemaMismatch { .. }
                | Self::SchemaVersionMismatch { .. }
                | Self::UnsupportedSource(_)
                | Self::Csv(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
