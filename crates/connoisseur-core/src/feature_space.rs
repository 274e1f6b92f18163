//! Z-score normalization over the feature schema.
//!
//! Parameters are fitted once over the filtered catalog and reused for every
//! query. Refitting per query would make distances from different calls
//! incomparable.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Dimension, FeatureVector, DIMENSION_COUNT};

/// Per-dimension mean and population standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParams {
    pub mean: [f64; DIMENSION_COUNT],
    /// Never zero.
    pub std_dev: [f64; DIMENSION_COUNT],
}

impl NormalizationParams {
    #[must_use]
    pub const fn mean_of(&self, dimension: Dimension) -> f64 {
        self.mean[dimension.index()]
    }

    #[must_use]
    pub const fn std_dev_of(&self, dimension: Dimension) -> f64 {
        self.std_dev[dimension.index()]
    }

    /// Normalize `vector` with these parameters. See [`transform`].
    #[must_use]
    pub fn transform(&self, vector: &FeatureVector) -> FeatureVector {
        transform(vector, self)
    }
}

/// Fit mean and standard deviation for every dimension across `rows`.
///
/// Uses the population standard deviation (divisor `n`).
///
/// # Errors
///
/// Returns [`Error::DegenerateDimension`] if any dimension has zero variance,
/// and [`Error::EmptyCatalog`] if `rows` is empty.
pub fn fit(rows: &[FeatureVector]) -> Result<NormalizationParams> {
    if rows.is_empty() {
        return Err(Error::EmptyCatalog { min_popularity: 0 });
    }
    let n = rows.len() as f64;

    let mut mean = [0.0; DIMENSION_COUNT];
    for row in rows {
        for (slot, value) in mean.iter_mut().zip(row.values()) {
            *slot += value;
        }
    }
    for slot in &mut mean {
        *slot /= n;
    }

    let mut variance = [0.0; DIMENSION_COUNT];
    for row in rows {
        for ((slot, value), m) in variance.iter_mut().zip(row.values()).zip(mean) {
            let delta = value - m;
            *slot += delta * delta;
        }
    }

    let mut std_dev = [0.0; DIMENSION_COUNT];
    for dimension in Dimension::ALL {
        let sd = (variance[dimension.index()] / n).sqrt();
        if sd == 0.0 {
            return Err(Error::DegenerateDimension { dimension });
        }
        std_dev[dimension.index()] = sd;
    }

    log::debug!("Fitted normalization over {} rows", rows.len());
    Ok(NormalizationParams { mean, std_dev })
}

/// Apply `(x - mean) / std_dev` elementwise.
#[must_use]
pub fn transform(vector: &FeatureVector, params: &NormalizationParams) -> FeatureVector {
    let mut out = [0.0; DIMENSION_COUNT];
    for (index, slot) in out.iter_mut().enumerate() {
        *slot = (vector.values()[index] - params.mean[index]) / params.std_dev[index];
    }
    FeatureVector::from_array(out)
}
