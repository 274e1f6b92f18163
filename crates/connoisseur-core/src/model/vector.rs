//! The feature schema and the vectors built on it.
//!
//! The schema is the single list of dimension names shared by the catalog
//! loaders, the normalizer and query parsing. Changing the list or its order
//! changes the meaning of every stored vector, so it is versioned.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Version of the feature schema. Bump when [`Dimension::ALL`] changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Number of dimensions in a [`FeatureVector`].
pub const DIMENSION_COUNT: usize = 7;

/// A named feature dimension, in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Danceability,
    Energy,
    Speechiness,
    Acousticness,
    Instrumentalness,
    Valence,
    Tempo,
}

/// The documented range of a dimension's raw values.
///
/// Ranges describe what the upstream analysis produces. They are not
/// enforced: an out-of-range query is still matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionRange {
    /// Confidence or measure in `[0.0, 1.0]`.
    Unit,
    /// Beats per minute.
    Bpm,
}

impl Dimension {
    /// All dimensions in schema order.
    pub const ALL: [Self; DIMENSION_COUNT] = [
        Self::Danceability,
        Self::Energy,
        Self::Speechiness,
        Self::Acousticness,
        Self::Instrumentalness,
        Self::Valence,
        Self::Tempo,
    ];

    /// Column / key name of the dimension.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Danceability => "danceability",
            Self::Energy => "energy",
            Self::Speechiness => "speechiness",
            Self::Acousticness => "acousticness",
            Self::Instrumentalness => "instrumentalness",
            Self::Valence => "valence",
            Self::Tempo => "tempo",
        }
    }

    /// Position of the dimension within a vector.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn range(self) -> DimensionRange {
        match self {
            Self::Tempo => DimensionRange::Bpm,
            _ => DimensionRange::Unit,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dimension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|dim| dim.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownDimension(s.to_string()))
    }
}

/// One finite value per [`Dimension`], in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>")]
pub struct FeatureVector([f64; DIMENSION_COUNT]);

impl FeatureVector {
    /// Build a vector from values already in schema order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonFiniteValue`] if any value is NaN or infinite.
    pub fn new(values: [f64; DIMENSION_COUNT]) -> Result<Self> {
        for (dimension, value) in Dimension::ALL.into_iter().zip(values) {
            if !value.is_finite() {
                return Err(Error::NonFiniteValue { dimension, value });
            }
        }
        Ok(Self(values))
    }

    /// Build a vector from `(name, value)` pairs in any order.
    ///
    /// Every schema dimension must be present exactly once.
    pub fn from_named<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut slots: [Option<f64>; DIMENSION_COUNT] = [None; DIMENSION_COUNT];
        for (name, value) in pairs {
            let dimension: Dimension = name.as_ref().parse()?;
            let slot = &mut slots[dimension.index()];
            if slot.is_some() {
                return Err(Error::InvalidData(format!(
                    "dimension {} given more than once",
                    dimension
                )));
            }
            *slot = Some(value);
        }

        let mut values = [0.0; DIMENSION_COUNT];
        for dimension in Dimension::ALL {
            values[dimension.index()] =
                slots[dimension.index()].ok_or(Error::MissingDimension { dimension })?;
        }
        Self::new(values)
    }

    /// Wraps values produced by arithmetic on already-validated vectors.
    pub(crate) const fn from_array(values: [f64; DIMENSION_COUNT]) -> Self {
        Self(values)
    }

    #[must_use]
    pub const fn values(&self) -> &[f64; DIMENSION_COUNT] {
        &self.0
    }

    #[must_use]
    pub const fn get(&self, dimension: Dimension) -> f64 {
        self.0[dimension.index()]
    }

    /// `(dimension, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.into_iter().zip(self.0.iter().copied())
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

impl Index<Dimension> for FeatureVector {
    type Output = f64;

    fn index(&self, dimension: Dimension) -> &f64 {
        &self.0[dimension.index()]
    }
}

impl TryFrom<BTreeMap<String, f64>> for FeatureVector {
    type Error = Error;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self> {
        Self::from_named(map)
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(DIMENSION_COUNT))?;
        for (dimension, value) in self.iter() {
            map.serialize_entry(dimension.name(), &value)?;
        }
        map.end()
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(dimension, value)| format!("{}={:.3}", dimension, value))
            .collect();
        write!(f, "[{}]", parts.join(" "))
    }
}
