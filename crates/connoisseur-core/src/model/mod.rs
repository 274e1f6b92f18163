pub mod ids;
pub mod item;
pub mod vector;
pub mod vibe;

pub use ids::RowId;
pub use item::{CatalogItem, RawTrack};
pub use vector::{Dimension, DimensionRange, FeatureVector, DIMENSION_COUNT, SCHEMA_VERSION};
pub use vibe::{parse_vibe, parse_vibe_str, VibeReading, VibeSummary};
