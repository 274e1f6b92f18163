use serde::{Deserialize, Serialize};

use crate::model::ids::RowId;
use crate::model::vector::FeatureVector;

/// Separator between artist names in the source `artists` column.
pub const ARTIST_SEPARATOR: char = ';';

/// A track as read from a catalog source, before filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTrack {
    /// Streaming-service track identifier, when the source has one.
    pub track_id: Option<String>,
    pub track_name: String,
    /// One or more artist names joined by [`ARTIST_SEPARATOR`].
    pub artists: String,
    pub album_name: Option<String>,
    /// Popularity score, 0-100.
    pub popularity: u32,
    pub features: FeatureVector,
}

impl RawTrack {
    #[must_use]
    pub fn new(
        track_name: impl Into<String>,
        artists: impl Into<String>,
        popularity: u32,
        features: FeatureVector,
    ) -> Self {
        Self {
            track_id: None,
            track_name: track_name.into(),
            artists: artists.into(),
            album_name: None,
            popularity,
            features,
        }
    }

    #[must_use]
    pub fn with_track_id(mut self, track_id: impl Into<String>) -> Self {
        self.track_id = Some(track_id.into());
        self
    }

    #[must_use]
    pub fn with_album(mut self, album_name: impl Into<String>) -> Self {
        self.album_name = Some(album_name.into());
        self
    }
}

/// A track that survived catalog filtering.
///
/// Owned by the catalog and immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogItem {
    pub row_id: RowId,
    pub track_id: Option<String>,
    pub track_name: String,
    pub artist_name: String,
    pub album_name: Option<String>,
    pub popularity: u32,
    pub raw_features: FeatureVector,
}

impl CatalogItem {
    pub(crate) fn from_raw(row_id: RowId, raw: RawTrack) -> Self {
        Self {
            row_id,
            track_id: raw.track_id,
            track_name: raw.track_name,
            artist_name: raw.artists,
            album_name: raw.album_name,
            popularity: raw.popularity,
            raw_features: raw.features,
        }
    }

    /// Individual artist names.
    pub fn artists(&self) -> impl Iterator<Item = &str> {
        self.artist_name
            .split(ARTIST_SEPARATOR)
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Free-text query used to look the track up in the playback service.
    #[must_use]
    pub fn search_query(&self) -> String {
        format!("{} {}", self.track_name, self.artist_name)
    }
}
