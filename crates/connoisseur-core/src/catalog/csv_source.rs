//! CSV catalog source.
//!
//! Expects the column layout of the public "Spotify Tracks" dataset: a header
//! row, the seven feature columns, `popularity`, `track_name` and `artists`.
//! `track_id` and `album_name` are used when present; any other column is
//! ignored.

use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::catalog::CatalogSource;
use crate::error::{Error, Result};
use crate::model::{Dimension, FeatureVector, RawTrack};

const IDENTITY_COLUMNS: [&str; 3] = ["popularity", "track_name", "artists"];

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    track_id: Option<String>,
    track_name: String,
    artists: String,
    #[serde(default)]
    album_name: Option<String>,
    popularity: u32,
    danceability: f64,
    energy: f64,
    speechiness: f64,
    acousticness: f64,
    instrumentalness: f64,
    valence: f64,
    tempo: f64,
}

impl CsvRow {
    fn into_track(self) -> Result<RawTrack> {
        let features = FeatureVector::new([
            self.danceability,
            self.energy,
            self.speechiness,
            self.acousticness,
            self.instrumentalness,
            self.valence,
            self.tempo,
        ])?;
        Ok(RawTrack {
            track_id: self.track_id.filter(|id| !id.is_empty()),
            track_name: self.track_name,
            artists: self.artists,
            album_name: self.album_name.filter(|name| !name.is_empty()),
            popularity: self.popularity,
            features,
        })
    }
}

/// A CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for CsvSource {
    fn read_tracks(&self) -> Result<Vec<RawTrack>> {
        let file = File::open(&self.path)?;
        read_csv(file)
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}

/// Read tracks from CSV text with a header row.
///
/// # Errors
///
/// Returns [`Error::SchemaMismatch`] listing every required column the header
/// lacks, and [`Error::InvalidData`] for the first row that fails to parse.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawTrack>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let missing: Vec<String> = Dimension::ALL
        .iter()
        .map(|d| d.name())
        .chain(IDENTITY_COLUMNS)
        .filter(|column| !headers.iter().any(|h| h == *column))
        .map(String::from)
        .collect();
    if !missing.is_empty() {
        return Err(Error::SchemaMismatch { missing });
    }

    let mut tracks = Vec::new();
    for record in reader.deserialize::<CsvRow>() {
        let row = record.map_err(|e| Error::InvalidData(e.to_string()))?;
        tracks.push(row.into_track()?);
    }
    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = ",track_id,artists,album_name,track_name,popularity,duration_ms,explicit,danceability,energy,key,loudness,mode,speechiness,acousticness,instrumentalness,liveness,valence,tempo,time_signature,track_genre";

    fn sample_csv() -> String {
        format!(
            "{}\n\
             0,5SuOikwiRyPMVoIQDJUgSV,Gen Hoshino,Comedy,Comedy,73,230666,False,0.676,0.461,1,-6.746,0,0.143,0.0322,1.01e-06,0.358,0.715,87.917,4,acoustic\n\
             1,4qPNDBW1i3p13qLCt0Ki3A,Ben Woodward,Ghost (Acoustic),Ghost - Acoustic,55,149610,False,0.42,0.166,1,-17.235,1,0.0763,0.924,5.56e-06,0.101,0.267,77.489,4,acoustic\n",
            HEADER
        )
    }

    #[test]
    fn test_read_kaggle_layout() {
        let tracks = read_csv(sample_csv().as_bytes()).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].track_name, "Comedy");
        assert_eq!(tracks[0].artists, "Gen Hoshino");
        assert_eq!(tracks[0].popularity, 73);
        assert_eq!(tracks[0].track_id.as_deref(), Some("5SuOikwiRyPMVoIQDJUgSV"));
        assert!((tracks[1].features[Dimension::Tempo] - 77.489).abs() < 1e-9);
        assert!((tracks[1].features[Dimension::Acousticness] - 0.924).abs() < 1e-9);
    }

    #[test]
    fn test_minimal_columns() {
        let text = "track_name,artists,popularity,danceability,energy,speechiness,acousticness,instrumentalness,valence,tempo\n\
                    Song,Band,51,0.5,0.5,0.1,0.1,0.0,0.5,120\n";
        let tracks = read_csv(text.as_bytes()).unwrap();
        assert_eq!(tracks.len(), 1);
        assert!(tracks[0].track_id.is_none());
        assert!(tracks[0].album_name.is_none());
    }

    #[test]
    fn test_missing_columns_is_schema_mismatch() {
        let text = "track_name,artists,popularity,danceability,energy\nSong,Band,51,0.5,0.5\n";
        match read_csv(text.as_bytes()) {
            Err(Error::SchemaMismatch { missing }) => {
                assert_eq!(
                    missing,
                    vec![
                        "speechiness",
                        "acousticness",
                        "instrumentalness",
                        "valence",
                        "tempo"
                    ]
                );
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_row_is_invalid_data() {
        let text = "track_name,artists,popularity,danceability,energy,speechiness,acousticness,instrumentalness,valence,tempo\n\
                    Song,Band,popular,0.5,0.5,0.1,0.1,0.0,0.5,120\n";
        assert!(matches!(
            read_csv(text.as_bytes()),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_csv_source_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("dataset.csv");
        std::fs::write(&path, sample_csv()).unwrap();

        let source = CsvSource::new(&path);
        assert_eq!(source.read_tracks().unwrap().len(), 2);
        assert!(source.describe().starts_with("csv:"));
    }
}
