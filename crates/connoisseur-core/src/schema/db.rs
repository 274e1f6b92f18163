use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::catalog::CatalogSource;
use crate::error::{Error, Result};
use crate::model::{Dimension, FeatureVector, RawTrack, DIMENSION_COUNT, SCHEMA_VERSION};

use super::migrations::MIGRATIONS;

const SCHEMA_VERSION_KEY: &str = "feature_schema_version";

/// A SQLite track store that can back a catalog.
#[derive(Debug)]
pub struct TrackDatabase {
    conn: Connection,
    label: String,
}

impl TrackDatabase {
    /// Open (or create) a database at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let db = Self {
            conn,
            label: format!("sqlite:{}", path.display()),
        };
        db.apply_migrations()?;
        db.check_feature_schema()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn,
            label: String::from("sqlite::memory:"),
        };
        db.apply_migrations()?;
        db.check_feature_schema()?;
        Ok(db)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }

    /// Stamp a fresh database with the feature schema version, or verify the
    /// stamp of an existing one.
    fn check_feature_schema(&self) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO catalog_meta (key, value) VALUES (?1, ?2)",
            rusqlite::params![SCHEMA_VERSION_KEY, SCHEMA_VERSION.to_string()],
        )?;
        let stored: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM catalog_meta WHERE key = ?1",
                [SCHEMA_VERSION_KEY],
                |row| row.get(0),
            )
            .optional()?;

        match stored {
            Some(version) if version == SCHEMA_VERSION.to_string() => Ok(()),
            Some(found) => Err(Error::SchemaVersionMismatch {
                found,
                expected: SCHEMA_VERSION,
            }),
            None => Err(Error::SchemaVersionMismatch {
                found: String::from("none"),
                expected: SCHEMA_VERSION,
            }),
        }
    }
}

// Track CRUD
impl TrackDatabase {
    /// Insert a single track.
    pub fn insert_track(&self, track: &RawTrack) -> Result<()> {
        let f = track.features.values();
        self.conn.execute(
            "INSERT INTO tracks (
                track_id, track_name, artists, album_name, popularity,
                danceability, energy, speechiness, acousticness,
                instrumentalness, valence, tempo
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            rusqlite::params![
                track.track_id,
                track.track_name,
                track.artists,
                track.album_name,
                track.popularity,
                f[0],
                f[1],
                f[2],
                f[3],
                f[4],
                f[5],
                f[6],
            ],
        )?;
        Ok(())
    }

    /// Insert many tracks in one transaction. Returns the number inserted.
    pub fn insert_tracks(&self, tracks: &[RawTrack]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        for track in tracks {
            self.insert_track(track)?;
        }
        tx.commit()?;
        Ok(tracks.len())
    }

    pub fn count_tracks(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tracks", [], |row| row.get(0))?;
        usize::try_from(count).map_err(|_| Error::InvalidData(format!("bad track count {}", count)))
    }

    /// All tracks in insertion order.
    pub fn list_tracks(&self) -> Result<Vec<RawTrack>> {
        let columns: Vec<&str> = Dimension::ALL.iter().map(|d| d.name()).collect();
        let sql = format!(
            "SELECT track_id, track_name, artists, album_name, popularity, {} FROM tracks ORDER BY id",
            columns.join(", ")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| Self::row_to_track_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(TrackRow::into_track).collect()
    }

    fn row_to_track_row(row: &rusqlite::Row) -> rusqlite::Result<TrackRow> {
        let mut features = [0.0; DIMENSION_COUNT];
        for (offset, slot) in features.iter_mut().enumerate() {
            *slot = row.get(5 + offset)?;
        }
        Ok(TrackRow {
            track_id: row.get(0)?,
            track_name: row.get(1)?,
            artists: row.get(2)?,
            album_name: row.get(3)?,
            popularity: row.get(4)?,
            features,
        })
    }
}

/// A `tracks` row whose feature values have not been validated yet.
struct TrackRow {
    track_id: Option<String>,
    track_name: String,
    artists: String,
    album_name: Option<String>,
    popularity: u32,
    features: [f64; DIMENSION_COUNT],
}

impl TrackRow {
    fn into_track(self) -> Result<RawTrack> {
        Ok(RawTrack {
            track_id: self.track_id,
            track_name: self.track_name,
            artists: self.artists,
            album_name: self.album_name,
            popularity: self.popularity,
            features: FeatureVector::new(self.features)?,
        })
    }
}

impl CatalogSource for TrackDatabase {
    fn read_tracks(&self) -> Result<Vec<RawTrack>> {
        self.list_tracks()
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(name: &str, popularity: u32, tempo: f64) -> RawTrack {
        RawTrack::new(
            name,
            "Test Artist",
            popularity,
            FeatureVector::new([0.5, 0.6, 0.05, 0.2, 0.0, 0.7, tempo]).unwrap(),
        )
    }

    #[test]
    fn test_database_open_in_memory() {
        let db = TrackDatabase::open_in_memory().unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(db.count_tracks().unwrap(), 0);
    }

    #[test]
    fn test_track_round_trip() {
        let db = TrackDatabase::open_in_memory().unwrap();
        let original = track("Test Track", 64, 128.0)
            .with_track_id("abc123")
            .with_album("Test Album");

        db.insert_track(&original).unwrap();

        let tracks = db.list_tracks().unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0], original);
    }

    #[test]
    fn test_insert_tracks_keeps_order() {
        let db = TrackDatabase::open_in_memory().unwrap();
        let tracks = vec![track("A", 70, 100.0), track("B", 20, 110.0), track("C", 90, 90.0)];

        assert_eq!(db.insert_tracks(&tracks).unwrap(), 3);

        let names: Vec<String> = db
            .read_tracks()
            .unwrap()
            .into_iter()
            .map(|t| t.track_name)
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(db.count_tracks().unwrap(), 3);
    }

    #[test]
    fn test_feature_schema_version_mismatch() {
        let db = TrackDatabase::open_in_memory().unwrap();
        db.conn()
            .execute(
                "UPDATE catalog_meta SET value = '0' WHERE key = ?1",
                [SCHEMA_VERSION_KEY],
            )
            .unwrap();
        let err = db.check_feature_schema().unwrap_err();
        assert!(matches!(
            &err,
            Error::SchemaVersionMismatch { found, expected: SCHEMA_VERSION } if found == "0"
        ));
        assert!(err.is_startup());
    }

    #[test]
    fn test_reopen_file_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tracks.db");
        {
            let db = TrackDatabase::open(&path).unwrap();
            db.insert_track(&track("Persisted", 80, 95.0)).unwrap();
        }
        let db = TrackDatabase::open(&path).unwrap();
        assert_eq!(db.count_tracks().unwrap(), 1);
        assert!(db.describe().starts_with("sqlite:"));
    }
}
