use anyhow::{Context, Result};
use connoisseur_core::{CatalogSource, CsvSource, TrackDatabase};
use std::path::Path;

/// Copy every row of a CSV catalog into a SQLite track database.
///
/// No filtering happens here; the popularity threshold is applied when the
/// database is later loaded as a catalog.
pub fn run_import(csv_path: &Path, db_path: &Path) -> Result<()> {
    log::info!("Importing {} into {}", csv_path.display(), db_path.display());

    let tracks = CsvSource::new(csv_path)
        .read_tracks()
        .with_context(|| format!("Failed to read {}", csv_path.display()))?;

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = TrackDatabase::open(db_path)
        .with_context(|| format!("Failed to open {}", db_path.display()))?;
    let inserted = db.insert_tracks(&tracks)?;
    let total = db.count_tracks()?;

    println!("✓ Imported {} tracks", inserted);
    println!("  {} now holds {} tracks", db_path.display(), total);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_csv_into_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let csv_path = dir.path().join("dataset.csv");
        let db_path = dir.path().join("nested").join("tracks.db");
        std::fs::write(
            &csv_path,
            "track_id,track_name,artists,popularity,danceability,energy,speechiness,acousticness,instrumentalness,valence,tempo\n\
             x1,Up,A,80,0.9,0.9,0.1,0.1,0.0,0.9,130\n\
             x2,Down,B,20,0.1,0.2,0.05,0.9,0.6,0.1,65\n",
        )
        .unwrap();

        run_import(&csv_path, &db_path).unwrap();

        let db = TrackDatabase::open(&db_path).unwrap();
        assert_eq!(db.count_tracks().unwrap(), 2);
    }
}
