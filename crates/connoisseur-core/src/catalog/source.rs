use std::path::Path;

use crate::catalog::csv_source::CsvSource;
use crate::error::{Error, Result};
use crate::model::RawTrack;
use crate::schema::TrackDatabase;

/// Somewhere raw tracks can be read from, once, at startup.
pub trait CatalogSource {
    /// Read every track in source order, unfiltered.
    fn read_tracks(&self) -> Result<Vec<RawTrack>>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

impl CatalogSource for [RawTrack] {
    fn read_tracks(&self) -> Result<Vec<RawTrack>> {
        Ok(self.to_vec())
    }

    fn describe(&self) -> String {
        format!("memory:{} tracks", self.len())
    }
}

impl CatalogSource for Vec<RawTrack> {
    fn read_tracks(&self) -> Result<Vec<RawTrack>> {
        self.as_slice().read_tracks()
    }

    fn describe(&self) -> String {
        self.as_slice().describe()
    }
}

/// Pick a source implementation from the file extension.
///
/// `.csv` opens a [`CsvSource`]; `.db`, `.sqlite` and `.sqlite3` open a
/// [`TrackDatabase`].
pub fn open_source(path: impl AsRef<Path>) -> Result<Box<dyn CatalogSource>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("csv") => Ok(Box::new(CsvSource::new(path))),
        Some("db" | "sqlite" | "sqlite3") => {
            if !path.exists() {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("track database not found: {}", path.display()),
                )));
            }
            Ok(Box::new(TrackDatabase::open(path)?))
        }
        _ => Err(Error::UnsupportedSource(path.display().to_string())),
    }
}
