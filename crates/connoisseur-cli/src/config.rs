use anyhow::{Context, Result};
use confyg::{env, Confygery};
use connoisseur_core::catalog::DEFAULT_MIN_POPULARITY;
use connoisseur_core::LoadOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for connoisseur.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (CONNOISSEUR_* prefix)
/// 3. Config file (~/.config/connoisseur/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the track catalog (`.csv`, `.db`, `.sqlite`).
    ///
    /// Can be set via:
    /// - CLI: --catalog /path/to/dataset.csv
    /// - ENV: CONNOISSEUR_CATALOG_PATH
    /// - Config: catalog_path = "/path/to/dataset.csv"
    /// - Default: ~/.local/share/connoisseur/dataset.csv
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Only tracks with a popularity strictly above this are matched.
    #[serde(default = "default_min_popularity")]
    pub min_popularity: u32,

    /// Drop repeated track ids, keeping the first row.
    #[serde(default)]
    pub dedupe_track_ids: bool,

    /// Tracks returned per match when `-k` is not given.
    #[serde(default = "default_track_count")]
    pub default_track_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            min_popularity: default_min_popularity(),
            dedupe_track_ids: false,
            default_track_count: default_track_count(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/connoisseur/config.toml
    /// Reads environment variables with CONNOISSEUR_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("connoisseur");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Apply CLI overrides on top of the loaded configuration.
    #[must_use]
    pub fn with_overrides(
        mut self,
        catalog_path: Option<PathBuf>,
        min_popularity: Option<u32>,
        dedupe: bool,
    ) -> Self {
        if let Some(path) = catalog_path {
            self.catalog_path = path;
        }
        if let Some(threshold) = min_popularity {
            self.min_popularity = threshold;
        }
        if dedupe {
            self.dedupe_track_ids = true;
        }
        self
    }

    /// Catalog filtering options derived from this configuration.
    #[must_use]
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions::default()
            .with_min_popularity(self.min_popularity)
            .with_dedupe(self.dedupe_track_ids)
    }
}

/// Get the default catalog path.
///
/// Returns: ~/.local/share/connoisseur/dataset.csv (or platform equivalent)
fn default_catalog_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("connoisseur")
        .join("dataset.csv")
}

const fn default_min_popularity() -> u32 {
    DEFAULT_MIN_POPULARITY
}

const fn default_track_count() -> usize {
    1
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/connoisseur/config.toml
/// - macOS: ~/Library/Application Support/connoisseur/config.toml
/// - Windows: %APPDATA%\connoisseur\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("connoisseur")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Connoisseur Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (CONNOISSEUR_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Path to the track catalog
#
# A CSV with the Spotify Tracks dataset columns, or a SQLite database
# created with `connoisseur import`.
#
# Can also be set via:
# - CLI: connoisseur --catalog /custom/dataset.csv match ...
# - Environment: CONNOISSEUR_CATALOG_PATH=/custom/dataset.csv
#
# Default: Platform-specific data directory
#catalog_path = "/path/to/dataset.csv"

# Only tracks with popularity strictly above this value are matched
min_popularity = 50

# Keep only the first row for each track id (the dataset lists some
# tracks once per genre)
dedupe_track_ids = false

# Tracks returned per match when -k is not given
default_track_count = 1
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.catalog_path.as_os_str().is_empty());
        assert_eq!(config.min_popularity, 50);
        assert!(!config.dedupe_track_ids);
        assert_eq!(config.default_track_count, 1);
    }

    #[test]
    fn test_config_load() {
        // Should not fail even if config file doesn't exist
        let result = Config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.min_popularity, 50);
        assert_eq!(config.catalog_path, default_catalog_path());
    }

    #[test]
    fn test_overrides() {
        let config = Config::default().with_overrides(
            Some(PathBuf::from("/tmp/tracks.db")),
            Some(70),
            true,
        );
        assert_eq!(config.catalog_path, PathBuf::from("/tmp/tracks.db"));
        let options = config.load_options();
        assert_eq!(options.min_popularity, 70);
        assert!(options.dedupe_track_ids);
    }

    #[test]
    fn test_no_overrides_keeps_values() {
        let base = Config::default();
        let config = base.clone().with_overrides(None, None, false);
        assert_eq!(config.catalog_path, base.catalog_path);
        assert_eq!(config.min_popularity, base.min_popularity);
    }
}
