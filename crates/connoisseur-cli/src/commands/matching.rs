use anyhow::{Context, Result};
use connoisseur_core::model::parse_vibe_str;
use connoisseur_core::{open_source, Dimension, FeatureVector};
use connoisseur_search::{MatchRecord, SearchError, VibeEngine};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// A vibe given either as a JSON file or as one flag per feature.
#[derive(Debug, clap::Args)]
pub struct VibeArgs {
    /// JSON file holding the vibe (`-` for stdin)
    #[arg(long)]
    pub vibe: Option<PathBuf>,

    #[arg(long)]
    pub danceability: Option<f64>,
    #[arg(long)]
    pub energy: Option<f64>,
    #[arg(long)]
    pub speechiness: Option<f64>,
    #[arg(long)]
    pub acousticness: Option<f64>,
    #[arg(long)]
    pub instrumentalness: Option<f64>,
    #[arg(long)]
    pub valence: Option<f64>,
    /// Beats per minute
    #[arg(long)]
    pub tempo: Option<f64>,
}

impl VibeArgs {
    fn flags(&self) -> Vec<(Dimension, f64)> {
        [
            (Dimension::Danceability, self.danceability),
            (Dimension::Energy, self.energy),
            (Dimension::Speechiness, self.speechiness),
            (Dimension::Acousticness, self.acousticness),
            (Dimension::Instrumentalness, self.instrumentalness),
            (Dimension::Valence, self.valence),
            (Dimension::Tempo, self.tempo),
        ]
        .into_iter()
        .filter_map(|(dimension, value)| value.map(|v| (dimension, v)))
        .collect()
    }

    /// Resolve the arguments into a query vector.
    pub fn to_vector(&self) -> Result<FeatureVector> {
        let flags = self.flags();
        match &self.vibe {
            Some(path) => {
                if !flags.is_empty() {
                    anyhow::bail!("--vibe cannot be combined with per-feature flags");
                }
                let text = read_input(path)?;
                parse_vibe_str(&text).with_context(|| format!("Invalid vibe in {}", path.display()))
            }
            None => {
                let vector =
                    FeatureVector::from_named(flags.into_iter().map(|(d, v)| (d.name(), v)))?;
                Ok(vector)
            }
        }
    }
}

/// Read a file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Load the configured catalog and build an engine over it.
pub fn load_engine(config: &Config) -> Result<VibeEngine> {
    let source = open_source(&config.catalog_path)
        .with_context(|| format!("Failed to open catalog {}", config.catalog_path.display()))?;
    let engine = VibeEngine::load(source.as_ref(), &config.load_options())
        .context("Failed to load catalog")?;
    Ok(engine)
}

fn print_records(records: &[MatchRecord]) {
    for (rank, record) in records.iter().enumerate() {
        println!(
            "  {}. {} by {}  (distance {:.4}, row {})",
            rank + 1,
            record.track_name,
            record.artist_name,
            record.distance,
            record.row_id
        );
    }
}

pub fn run_match(config: &Config, vibe: &VibeArgs, k: Option<usize>, json: bool) -> Result<()> {
    let query = vibe.to_vector()?;
    let k = k.unwrap_or(config.default_track_count);
    let engine = load_engine(config)?;

    log::info!("Matching {} track(s) for {}", k, query);
    let records: Vec<MatchRecord> = engine
        .find_nearest(&query, k)?
        .iter()
        .map(|m| m.record())
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        println!("\n🎵 Closest tracks for {}\n", query);
        print_records(&records);
    }

    Ok(())
}

pub fn run_batch(config: &Config, file: &Path, k: Option<usize>, json: bool) -> Result<()> {
    let text = read_input(file)?;
    let k = k.unwrap_or(config.default_track_count);
    let engine = load_engine(config)?;

    let mut matched = 0;
    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        let query = parse_vibe_str(line).with_context(|| format!("Invalid vibe on line {}", line_no))?;

        let records: Vec<MatchRecord> = match engine.find_nearest(&query, k) {
            Ok(matches) => matches.iter().map(|m| m.record()).collect(),
            Err(SearchError::NoCandidates { .. }) => {
                log::warn!("Catalog exhausted at line {}", line_no);
                if !json {
                    println!("\n⚠ Catalog exhausted after {} vibe(s)", matched);
                }
                break;
            }
            Err(e) => return Err(e.into()),
        };
        matched += 1;

        if json {
            let entry = serde_json::json!({ "line": line_no, "matches": records });
            println!("{}", serde_json::to_string(&entry)?);
        } else {
            println!("\nLine {}: {}", line_no, query);
            print_records(&records);
        }
    }

    if !json {
        println!(
            "\n✓ Matched {} vibe(s), {} of {} tracks left",
            matched,
            engine.remaining(),
            engine.catalog().len()
        );
    }

    Ok(())
}
