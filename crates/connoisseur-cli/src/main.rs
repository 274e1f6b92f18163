use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod commands;
mod config;

use config::Config;

#[derive(Debug, Parser)]
#[command(name = "connoisseur", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the track catalog (default: ~/.local/share/connoisseur/dataset.csv)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Only match tracks with popularity above this value (default: 50)
    #[arg(long, global = true)]
    min_popularity: Option<u32>,

    /// Keep only the first row for each track id
    #[arg(long, global = true)]
    dedupe: bool,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Find the tracks closest to a vibe
    ///
    /// The vibe is either read from a JSON file (or stdin with `-`) or given
    /// as one flag per feature. JSON may be an object keyed by feature name,
    /// a list of {"aspect", "value"} entries, or a full reading with
    /// "vibe" and "summary" keys.
    ///
    /// Features: danceability, energy, speechiness, acousticness,
    /// instrumentalness, valence (all 0.0-1.0) and tempo (BPM). Values
    /// outside those ranges are accepted.
    Match {
        #[command(flatten)]
        vibe: commands::matching::VibeArgs,

        /// Number of tracks to return (default from config, usually 1)
        #[arg(short, long = "count")]
        k: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Match every vibe in a JSON-lines file against one catalog
    ///
    /// Vibes are matched in file order and no track is returned twice. Stops
    /// early if the catalog runs out of tracks.
    Batch {
        /// JSON-lines file, one vibe per line (`-` for stdin)
        file: PathBuf,

        /// Number of tracks per vibe (default from config, usually 1)
        #[arg(short, long = "count")]
        k: Option<usize>,

        /// Print results as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Show catalog statistics and normalization parameters
    Catalog {
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Copy a CSV catalog into a SQLite track database
    Import {
        /// Source CSV file
        csv: PathBuf,
        /// Destination SQLite database (created if missing)
        db: PathBuf,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults
    Init,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::load()?.with_overrides(cli.catalog, cli.min_popularity, cli.dedupe);

    match cli.command {
        Commands::Match { vibe, k, json } => {
            commands::run_match(&config, &vibe, k, json)?;
        }
        Commands::Batch { file, k, json } => {
            commands::run_batch(&config, &file, k, json)?;
        }
        Commands::Catalog { json } => {
            commands::show_catalog(&config, json)?;
        }
        Commands::Import { csv, db } => {
            commands::run_import(&csv, &db)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config(&config)?,
            ConfigAction::Path => commands::config::show_path()?,
            ConfigAction::Example => commands::config::show_example()?,
            ConfigAction::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}
