use anyhow::Result;
use connoisseur_core::model::{Dimension, DimensionRange};

use crate::commands::matching::load_engine;
use crate::config::Config;

pub fn show_catalog(config: &Config, json: bool) -> Result<()> {
    let engine = load_engine(config)?;
    let stats = engine.catalog().stats();

    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
        return Ok(());
    }

    println!("\n📊 Connoisseur Catalog\n");
    println!("  Source: {}", config.catalog_path.display());
    println!("  Feature schema: v{}", stats.schema_version);
    println!("  Source rows: {}", stats.source_rows);
    println!(
        "  Dropped (popularity <= {}): {}",
        stats.options.min_popularity, stats.below_threshold
    );
    if stats.options.dedupe_track_ids {
        println!("  Dropped (duplicate track id): {}", stats.duplicates);
    }
    println!("  Matchable tracks: {}", stats.rows);

    println!("\n  {:<18} {:>10} {:>10}  range", "feature", "mean", "std dev");
    for dimension in Dimension::ALL {
        let range = match dimension.range() {
            DimensionRange::Unit => "0.0-1.0",
            DimensionRange::Bpm => "BPM",
        };
        println!(
            "  {:<18} {:>10.4} {:>10.4}  {}",
            dimension.name(),
            stats.params.mean_of(dimension),
            stats.params.std_dev_of(dimension),
            range
        );
    }

    Ok(())
}
