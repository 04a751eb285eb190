//! Match feature extraction CLI
//!
//! Extracts win-prediction features from match and timeline JSON files.

use clap::{Parser, Subcommand};
use lolwinner::{Config, Result};

#[derive(Parser)]
#[command(name = "lolwinner")]
#[command(about = "Feature extraction from MOBA match timelines", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract features for a single match (prints JSON)
    Extract {
        /// Timeline file; the match file is found by naming convention
        timeline: String,
    },
    /// Extract a directory of matches and write padded tensors as JSON
    Tensorize {
        /// Directory of match/timeline pairs (defaults to data.match_dir)
        #[arg(long)]
        dir: Option<String>,
        /// Output file (defaults to data.output_path)
        #[arg(long)]
        output: Option<String>,
        /// Rescale per-frame features to the configured range
        #[arg(long)]
        rescale: bool,
    },
    /// Run a directory of matches through the burn data loader
    Batches {
        /// Directory of match/timeline pairs (defaults to data.match_dir)
        #[arg(long)]
        dir: Option<String>,
        /// Matches per batch
        #[arg(long, default_value = "32")]
        batch_size: usize,
    },
    /// Summarize the matches in a directory
    Inspect {
        /// Directory of match/timeline pairs (defaults to data.match_dir)
        #[arg(long)]
        dir: Option<String>,
    },
    /// Write a default config file
    Init,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Extract { timeline } => commands::extract(&config, &timeline),
        Commands::Tensorize {
            dir,
            output,
            rescale,
        } => commands::tensorize(&config, dir, output, rescale),
        Commands::Batches { dir, batch_size } => commands::batches(&config, dir, batch_size),
        Commands::Inspect { dir } => commands::inspect(&config, dir),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use burn::backend::NdArray;
    use lolwinner::data::{load_match_pair, MatchCorpus};
    use lolwinner::FeatureError;
    use lolwinner::features::{extract as extract_features, FeatureKey, FeatureValue};
    use std::path::Path;

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all(&config.data.match_dir)?;
        println!("Created {}/", config.data.match_dir);

        println!("\nNext steps:");
        println!("  1. Copy *_match.json / *_timeline.json pairs into {}", config.data.match_dir);
        println!("  2. Run 'lolwinner inspect' to check which matches are usable");
        println!("  3. Run 'lolwinner tensorize' to write padded features");
        println!("  4. Run 'lolwinner batches' to check the burn data loader");

        Ok(())
    }

    pub fn extract(config: &Config, timeline: &str) -> Result<()> {
        let (record, timeline) = load_match_pair(Path::new(timeline))?;

        match extract_features(&record, &timeline, &config.extraction) {
            Some(features) => {
                println!("{}", serde_json::to_string_pretty(&features)?);
            }
            None => {
                println!("Match {} skipped (run with --verbose for the reason)", record.game_id);
            }
        }

        Ok(())
    }

    pub fn tensorize(
        config: &Config,
        dir: Option<String>,
        output: Option<String>,
        rescale: bool,
    ) -> Result<()> {
        let dir = dir.unwrap_or_else(|| config.data.match_dir.clone());
        let output = output.unwrap_or_else(|| config.data.output_path.clone());

        let corpus = MatchCorpus::load_dir(Path::new(&dir), &config.extraction)?;
        let mut tensors = corpus.tensorize(config)?;
        if rescale {
            tensors = tensors.rescaled(&config.tensor)?;
        }

        println!(
            "Kept {} matches, skipped {}",
            corpus.matches().len(),
            corpus.skipped.total()
        );
        println!(
            "Tensorized {} matches, padded to {} frames",
            tensors.num_matches, tensors.max_frames
        );
        for (key, tensor) in &tensors.tensors {
            println!("  {:<18} {:?}", key.as_str(), tensor.shape());
        }

        if let Some(parent) = Path::new(&output).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&output, serde_json::to_string(&tensors)?)?;
        println!("Wrote {}", output);

        Ok(())
    }

    pub fn batches(config: &Config, dir: Option<String>, batch_size: usize) -> Result<()> {
        let dir = dir.unwrap_or_else(|| config.data.match_dir.clone());
        let corpus = MatchCorpus::load_dir(Path::new(&dir), &config.extraction)?;
        if corpus.matches().is_empty() {
            return Err(FeatureError::EmptyCorpus);
        }

        let loader = corpus.dataloader::<NdArray<f32>>(batch_size.max(1), Default::default());
        for (i, batch) in loader.iter().enumerate() {
            let [matches, frames, _] = batch.kills.dims();
            let blue_wins = batch
                .winners
                .to_data()
                .iter::<f32>()
                .filter(|&w| w == 0.0)
                .count();
            println!(
                "Batch {:>3}: {:>4} matches, {:>3} frames, {} won by team 0",
                i + 1,
                matches,
                frames,
                blue_wins
            );
        }

        Ok(())
    }

    pub fn inspect(config: &Config, dir: Option<String>) -> Result<()> {
        let dir = dir.unwrap_or_else(|| config.data.match_dir.clone());
        let corpus = MatchCorpus::load_dir(Path::new(&dir), &config.extraction)?;

        println!(
            "{:>14} {:>8} {:>8} {:>8} {:>12}",
            "Match", "Frames", "Winners", "Kills", "Version"
        );
        println!("{}", "-".repeat(54));

        for features in corpus.matches() {
            let match_id = features
                .get(FeatureKey::MatchIds)
                .and_then(FeatureValue::as_int)
                .unwrap_or_default();
            let kills = features
                .get(FeatureKey::Kills)
                .and_then(FeatureValue::as_series)
                .map(|k| k.column(0).sum() + k.column(1).sum())
                .unwrap_or_default();
            let version = match features.get(FeatureKey::Versions) {
                Some(FeatureValue::Text(v)) => v.as_str(),
                _ => "-",
            };
            println!(
                "{:>14} {:>8} {:>8} {:>8} {:>12}",
                match_id,
                features.num_frames().unwrap_or_default(),
                features.winner().unwrap_or_default(),
                kills,
                version
            );
        }

        let skipped = corpus.skipped;
        println!(
            "\n{} usable, {} skipped ({} invalid, {} malformed, {} unreadable)",
            corpus.matches().len(),
            skipped.total(),
            skipped.invalid,
            skipped.malformed,
            skipped.unreadable
        );

        Ok(())
    }
}
