//! # Segue - Smooth Playlist Reordering
//!
//! Segue takes an exported streaming playlist and reorders it so that
//! neighbouring tracks sound alike, then writes the result as a new
//! "Mixed: ..." playlist.
//!
//! ## Usage
//!
//! ```bash
//! # Mix one playlist, writing road_trip.mixed.json next to it
//! segue reorder road_trip.json
//!
//! # Mix several exports in parallel into another directory
//! segue reorder exports/*.json --output-dir mixed/
//!
//! # Inspect what the weights will be working with
//! segue stats road_trip.json
//! ```

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser};
use log::{info, warn};
use rayon::prelude::*;
use segue::algorithm::statistics;
use segue::config::{self, RuntimeConfig};
use segue::playlist::{self, JsonPlaylistFile, MixedPlaylist, PlaylistSink, PlaylistSource};
use segue::song::Collection;
use segue::tour::Direction;
use segue::{cli, completion};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Mixes one exported playlist and writes the result to `output`.
fn mix_file(input: &Path, output: PathBuf, config: &RuntimeConfig) -> Result<(MixedPlaylist, PathBuf)> {
    let source = JsonPlaylistFile::new(input);
    let playlist = source.fetch()?;

    let mixed = playlist::mix(&playlist, &config.tour_builder())
        .with_context(|| format!("Failed to reorder '{}' from {}", playlist.name, input.display()))?;
    anyhow::ensure!(
        mixed.tracks.len() == playlist.tracks.len(),
        "Reordered playlist has {} tracks but '{}' has {}",
        mixed.tracks.len(),
        playlist.name,
        playlist.tracks.len()
    );

    JsonPlaylistFile::new(&output).publish(&mixed)?;
    Ok((mixed, output))
}

/// Pairs every input with its output path. Inputs that would write the same
/// output file get an error instead, so no run overwrites another.
fn plan_outputs<'a>(inputs: &'a [PathBuf], output_dir: Option<&Path>) -> Vec<(&'a PathBuf, Result<PathBuf>)> {
    let outputs: Vec<PathBuf> = inputs
        .iter()
        .map(|input| playlist::output_path(input, output_dir))
        .collect();

    let mut claims: HashMap<&Path, usize> = HashMap::new();
    for output in &outputs {
        *claims.entry(output.as_path()).or_default() += 1;
    }

    inputs
        .iter()
        .zip(&outputs)
        .map(|(input, output)| {
            let planned = if claims[output.as_path()] > 1 {
                Err(anyhow!(
                    "{} and another input would both be written to {}",
                    input.display(),
                    output.display()
                ))
            } else {
                Ok(output.clone())
            };
            (input, planned)
        })
        .collect()
}

fn print_mixed(mixed: &MixedPlaylist) {
    println!("{}", mixed.name);
    for (i, track) in mixed.tracks.iter().enumerate() {
        match track.transition_score {
            Some(score) => println!("  {:>3}. {} - {} (score: {score:.3})", i + 1, track.artist, track.name),
            None => println!("  {:>3}. {} - {}", i + 1, track.artist, track.name),
        }
    }
    if let Some(mean) = mixed.mean_transition_score {
        println!("  mean transition score: {mean:.3}");
    }
}

/// Runs every input independently; one bad playlist does not stop the rest.
fn run_reorder(inputs: &[PathBuf], config: &RuntimeConfig, verbose: bool) -> Result<()> {
    let results: Vec<(&PathBuf, Result<(MixedPlaylist, PathBuf)>)> = plan_outputs(inputs, config.output_dir.as_deref())
        .into_par_iter()
        .map(|(input, output)| (input, output.and_then(|output| mix_file(input, output, config))))
        .collect();

    let mut failures = 0;
    for (input, result) in results {
        match result {
            Ok((mixed, output)) => {
                info!("Mixed {} into {}", input.display(), output.display());
                if verbose {
                    print_mixed(&mixed);
                }
                println!("Playlist '{}' ({} tracks) written to {}", mixed.name, mixed.tracks.len(), output.display());
            }
            Err(e) => {
                failures += 1;
                warn!("Skipping {}: {e:#}", input.display());
                eprintln!("Error: {e:#}");
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} playlists could not be reordered", inputs.len());
    }
    Ok(())
}

fn run_stats(input: &Path, config: &RuntimeConfig) -> Result<()> {
    let playlist = JsonPlaylistFile::new(input).fetch()?;
    let collection = Collection::from_rows(&playlist.tracks)
        .with_context(|| format!("Invalid tracks in {}", input.display()))?;
    let stats = statistics::analyze_collection(&collection, &config.weights.features())
        .with_context(|| format!("Cannot analyze '{}'", playlist.name))?;

    println!("{} ({} tracks)", playlist.name, collection.len());
    println!("  {:<16} {:>6} {:>10} {:>10} {:>10} {:>10}", "feature", "weight", "mean", "std", "min", "max");
    for (feature, stat) in stats {
        let weight = config.weights.get(feature).unwrap_or_default();
        let flag = if stat.is_constant() { "  (no spread)" } else { "" };
        println!(
            "  {:<16} {:>6.2} {:>10.3} {:>10.3} {:>10.3} {:>10.3}{flag}",
            feature.as_str(),
            weight,
            stat.mean,
            stat.std_deviation,
            stat.min,
            stat.max
        );
    }
    Ok(())
}

/// Main entry point for the Segue application.
///
/// # Logging
///
/// Initializes environment logger which can be controlled via `RUST_LOG`:
/// - `RUST_LOG=debug segue reorder playlist.json` - Enable debug logging
/// - `RUST_LOG=segue::tour=trace segue reorder playlist.json` - Every step of the walk
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    match args.command {
        cli::Command::Reorder { inputs, output_dir, start, legacy_order, verbose } => {
            let config = RuntimeConfig {
                start: start.policy(),
                direction: if legacy_order { Direction::LowestScore } else { Direction::MostSimilar },
                output_dir,
                ..RuntimeConfig::with_weights(config::resolve_weights(args.weights.as_deref())?)
            };
            info!("Reordering {} playlist(s) with {:?} start", inputs.len(), config.start);
            run_reorder(&inputs, &config, verbose)?;
        }
        cli::Command::Stats { input } => {
            let config = RuntimeConfig::with_weights(config::resolve_weights(args.weights.as_deref())?);
            run_stats(&input, &config)?;
        }
        cli::Command::Weights => {
            let weights = config::resolve_weights(args.weights.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&weights)?);
        }
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(shell), &mut cmd);
        }
    }

    Ok(())
}
