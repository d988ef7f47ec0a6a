//! # Command-Line Interface Module
//!
//! Clap definitions for the `segue` binary.
//!
//! ## Commands
//!
//! - `reorder`: Mix one or more exported playlists into smooth listening order
//! - `stats`: Show per-attribute statistics of a playlist
//! - `weights`: Print the effective feature weights
//! - `completion`: Generate shell completions
//!
//! ## Examples
//!
//! ```bash
//! segue reorder road_trip.json
//! segue reorder exports/*.json --output-dir mixed/ --seed 7
//! segue reorder road_trip.json --start 4uLU6hMCjMI75M1A2tKUQC --verbose
//! ```

use crate::config::WEIGHTS_ENV;
use crate::tour::StartPolicy;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "segue")]
#[command(about = "Segue: reorder playlists so every track flows into the next")]
#[command(version)]
pub struct Args {
    /// JSON file with feature weights
    ///
    /// Overrides the weights file in the user configuration directory.
    /// Attributes missing from the file are left out of scoring.
    #[arg(long, global = true, env = WEIGHTS_ENV, value_name = "FILE")]
    pub weights: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reorder playlists for a smooth flow and write mixed copies
    ///
    /// Every track is compared with every other on tempo, key, danceability,
    /// energy, loudness, valence, mode and time signature. Starting from one
    /// song, the next track is always the most similar one not yet played.
    /// Each input is written to `<name>.mixed.json`.
    Reorder {
        /// Exported playlist files (JSON)
        #[arg(required = true, value_hint = clap::ValueHint::FilePath)]
        inputs: Vec<PathBuf>,

        /// Directory for the mixed playlists (defaults to next to each input)
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        start: StartArgs,

        /// Pick the lowest-scoring transition at each step, as earlier
        /// releases did
        #[arg(long)]
        legacy_order: bool,

        /// Print the resulting order with transition scores
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show per-attribute statistics for a playlist
    ///
    /// Prints mean, standard deviation and range of every weighted attribute
    /// before standardization. Attributes with no spread are flagged, since
    /// they do not influence the order.
    Stats {
        /// Exported playlist file (JSON)
        #[arg(value_hint = clap::ValueHint::FilePath)]
        input: PathBuf,
    },

    /// Print the effective feature weights as JSON
    Weights,

    /// Generate shell completions
    ///
    /// Usage: segue completion bash > ~/.local/share/bash-completion/completions/segue
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Start-song selection. At most one may be given; a fixed seed is used
/// otherwise so runs are reproducible.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
#[group(multiple = false)]
pub struct StartArgs {
    /// Identifier of the song to start from
    #[arg(long, value_name = "ID")]
    pub start: Option<String>,

    /// Position (0-based) of the song to start from
    #[arg(long, value_name = "N")]
    pub start_index: Option<usize>,

    /// Seed for picking the start song
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,
}

impl StartArgs {
    #[must_use]
    pub fn policy(&self) -> StartPolicy {
        match (&self.start, self.start_index, self.seed) {
            (Some(id), _, _) => StartPolicy::Song(id.clone()),
            (None, Some(index), _) => StartPolicy::Index(index),
            (None, None, Some(seed)) => StartPolicy::Seeded(seed),
            (None, None, None) => StartPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_reorder_arguments() {
        let args = Args::parse_from([
            "segue", "reorder", "a.json", "b.json", "--start-index", "3", "--legacy-order", "-o", "out",
        ]);

        match args.command {
            Command::Reorder { inputs, output_dir, start, legacy_order, verbose } => {
                assert_eq!(inputs, [PathBuf::from("a.json"), PathBuf::from("b.json")]);
                assert_eq!(output_dir, Some(PathBuf::from("out")));
                assert_eq!(start.policy(), StartPolicy::Index(3));
                assert!(legacy_order);
                assert!(!verbose);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_start_options_are_exclusive() {
        let result = Args::try_parse_from(["segue", "reorder", "a.json", "--start", "x", "--seed", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_start_policy_is_seeded() {
        assert_eq!(StartArgs::default().policy(), StartPolicy::default());
        let seeded = StartArgs { seed: Some(5), ..StartArgs::default() };
        assert_eq!(seeded.policy(), StartPolicy::Seeded(5));
    }
}
