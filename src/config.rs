//! # Configuration Module
//!
//! Resolves the feature weights and bundles the per-run settings.
//!
//! ## Weights file
//!
//! Weights are read from a JSON object mapping attribute names to values in
//! `0.0..=1.0`, e.g. `{ "tempo": 0.9, "valence": 0.85 }`. Attributes left out
//! are not scored. Lookup order:
//!
//! 1. `--weights <FILE>` or the `SEGUE_WEIGHTS` environment variable
//! 2. the platform configuration directory:
//!    - Linux: `~/.config/segue/weights.json`
//!    - macOS: `~/Library/Application Support/segue/weights.json`
//!    - Windows: `%APPDATA%\segue\weights.json`
//! 3. built-in defaults

use crate::algorithm::{FeatureWeights, ScoringContext};
use crate::tour::{Direction, StartPolicy, TourBuilder};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a weights file.
pub const WEIGHTS_ENV: &str = "SEGUE_WEIGHTS";

/// Returns the platform-appropriate location of the user weights file.
///
/// The file is optional, so nothing is created here.
///
/// # Errors
///
/// Returns an error if the system configuration directory cannot be
/// determined.
pub fn get_weights_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system configuration directory. Pass --weights to point at a weights file."
        )
    })?;

    Ok(config_dir.join("segue").join("weights.json"))
}

/// Reads and validates a weights file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSON, names an
/// unknown attribute, or holds a weight outside `0.0..=1.0`.
pub fn load_weights(path: &Path) -> Result<FeatureWeights> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read weights file {}", path.display()))?;
    let weights: FeatureWeights = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid weights file {}", path.display()))?;

    if weights.is_empty() {
        log::warn!("Weights file {} scores no attributes; every transition will tie.", path.display());
    }
    Ok(weights)
}

/// Effective weights: an explicit file, else the user file if present,
/// else the defaults.
pub fn resolve_weights(explicit: Option<&Path>) -> Result<FeatureWeights> {
    if let Some(path) = explicit {
        log::debug!("Using weights from {}", path.display());
        return load_weights(path);
    }

    match get_weights_path() {
        Ok(path) if path.is_file() => {
            log::debug!("Using weights from {}", path.display());
            load_weights(&path)
        }
        _ => {
            log::debug!("Using built-in weights");
            Ok(FeatureWeights::default())
        }
    }
}

/// Settings for one invocation.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub weights: FeatureWeights,
    pub start: StartPolicy,
    pub direction: Direction,
    /// Directory for mixed playlists; next to each input when unset.
    pub output_dir: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Configuration with the given weights and default ordering options.
    #[must_use]
    pub fn with_weights(weights: FeatureWeights) -> Self {
        Self {
            weights,
            ..Self::default()
        }
    }

    /// Tour builder reflecting these settings.
    #[must_use]
    pub fn tour_builder(&self) -> TourBuilder {
        TourBuilder::new(ScoringContext::new(self.weights.clone()))
            .with_start(self.start.clone())
            .with_direction(self.direction)
    }
}
