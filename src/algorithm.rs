//! Feature standardization and pairwise similarity scoring.
//!
//! Raw audio attributes live on very different scales (tempo in BPM,
//! loudness in dB, danceability in 0..1). Before two songs are compared,
//! every weighted attribute is rescaled to a z-score over the collection,
//! and the similarity of a pair is derived from their weighted Euclidean
//! distance.

use crate::error::{Result, SegueError};
use crate::song::{Collection, Feature, Song};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Relative importance of each attribute when comparing songs (0.0 - 1.0).
///
/// A higher weight means the attribute should be more similar between
/// neighbouring songs. Attributes absent from the map are not scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Feature, f64>", into = "BTreeMap<Feature, f64>")]
pub struct FeatureWeights {
    weights: BTreeMap<Feature, f64>,
}

impl FeatureWeights {
    /// # Errors
    ///
    /// `InvalidWeight` for any weight outside `0.0..=1.0` or not finite.
    pub fn new(weights: BTreeMap<Feature, f64>) -> Result<Self> {
        if let Some((&feature, &weight)) = weights
            .iter()
            .find(|(_, weight)| !(0.0..=1.0).contains(*weight))
        {
            return Err(SegueError::InvalidWeight { feature, weight });
        }
        Ok(Self { weights })
    }

    /// Weighted attributes in a stable order.
    #[must_use]
    pub fn features(&self) -> Vec<Feature> {
        self.weights.keys().copied().collect()
    }

    #[must_use]
    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.weights.get(&feature).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.weights.iter().map(|(&feature, &weight)| (feature, weight))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            weights: BTreeMap::from([
                (Feature::Tempo, 0.90),
                (Feature::Key, 0.45),
                (Feature::Danceability, 0.65),
                (Feature::Energy, 0.60),
                (Feature::Loudness, 0.35),
                (Feature::Valence, 0.85),
                (Feature::Mode, 0.10),
                (Feature::TimeSignature, 0.15),
            ]),
        }
    }
}

impl TryFrom<BTreeMap<Feature, f64>> for FeatureWeights {
    type Error = SegueError;

    fn try_from(weights: BTreeMap<Feature, f64>) -> Result<Self> {
        Self::new(weights)
    }
}

impl From<FeatureWeights> for BTreeMap<Feature, f64> {
    fn from(weights: FeatureWeights) -> Self {
        weights.weights
    }
}

/// Scoring parameters for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringContext {
    pub weights: FeatureWeights,
}

impl ScoringContext {
    #[must_use]
    pub fn new(weights: FeatureWeights) -> Self {
        Self { weights }
    }

    /// Shorthand for [`similarity`] with this context's weights.
    pub fn score(&self, from: &Song, to: &Song) -> Result<f64> {
        similarity(from, to, &self.weights)
    }
}

/// Rewrites every attribute in `features` as a z-score over `collection`.
///
/// Uses population statistics. An attribute with zero spread (every song
/// holds the same value) becomes `0.0` for every song instead of dividing by
/// zero. Returns a new collection; the input keeps its raw values.
///
/// # Errors
///
/// `EmptyInput` for an empty collection, `MissingAttribute` if any song
/// lacks one of `features`. Nothing is rewritten when an error is returned.
pub fn standardize(collection: &Collection, features: &[Feature]) -> Result<Collection> {
    let features: BTreeSet<Feature> = features.iter().copied().collect();
    let stats = features
        .iter()
        .map(|&feature| statistics::analyze_feature(collection, feature).map(|s| (feature, s)))
        .collect::<Result<Vec<_>>>()?;

    let mut standardized = collection.clone();
    for (feature, stat) in &stats {
        let constant = stat.is_constant();
        if constant {
            log::debug!("Feature `{feature}' has no spread, standardizing to zero.");
        }

        for song in standardized.songs_mut() {
            let value = song.feature(*feature)?;
            let z = if constant {
                0.0
            } else {
                (value - stat.mean) / stat.std_deviation
            };
            song.features.insert(*feature, z);
        }
    }

    log::debug!(
        "Standardized {} features over {} songs.",
        features.len(),
        standardized.len()
    );
    Ok(standardized)
}

/// `sqrt(sum(weight * (a - b)^2))` over the weighted attributes.
pub fn weighted_distance(a: &Song, b: &Song, weights: &FeatureWeights) -> Result<f64> {
    let sum = weights.iter().try_fold(0.0, |acc, (feature, weight)| {
        let delta = a.feature(feature)? - b.feature(feature)?;
        Ok::<f64, SegueError>(acc + weight * delta * delta)
    })?;
    Ok(sum.sqrt())
}

/// Similarity of two standardized songs, `1 / (1 + weighted_distance)`.
///
/// The result lies in `(0, 1]`; higher means more alike and exactly `1.0`
/// means identical on every weighted attribute. Both songs must already be
/// standardized over the same collection. Raw values are accepted silently
/// but make tempo and loudness dominate the score.
///
/// # Errors
///
/// `MissingAttribute` if either song lacks a weighted attribute.
///
/// # Examples
///
/// ```
/// use segue::algorithm::{similarity, FeatureWeights};
/// use segue::song::{Feature, Song};
///
/// let weights = FeatureWeights::default();
/// let song = Feature::ALL
///     .iter()
///     .fold(Song::new("a", "A"), |song, &feature| song.with_feature(feature, 0.5));
///
/// assert_eq!(similarity(&song, &song, &weights)?, 1.0);
/// # Ok::<(), segue::SegueError>(())
/// ```
pub fn similarity(a: &Song, b: &Song, weights: &FeatureWeights) -> Result<f64> {
    let distance = weighted_distance(a, b, weights)?;
    Ok(1.0 / (1.0 + distance))
}

/// Per-attribute statistics over a collection.
pub mod statistics {
    use super::*;

    /// Population statistics of one attribute.
    #[derive(Debug, Clone, PartialEq)]
    pub struct FeatureStatistics {
        pub mean: f64,
        pub variance: f64,
        pub std_deviation: f64,
        pub min: f64,
        pub max: f64,
        pub count: usize,
    }

    impl FeatureStatistics {
        /// True when every value is the same, or the spread underflows to
        /// zero and cannot be divided by.
        #[must_use]
        #[allow(clippy::float_cmp)]
        pub fn is_constant(&self) -> bool {
            self.min == self.max || self.std_deviation == 0.0
        }
    }

    /// Statistics of `feature` across every song in `collection`.
    ///
    /// # Errors
    ///
    /// `EmptyInput` for an empty collection, `MissingAttribute` if a song
    /// lacks the attribute.
    pub fn analyze_feature(collection: &Collection, feature: Feature) -> Result<FeatureStatistics> {
        if collection.is_empty() {
            return Err(SegueError::EmptyInput);
        }

        let values = collection
            .songs()
            .iter()
            .map(|song| song.feature(feature))
            .collect::<Result<Vec<f64>>>()?;

        #[allow(clippy::cast_precision_loss)]
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        #[allow(clippy::cast_precision_loss)]
        let variance = values
            .iter()
            .map(|&value| (value - mean).powi(2))
            .sum::<f64>() / values.len() as f64;

        Ok(FeatureStatistics {
            mean,
            variance,
            std_deviation: variance.sqrt(),
            min: values.iter().fold(f64::INFINITY, |a, &b| a.min(b)),
            max: values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
            count: values.len(),
        })
    }

    /// Statistics for each of `features`, in the given order.
    pub fn analyze_collection(
        collection: &Collection,
        features: &[Feature],
    ) -> Result<Vec<(Feature, FeatureStatistics)>> {
        features
            .iter()
            .map(|&feature| analyze_feature(collection, feature).map(|stats| (feature, stats)))
            .collect()
    }
}
