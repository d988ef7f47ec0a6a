//! # Tour Construction
//!
//! Turns an unordered collection into a listening order. Every ordered pair
//! of songs is scored up front, then a greedy nearest-neighbour walk starts
//! from an explicitly chosen song and repeatedly moves to the best unvisited
//! neighbour until every song has been placed once.
//!
//! The walk is a heuristic: it never backtracks, so the result is a good
//! local ordering rather than an optimal one.
//!
//! ```
//! use segue::song::{Collection, Feature, Song};
//! use segue::tour::{reorder, StartPolicy, TourBuilder};
//! use segue::algorithm::ScoringContext;
//!
//! let song = |id: &str, level: f64| {
//!     Feature::ALL
//!         .iter()
//!         .fold(Song::new(id, id), |song, &feature| song.with_feature(feature, level))
//! };
//! let collection = Collection::new(vec![song("a", 0.0), song("far", 9.0), song("b", 0.1)])?;
//!
//! let builder = TourBuilder::new(ScoringContext::default())
//!     .with_start(StartPolicy::Song("a".to_string()));
//! let tour = reorder(&collection, &builder)?;
//!
//! assert_eq!(tour.ids(), ["a", "b", "far"]);
//! # Ok::<(), segue::SegueError>(())
//! ```

use crate::algorithm::{self, ScoringContext};
use crate::error::{Result, SegueError};
use crate::song::Collection;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seed used when no start song is given, so repeated runs agree.
pub const DEFAULT_SEED: u64 = 1;

/// How the first song of the tour is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartPolicy {
    /// Position in the collection.
    Index(usize),
    /// Song identifier.
    Song(String),
    /// Position drawn from a generator seeded with this value.
    Seeded(u64),
}

impl Default for StartPolicy {
    fn default() -> Self {
        Self::Seeded(DEFAULT_SEED)
    }
}

impl StartPolicy {
    /// Position of the start song in `collection`.
    ///
    /// # Errors
    ///
    /// `EmptyInput`, `UnknownStartSong` or `StartIndexOutOfRange`.
    pub fn resolve(&self, collection: &Collection) -> Result<usize> {
        if collection.is_empty() {
            return Err(SegueError::EmptyInput);
        }

        match self {
            Self::Index(index) if *index < collection.len() => Ok(*index),
            Self::Index(index) => Err(SegueError::StartIndexOutOfRange {
                index: *index,
                len: collection.len(),
            }),
            Self::Song(id) => collection
                .position(id)
                .ok_or_else(|| SegueError::UnknownStartSong(id.clone())),
            Self::Seeded(seed) => Ok(StdRng::seed_from_u64(*seed).gen_range(0..collection.len())),
        }
    }
}

/// Which transition counts as the best next step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// Move to the unvisited song with the highest similarity.
    #[default]
    MostSimilar,
    /// Move to the unvisited song with the lowest similarity score.
    ///
    /// Reproduces the ordering of earlier releases, which sorted transitions
    /// ascending even though a higher score means more alike.
    LowestScore,
}

impl Direction {
    /// Whether `candidate` should replace the current `best`. Strict, so
    /// ties keep the earlier song.
    fn prefers(self, candidate: f64, best: f64) -> bool {
        match self {
            Self::MostSimilar => candidate > best,
            Self::LowestScore => candidate < best,
        }
    }
}

/// Similarity of every ordered pair of songs in one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix {
    len: usize,
    scores: Vec<f64>,
}

impl TransitionMatrix {
    /// Scores all `n * (n - 1)` ordered pairs. The diagonal holds `1.0` and
    /// is never consulted.
    pub fn compute(collection: &Collection, context: &ScoringContext) -> Result<Self> {
        let songs = collection.songs();
        let len = songs.len();
        let mut scores = vec![1.0; len * len];

        for (i, from) in songs.iter().enumerate() {
            for (j, to) in songs.iter().enumerate() {
                if i != j {
                    scores[i * len + j] = context.score(from, to)?;
                }
            }
        }

        log::debug!("Computed {} transition scores.", len * len.saturating_sub(1));
        Ok(Self { len, scores })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Score of moving from song `from` to song `to`, by position.
    ///
    /// # Panics
    ///
    /// If either position is out of bounds.
    #[must_use]
    pub fn score(&self, from: usize, to: usize) -> f64 {
        assert!(from < self.len && to < self.len, "transition ({from}, {to}) out of bounds");
        self.scores[from * self.len + to]
    }
}

/// A visiting order over a whole collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tour {
    ids: Vec<String>,
    step_scores: Vec<f64>,
}

impl Tour {
    /// Song identifiers in play order.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Score of each transition taken, one fewer than the number of songs.
    #[must_use]
    pub fn step_scores(&self) -> &[f64] {
        &self.step_scores
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Average transition score, `None` for tours without transitions.
    #[must_use]
    pub fn mean_step_score(&self) -> Option<f64> {
        if self.step_scores.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = self.step_scores.iter().sum::<f64>() / self.step_scores.len() as f64;
        Some(mean)
    }

    /// True when the tour visits every song of `collection` exactly once.
    #[must_use]
    pub fn is_permutation_of(&self, collection: &Collection) -> bool {
        let mut tour_ids: Vec<&str> = self.ids.iter().map(String::as_str).collect();
        let mut collection_ids: Vec<&str> = collection.ids().collect();
        tour_ids.sort_unstable();
        collection_ids.sort_unstable();
        tour_ids == collection_ids
    }
}

/// Greedy nearest-neighbour tour construction.
#[derive(Debug, Clone, Default)]
pub struct TourBuilder {
    context: ScoringContext,
    start: StartPolicy,
    direction: Direction,
}

impl TourBuilder {
    #[must_use]
    pub fn new(context: ScoringContext) -> Self {
        Self {
            context,
            start: StartPolicy::default(),
            direction: Direction::default(),
        }
    }

    #[must_use]
    pub fn with_start(mut self, start: StartPolicy) -> Self {
        self.start = start;
        self
    }

    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn context(&self) -> &ScoringContext {
        &self.context
    }

    #[must_use]
    pub fn start(&self) -> &StartPolicy {
        &self.start
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Builds a tour over an already standardized collection.
    ///
    /// All input checks run before any scoring. A single song yields the
    /// trivial tour without computing any score.
    ///
    /// # Errors
    ///
    /// `EmptyInput`, `MissingAttribute` for a song lacking a weighted
    /// attribute, or a start policy that does not resolve.
    pub fn build(&self, collection: &Collection) -> Result<Tour> {
        if collection.is_empty() {
            return Err(SegueError::EmptyInput);
        }
        collection.require(&self.context.weights.features())?;
        let start = self.start.resolve(collection)?;

        let songs = collection.songs();
        if songs.len() == 1 {
            return Ok(Tour {
                ids: vec![songs[0].id.clone()],
                step_scores: Vec::new(),
            });
        }

        let matrix = TransitionMatrix::compute(collection, &self.context)?;
        log::debug!(
            "Building {:?} tour over {} songs from `{}'.",
            self.direction,
            songs.len(),
            songs[start].id
        );

        let mut visited = vec![false; songs.len()];
        let mut order = Vec::with_capacity(songs.len());
        let mut step_scores = Vec::with_capacity(songs.len() - 1);
        let mut current = start;
        visited[current] = true;
        order.push(current);

        for _ in 1..songs.len() {
            let best = (0..songs.len())
                .filter(|&candidate| !visited[candidate])
                .map(|candidate| (candidate, matrix.score(current, candidate)))
                .fold(None, |best: Option<(usize, f64)>, (candidate, score)| match best {
                    Some((_, best_score)) if !self.direction.prefers(score, best_score) => best,
                    _ => Some((candidate, score)),
                });

            let Some((next, score)) = best else {
                unreachable!("{} of {} songs placed but none left unvisited", order.len(), songs.len());
            };

            log::trace!(
                "Step {}: `{}' -> `{}' ({score:.4})",
                order.len(),
                songs[current].id,
                songs[next].id
            );
            visited[next] = true;
            order.push(next);
            step_scores.push(score);
            current = next;
        }

        Ok(Tour {
            ids: order.into_iter().map(|index| songs[index].id.clone()).collect(),
            step_scores,
        })
    }
}

/// Standardizes a copy of `collection` over the weighted attributes and
/// builds its tour. The caller's collection keeps its raw values.
pub fn reorder(collection: &Collection, builder: &TourBuilder) -> Result<Tour> {
    if collection.is_empty() {
        return Err(SegueError::EmptyInput);
    }
    let features = builder.context().weights.features();
    let standardized = algorithm::standardize(collection, &features)?;
    builder.build(&standardized)
}
