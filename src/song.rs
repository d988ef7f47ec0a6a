//! Songs, their audio attributes, and the collections they are ordered in.

use crate::error::{Result, SegueError};
use crate::key;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Numeric audio attributes a song is compared on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Tempo,
    Key,
    Danceability,
    Energy,
    Loudness,
    Valence,
    Mode,
    TimeSignature,
}

impl Feature {
    /// Every attribute, in the order the service reports them.
    pub const ALL: [Feature; 8] = [
        Feature::Tempo,
        Feature::Key,
        Feature::Danceability,
        Feature::Energy,
        Feature::Loudness,
        Feature::Valence,
        Feature::Mode,
        Feature::TimeSignature,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Feature::Tempo => "tempo",
            Feature::Key => "key",
            Feature::Danceability => "danceability",
            Feature::Energy => "energy",
            Feature::Loudness => "loudness",
            Feature::Valence => "valence",
            Feature::Mode => "mode",
            Feature::TimeSignature => "time_signature",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A song inside a working collection.
///
/// Display fields travel with the song untouched; only `features` take part
/// in scoring. The key attribute is already in its unified numeric form.
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub features: BTreeMap<Feature, f64>,
}

impl Song {
    /// Song with display fields and no attributes yet.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: String::new(),
            album: String::new(),
            features: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter, handy for fixtures.
    #[must_use]
    pub fn with_feature(mut self, feature: Feature, value: f64) -> Self {
        self.features.insert(feature, value);
        self
    }

    /// Value of `feature`, or `MissingAttribute` naming this song.
    pub fn feature(&self, feature: Feature) -> Result<f64> {
        self.features
            .get(&feature)
            .copied()
            .ok_or_else(|| SegueError::MissingAttribute {
                song_id: self.id.clone(),
                attribute: feature,
            })
    }
}

/// One raw row of a playlist export.
///
/// Attributes are nullable here because the service returns `null` for
/// tracks it could not analyse; they become mandatory once the row is turned
/// into a [`Song`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackRow {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub tempo: Option<f64>,
    /// Service pitch-class code, 0 = C ... 11 = B.
    #[serde(default)]
    pub key: Option<i64>,
    #[serde(default)]
    pub danceability: Option<f64>,
    #[serde(default)]
    pub energy: Option<f64>,
    #[serde(default)]
    pub loudness: Option<f64>,
    #[serde(default)]
    pub valence: Option<f64>,
    #[serde(default)]
    pub mode: Option<f64>,
    #[serde(default)]
    pub time_signature: Option<f64>,
}

impl TrackRow {
    fn raw_value(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::Tempo => self.tempo,
            // Encoded separately in `to_song`.
            Feature::Key => None,
            Feature::Danceability => self.danceability,
            Feature::Energy => self.energy,
            Feature::Loudness => self.loudness,
            Feature::Valence => self.valence,
            Feature::Mode => self.mode,
            Feature::TimeSignature => self.time_signature,
        }
    }

    /// Converts the row into a [`Song`], encoding the key on the way.
    ///
    /// # Errors
    ///
    /// `MissingAttribute` for a null attribute, `InvalidTrack` wrapping
    /// `OutOfRange` for a key code the encoder rejects.
    pub fn to_song(&self) -> Result<Song> {
        let mut song = Song {
            id: self.id.clone(),
            title: self.name.clone(),
            artist: self.artist.clone(),
            album: self.album.clone(),
            features: BTreeMap::new(),
        };

        for feature in Feature::ALL {
            let value = if feature == Feature::Key {
                let code = self.key.ok_or_else(|| SegueError::MissingAttribute {
                    song_id: self.id.clone(),
                    attribute: Feature::Key,
                })?;
                key::encode(code).map_err(|source| SegueError::InvalidTrack {
                    song_id: self.id.clone(),
                    source: Box::new(source),
                })?
            } else {
                self.raw_value(feature)
                    .ok_or_else(|| SegueError::MissingAttribute {
                        song_id: self.id.clone(),
                        attribute: feature,
                    })?
            };
            song.features.insert(feature, value);
        }

        log::trace!("Converted track `{}' into a song.", self.id);
        Ok(song)
    }
}

/// Ordered songs with unique identifiers.
///
/// Standardization statistics are computed per collection, so the same song
/// gets different standardized values in different collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    songs: Vec<Song>,
}

impl Collection {
    /// # Errors
    ///
    /// `DuplicateId` if two songs share an identifier.
    pub fn new(songs: Vec<Song>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(songs.len());
        for song in &songs {
            if !seen.insert(song.id.as_str()) {
                return Err(SegueError::DuplicateId(song.id.clone()));
            }
        }
        Ok(Self { songs })
    }

    /// Builds a collection from raw export rows.
    pub fn from_rows(rows: &[TrackRow]) -> Result<Self> {
        let songs = rows.iter().map(TrackRow::to_song).collect::<Result<Vec<_>>>()?;
        Self::new(songs)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    #[must_use]
    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub(crate) fn songs_mut(&mut self) -> &mut [Song] {
        &mut self.songs
    }

    /// Position of the song with identifier `id`.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.songs.iter().position(|song| song.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.songs.iter().map(|song| song.id.as_str())
    }

    /// Checks that every song carries every attribute in `features`.
    ///
    /// # Errors
    ///
    /// The first `MissingAttribute` found, in collection order.
    pub fn require(&self, features: &[Feature]) -> Result<()> {
        for song in &self.songs {
            for &feature in features {
                song.feature(feature)?;
            }
        }
        Ok(())
    }
}
