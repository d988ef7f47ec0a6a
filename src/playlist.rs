//! # Playlist Module
//!
//! Boundary between the reordering core and wherever playlists live. A
//! [`PlaylistSource`] hands over an exported playlist, [`mix`] reorders it,
//! and a [`PlaylistSink`] persists the result under a new name.
//!
//! The bundled implementation, [`JsonPlaylistFile`], reads and writes JSON
//! exports so the tool runs entirely offline:
//!
//! ```json
//! { "id": "37i9dQ", "name": "Road Trip",
//!   "tracks": [ { "id": "4uLU6hMC", "name": "Song", "artist": "Artist",
//!                 "album": "Album", "tempo": 118.2, "key": 5,
//!                 "danceability": 0.71, "energy": 0.64, "loudness": -6.1,
//!                 "valence": 0.52, "mode": 1, "time_signature": 4 } ] }
//! ```

use crate::error::SegueError;
use crate::song::{Collection, TrackRow};
use crate::tour::{self, TourBuilder};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Prefix given to every reordered playlist.
pub const MIXED_PREFIX: &str = "Mixed: ";

/// An exported playlist as delivered by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<TrackRow>,
}

/// A track in the reordered playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixedTrack {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    /// Similarity to the previous track; absent for the opener.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_score: Option<f64>,
}

/// The reordered playlist, ready to be published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixedPlaylist {
    pub name: String,
    pub source_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_transition_score: Option<f64>,
    pub tracks: Vec<MixedTrack>,
}

/// Where playlists come from.
pub trait PlaylistSource {
    /// Fetch the complete playlist, every page included.
    ///
    /// # Errors
    ///
    /// Returns an error if the playlist cannot be read or parsed.
    fn fetch(&self) -> Result<Playlist>;
}

/// Where mixed playlists go.
pub trait PlaylistSink {
    /// Persist `playlist` and return an identifier for the created copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the playlist cannot be written.
    fn publish(&self, playlist: &MixedPlaylist) -> Result<String>;
}

/// A playlist stored as a JSON file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPlaylistFile {
    path: PathBuf,
}

impl JsonPlaylistFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlaylistSource for JsonPlaylistFile {
    fn fetch(&self) -> Result<Playlist> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read playlist export {}", self.path.display()))?;
        let playlist: Playlist = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid playlist export {}", self.path.display()))?;

        log::debug!(
            "Loaded playlist '{}' with {} tracks from {}",
            playlist.name,
            playlist.tracks.len(),
            self.path.display()
        );
        Ok(playlist)
    }
}

impl PlaylistSink for JsonPlaylistFile {
    /// Writes through a temporary file in the target directory and renames
    /// it into place, so a failed run never leaves a truncated playlist.
    fn publish(&self, playlist: &MixedPlaylist) -> Result<String> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        let mut file = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        serde_json::to_writer_pretty(&mut file, playlist)
            .context("Failed to serialize mixed playlist")?;
        file.write_all(b"\n")?;
        file.persist(&self.path)
            .with_context(|| format!("Failed to write mixed playlist to {}", self.path.display()))?;

        log::info!("Published '{}' to {}", playlist.name, self.path.display());
        Ok(self.path.display().to_string())
    }
}

/// Name of the reordered copy of a playlist called `original`.
#[must_use]
pub fn mixed_name(original: &str) -> String {
    format!("{MIXED_PREFIX}{original}")
}

/// Default output location: `<stem>.mixed.json`, next to the input unless an
/// output directory is given.
#[must_use]
pub fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "playlist".to_string(), |stem| stem.to_string_lossy().into_owned());
    let file_name = format!("{stem}.mixed.json");

    match output_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}

/// Reorders `playlist` into its mixed copy.
///
/// # Errors
///
/// Any core error: `EmptyInput` for a playlist without tracks, and the
/// validation errors raised while building or touring the collection.
pub fn mix(playlist: &Playlist, builder: &TourBuilder) -> crate::Result<MixedPlaylist> {
    if playlist.tracks.is_empty() {
        return Err(SegueError::EmptyInput);
    }

    let collection = Collection::from_rows(&playlist.tracks)?;
    let tour = tour::reorder(&collection, builder)?;

    let rows: HashMap<&str, &TrackRow> = playlist
        .tracks
        .iter()
        .map(|row| (row.id.as_str(), row))
        .collect();

    let tracks = tour
        .ids()
        .iter()
        .enumerate()
        .filter_map(|(position, id)| {
            rows.get(id.as_str()).map(|row| MixedTrack {
                id: row.id.clone(),
                name: row.name.clone(),
                artist: row.artist.clone(),
                album: row.album.clone(),
                transition_score: position
                    .checked_sub(1)
                    .and_then(|step| tour.step_scores().get(step).copied()),
            })
        })
        .collect();

    Ok(MixedPlaylist {
        name: mixed_name(&playlist.name),
        source_id: playlist.id.clone(),
        mean_transition_score: tour.mean_step_score(),
        tracks,
    })
}
