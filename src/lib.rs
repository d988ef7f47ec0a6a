//! Reorders playlists so that consecutive songs sound alike.
//!
//! Core modules:
//! - [`key`] - Pitch-class to numeric key encoding
//! - [`algorithm`] - Feature standardization and pairwise similarity
//! - [`tour`] - Greedy tour construction over a whole playlist
//! - [`song`] - Songs, raw track rows and collections
//!
//! ### Supporting Modules
//!
//! - [`playlist`] - Playlist sources and sinks (JSON exports)
//! - [`config`] - Weights file resolution and runtime settings
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//! - [`error`] - Error type of the reordering core
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use segue::playlist::{self, JsonPlaylistFile, PlaylistSink, PlaylistSource};
//! use segue::tour::{StartPolicy, TourBuilder};
//!
//! let playlist = JsonPlaylistFile::new("road_trip.json").fetch()?;
//!
//! let builder = TourBuilder::default().with_start(StartPolicy::Index(0));
//! let mixed = playlist::mix(&playlist, &builder)?;
//!
//! JsonPlaylistFile::new("road_trip.mixed.json").publish(&mixed)?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Algorithm Details
//!
//! 1. Each track's key code is mapped to a note name and then to a number.
//! 2. Every weighted attribute is standardized to a z-score over the
//!    playlist itself, so the same song can score differently in another
//!    playlist.
//! 3. Each ordered pair gets `1 / (1 + weighted Euclidean distance)`.
//! 4. Starting from an explicit song, the walk repeatedly moves to the most
//!    similar song not yet played.
//!
//! ## Error Handling
//!
//! The core returns [`SegueError`]; playlist I/O and configuration return
//! `anyhow::Result` with file context attached.

pub mod algorithm;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod key;
pub mod playlist;
pub mod song;
pub mod tour;

pub use error::{Result, SegueError};
