//! Error type shared by the reordering core.
//!
//! Every variant is an input or configuration problem. Nothing here is
//! transient, so callers abort the run instead of retrying.

use crate::song::Feature;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SegueError {
    #[error("collection is empty: nothing to reorder")]
    EmptyInput,

    #[error("song '{song_id}' is missing the '{attribute}' attribute")]
    MissingAttribute { song_id: String, attribute: Feature },

    #[error("key code {code} is outside the pitch-class range 0..=11")]
    OutOfRange { code: i64 },

    #[error("unknown key notation '{0}'")]
    UnknownNotation(String),

    #[error("song identifier '{0}' appears more than once")]
    DuplicateId(String),

    #[error("invalid track '{song_id}': {source}")]
    InvalidTrack {
        song_id: String,
        #[source]
        source: Box<SegueError>,
    },

    #[error("start song '{0}' is not part of the collection")]
    UnknownStartSong(String),

    #[error("start index {index} is out of range for {len} songs")]
    StartIndexOutOfRange { index: usize, len: usize },

    #[error("weight {weight} for '{feature}' must be within 0.0..=1.0")]
    InvalidWeight { feature: Feature, weight: f64 },
}

pub type Result<T> = std::result::Result<T, SegueError>;
