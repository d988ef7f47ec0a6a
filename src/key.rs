//! Musical key encoding.
//!
//! The service reports keys as pitch-class integers. They are turned into
//! note names first and then into the numeric scale used for scoring, so
//! textual keys from other sources share the same numbers.

use crate::error::{Result, SegueError};

/// Pitch classes in service order, see <https://en.wikipedia.org/wiki/Pitch_class>.
const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Note name to numeric key. Major keys take 0..=11, minor keys 12..=23.
///
/// Only the major half is reachable from [`encode`]; the minor half serves
/// callers that already hold textual keys.
#[rustfmt::skip]
const NOTATION_VALUES: [(&str, u8); 34] = [
    ("C", 0), ("C#", 1), ("Db", 1), ("D", 2), ("D#", 3), ("Eb", 3),
    ("E", 4), ("F", 5), ("F#", 6), ("Gb", 6), ("G", 7), ("G#", 8),
    ("Ab", 8), ("A", 9), ("A#", 10), ("Bb", 10), ("B", 11),
    ("Cm", 12), ("C#m", 13), ("Dbm", 13), ("Dm", 14), ("D#m", 15), ("Ebm", 15),
    ("Em", 16), ("Fm", 17), ("F#m", 18), ("Gbm", 18), ("Gm", 19), ("G#m", 20),
    ("Abm", 20), ("Am", 21), ("A#m", 22), ("Bbm", 22), ("Bm", 23),
];

/// Maps a service pitch-class code to its note name.
///
/// # Errors
///
/// `OutOfRange` for anything outside `0..=11`, including the service's `-1`
/// for "no key detected".
pub fn pitch_class_to_notation(code: i64) -> Result<&'static str> {
    usize::try_from(code)
        .ok()
        .and_then(|index| PITCH_CLASSES.get(index))
        .copied()
        .ok_or(SegueError::OutOfRange { code })
}

/// Maps a note name such as `"F#"`, `"Bb"` or `"Am"` to its numeric key.
pub fn notation_to_numeric(notation: &str) -> Result<u8> {
    NOTATION_VALUES
        .iter()
        .find(|(name, _)| *name == notation)
        .map(|&(_, value)| value)
        .ok_or_else(|| SegueError::UnknownNotation(notation.to_string()))
}

/// Unified numeric key for a service pitch-class code, ready to be used as
/// an ordinary numeric feature.
pub fn encode(code: i64) -> Result<f64> {
    let notation = pitch_class_to_notation(code)?;
    let value = notation_to_numeric(notation)?;
    log::trace!("Encoded key code {code} as `{notation}' ({value}).");
    Ok(f64::from(value))
}
