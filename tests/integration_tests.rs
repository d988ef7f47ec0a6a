//! # Integration Tests for Segue
//!
//! End-to-end checks of the reordering pipeline, from exported playlist
//! files through the library and the `segue` binary.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use segue::playlist::{MixedPlaylist, Playlist};
use segue::song::TrackRow;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn track(id: &str, tempo: f64, key: i64, level: f64) -> TrackRow {
    TrackRow {
        id: id.to_string(),
        name: format!("Song {id}"),
        artist: format!("Artist {id}"),
        album: "Album".to_string(),
        tempo: Some(tempo),
        key: Some(key),
        danceability: Some(level),
        energy: Some(level),
        loudness: Some(-20.0 + 15.0 * level),
        valence: Some(level),
        mode: Some(1.0),
        time_signature: Some(4.0),
    }
}

fn random_playlist(seed: u64, len: usize) -> Playlist {
    let mut rng = StdRng::seed_from_u64(seed);
    Playlist {
        id: format!("pl-{seed}"),
        name: format!("Random {seed}"),
        tracks: (0..len)
            .map(|i| {
                track(
                    &format!("t{i}"),
                    rng.gen_range(70.0..180.0),
                    rng.gen_range(0..12),
                    rng.gen_range(0.0..1.0),
                )
            })
            .collect(),
    }
}

/// Test helper writing a playlist export into a temporary directory
fn write_playlist(dir: &Path, file_name: &str, playlist: &Playlist) -> Result<PathBuf> {
    let path = dir.join(file_name);
    fs::write(&path, serde_json::to_string_pretty(playlist)?)?;
    Ok(path)
}

fn segue() -> Command {
    Command::new(env!("CARGO_BIN_EXE_segue"))
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;
    use segue::playlist::{self, JsonPlaylistFile, PlaylistSink, PlaylistSource};
    use segue::tour::{Direction, StartPolicy, TourBuilder};
    use segue::SegueError;
    use std::collections::HashSet;

    #[test]
    fn test_mixed_playlist_is_permutation_of_source() -> Result<()> {
        for (seed, len) in [(1, 1), (2, 2), (3, 17), (4, 60)] {
            let source = random_playlist(seed, len);
            let mixed = playlist::mix(&source, &TourBuilder::default())?;

            let source_ids: HashSet<&str> = source.tracks.iter().map(|t| t.id.as_str()).collect();
            let mixed_ids: HashSet<&str> = mixed.tracks.iter().map(|t| t.id.as_str()).collect();
            assert_eq!(mixed.tracks.len(), len);
            assert_eq!(mixed_ids, source_ids);
        }
        Ok(())
    }

    #[test]
    fn test_outlier_ends_the_tour() -> Result<()> {
        let source = Playlist {
            id: "p".to_string(),
            name: "Chill".to_string(),
            tracks: vec![
                track("a", 90.0, 2, 0.30),
                track("loud", 175.0, 11, 0.95),
                track("b", 92.0, 2, 0.32),
            ],
        };

        let builder = TourBuilder::default().with_start(StartPolicy::Song("a".to_string()));
        let mixed = playlist::mix(&source, &builder)?;
        let ids: Vec<&str> = mixed.tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "loud"]);

        let legacy = playlist::mix(&source, &builder.with_direction(Direction::LowestScore))?;
        let ids: Vec<&str> = legacy.tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "loud", "b"]);
        Ok(())
    }

    #[test]
    fn test_same_seed_same_order() -> Result<()> {
        let source = random_playlist(9, 30);
        let builder = TourBuilder::default().with_start(StartPolicy::Seeded(1234));

        let first = playlist::mix(&source, &builder)?;
        let second = playlist::mix(&source, &builder)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_invalid_key_is_reported_with_track() {
        let mut source = random_playlist(5, 4);
        source.tracks[2].key = Some(12);

        let err = playlist::mix(&source, &TourBuilder::default()).unwrap_err();
        match err {
            SegueError::InvalidTrack { song_id, .. } => assert_eq!(song_id, "t2"),
            other => panic!("expected InvalidTrack, got {other:?}"),
        }
    }

    #[test]
    fn test_file_source_and_sink() -> Result<()> {
        let dir = TempDir::new()?;
        let input = write_playlist(dir.path(), "weekly.json", &random_playlist(6, 12))?;

        let source = JsonPlaylistFile::new(&input).fetch()?;
        let mixed = playlist::mix(&source, &TourBuilder::default())?;
        let output = playlist::output_path(&input, Some(&dir.path().join("nested")));
        JsonPlaylistFile::new(&output).publish(&mixed)?;

        let written: MixedPlaylist = serde_json::from_str(&fs::read_to_string(&output)?)?;
        assert_eq!(written.name, "Mixed: Random 6");
        assert_eq!(written.source_id, "pl-6");
        assert_eq!(written.tracks.len(), 12);
        Ok(())
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_cli_help_displays_correctly() {
        let output = segue().arg("--help").output().expect("Failed to run help command");

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(output.status.success());
        assert!(stdout.contains("segue"));
        assert!(stdout.contains("reorder"));
        assert!(stdout.contains("stats"));
        assert!(stdout.contains("weights"));
    }

    #[test]
    fn test_reorder_writes_mixed_playlists() -> Result<()> {
        let dir = TempDir::new()?;
        let first = write_playlist(dir.path(), "first.json", &random_playlist(1, 8))?;
        let second = write_playlist(dir.path(), "second.json", &random_playlist(2, 5))?;
        let out_dir = dir.path().join("mixed");

        let output = segue()
            .arg("reorder")
            .arg(&first)
            .arg(&second)
            .arg("--output-dir")
            .arg(&out_dir)
            .args(["--start-index", "0"])
            .env_remove("SEGUE_WEIGHTS")
            .output()?;
        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

        let mixed: MixedPlaylist =
            serde_json::from_str(&fs::read_to_string(out_dir.join("first.mixed.json"))?)?;
        assert_eq!(mixed.name, "Mixed: Random 1");
        assert_eq!(mixed.tracks.len(), 8);
        assert_eq!(mixed.tracks[0].id, "t0");
        assert!(out_dir.join("second.mixed.json").is_file());
        Ok(())
    }

    #[test]
    fn test_reorder_reports_bad_playlist_and_keeps_going() -> Result<()> {
        let dir = TempDir::new()?;
        let good = write_playlist(dir.path(), "good.json", &random_playlist(3, 4))?;
        let empty = Playlist { id: "e".to_string(), name: "Empty".to_string(), tracks: Vec::new() };
        let bad = write_playlist(dir.path(), "empty.json", &empty)?;

        let output = segue().arg("reorder").arg(&good).arg(&bad).env_remove("SEGUE_WEIGHTS").output()?;

        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("empty"));
        assert!(dir.path().join("good.mixed.json").is_file());
        assert!(!dir.path().join("empty.mixed.json").exists());
        Ok(())
    }

    #[test]
    fn test_reorder_refuses_shared_output_file() -> Result<()> {
        let dir = TempDir::new()?;
        let (left, right) = (dir.path().join("left"), dir.path().join("right"));
        fs::create_dir_all(&left)?;
        fs::create_dir_all(&right)?;
        let one = write_playlist(&left, "x.json", &random_playlist(1, 3))?;
        let two = write_playlist(&right, "x.json", &random_playlist(2, 3))?;
        let other = write_playlist(&left, "other.json", &random_playlist(3, 3))?;
        let out_dir = dir.path().join("out");

        let output = segue()
            .arg("reorder")
            .arg(&one)
            .arg(&two)
            .arg(&other)
            .arg("--output-dir")
            .arg(&out_dir)
            .env_remove("SEGUE_WEIGHTS")
            .output()?;

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("x.mixed.json"), "stderr: {stderr}");
        assert!(!out_dir.join("x.mixed.json").exists());
        assert!(out_dir.join("other.mixed.json").is_file());
        Ok(())
    }

    #[test]
    fn test_weights_command_uses_file() -> Result<()> {
        let dir = TempDir::new()?;
        let weights = dir.path().join("weights.json");
        fs::write(&weights, r#"{ "tempo": 1.0 }"#)?;

        let output = segue().arg("weights").arg("--weights").arg(&weights).output()?;
        assert!(output.status.success());

        let printed: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        assert_eq!(printed, serde_json::json!({ "tempo": 1.0 }));
        Ok(())
    }

    #[test]
    fn test_stats_command() -> Result<()> {
        let dir = TempDir::new()?;
        let input = write_playlist(dir.path(), "stats.json", &random_playlist(4, 6))?;

        let output = segue().arg("stats").arg(&input).env_remove("SEGUE_WEIGHTS").output()?;
        assert!(output.status.success());

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Random 4 (6 tracks)"));
        assert!(stdout.contains("time_signature"));
        assert!(stdout.contains("(no spread)"));
        Ok(())
    }

    #[test]
    fn test_completion_generation() {
        let output = segue().args(["completion", "bash"]).output().expect("Failed to run completion command");

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("_segue"));
        assert!(stdout.contains("complete"));
    }
}
