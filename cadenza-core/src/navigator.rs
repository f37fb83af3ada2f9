//! Playlist navigation under the current playback mode.
//!
//! Both functions expect a non-empty playlist; callers guard against
//! `len == 0` before navigating.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the next track is chosen. Persisted across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Play the playlist in order, wrapping at both ends
    #[default]
    Cycle,
    /// Loop the current track; explicit next/previous still cycle
    #[serde(rename = "single")]
    SingleRepeat,
    /// Pick a uniformly random track, possibly the current one
    Random,
}

impl PlaybackMode {
    /// Stable identifier used in persisted settings.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cycle => "cycle",
            Self::SingleRepeat => "single",
            Self::Random => "random",
        }
    }

    /// Whether the rendering element should loop the current track itself.
    #[must_use]
    pub const fn loops_track(&self) -> bool {
        matches!(self, Self::SingleRepeat)
    }
}

impl std::fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaybackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cycle" => Ok(Self::Cycle),
            "single" => Ok(Self::SingleRepeat),
            "random" => Ok(Self::Random),
            other => Err(format!("unknown playback mode: {other}")),
        }
    }
}

/// Index of the track after `current`.
#[must_use]
pub fn next(mode: PlaybackMode, len: usize, current: usize) -> usize {
    next_with(&mut rand::rng(), mode, len, current)
}

/// Index of the track before `current`.
#[must_use]
pub fn previous(mode: PlaybackMode, len: usize, current: usize) -> usize {
    previous_with(&mut rand::rng(), mode, len, current)
}

/// Index to move to after the track at `failed` could not be played.
///
/// Same as [`next`], except that random mode never picks `failed` again
/// while the playlist has another track.
#[must_use]
pub fn skip_failed(mode: PlaybackMode, len: usize, failed: usize) -> usize {
    skip_failed_with(&mut rand::rng(), mode, len, failed)
}

/// [`skip_failed`] with an explicit random source.
pub fn skip_failed_with<R: Rng + ?Sized>(
    rng: &mut R,
    mode: PlaybackMode,
    len: usize,
    failed: usize,
) -> usize {
    match mode {
        PlaybackMode::Random if len > 1 => {
            // Draw from the other len - 1 tracks and shift past the failed one
            let pick = rng.random_range(0..len - 1);
            if pick >= failed { pick + 1 } else { pick }
        }
        _ => next_with(rng, mode, len, failed),
    }
}

/// [`next`] with an explicit random source.
pub fn next_with<R: Rng + ?Sized>(
    rng: &mut R,
    mode: PlaybackMode,
    len: usize,
    current: usize,
) -> usize {
    match mode {
        PlaybackMode::Random => rng.random_range(0..len),
        PlaybackMode::Cycle | PlaybackMode::SingleRepeat => {
            if current >= len.saturating_sub(1) {
                0
            } else {
                current + 1
            }
        }
    }
}

/// [`previous`] with an explicit random source.
pub fn previous_with<R: Rng + ?Sized>(
    rng: &mut R,
    mode: PlaybackMode,
    len: usize,
    current: usize,
) -> usize {
    match mode {
        PlaybackMode::Random => rng.random_range(0..len),
        PlaybackMode::Cycle | PlaybackMode::SingleRepeat => {
            if current == 0 {
                len.saturating_sub(1)
            } else {
                (current - 1).min(len.saturating_sub(1))
            }
        }
    }
}
