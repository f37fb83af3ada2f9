use crate::navigator::PlaybackMode;
use crate::timeline::{LyricLine, LyricTimeline};
use crate::track::Track;
use std::time::Duration;

/// Lifecycle phase of the playback state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    /// Nothing bound, or playback stopped after a failure
    #[default]
    Idle,
    /// A `play_at` is resolving, binding or starting sources
    Loading,
    Playing,
    Paused,
    /// The track reached its natural end
    Ended,
    /// The element refused to play or the final source failed
    Errored,
}

/// Observable projection read by the UI and OS integration.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerTransportState {
    pub phase: PlaybackPhase,
    pub is_playing: bool,
    pub is_loading: bool,
    pub position: Duration,
    pub duration: Duration,
    /// Output volume within (0, 1]
    pub volume: f64,
}

impl Default for PlayerTransportState {
    fn default() -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            is_playing: false,
            is_loading: false,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            volume: 1.0,
        }
    }
}

/// Identifies one `play_at` request. Deferred completions compare their
/// ticket with the controller's current one and are dropped on mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayTicket {
    pub index: usize,
    pub generation: u64,
}

/// How a `play_at` request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayAtOutcome {
    /// Sources were bound and the element started playing
    Started,
    /// A later request took over before this one finished
    Superseded,
}

/// Events emitted by the controller for UI observers
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// A new track became current; lyrics are cleared until loaded
    TrackChanged { index: usize, track: Track },
    PlaybackStarted,
    PlaybackPaused,
    LoadingChanged { loading: bool },
    PositionChanged { position: Duration },
    DurationChanged { duration: Duration },
    LyricsLoaded { timeline: LyricTimeline },
    LyricsNotFound,
    LyricLineChanged { index: usize, line: LyricLine },
    /// The final source of a track failed against the streaming host
    SourceUnavailable { track: Track },
    ModeChanged { mode: PlaybackMode },
    VolumeChanged { volume: f64 },
    /// Playback stopped and no track will be advanced to
    Stopped,
    Error { message: String },
}

/// What the download collaborator needs to save the current track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub file_name: String,
    pub track: Track,
}
