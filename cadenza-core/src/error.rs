use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Configuration errors
    #[error("Config file not found at {path}. A template has been created - please review it and restart.")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Missing required config field: {field}")]
    ConfigMissingField { field: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // Playback errors
    #[error("Could not resolve a playable source for {track}: {reason}")]
    ResolveFailure { track: String, reason: String },

    #[error("No playable rights for {track} (source: {src})")]
    UnlicensedSource { track: String, src: String },

    #[error("Rendering element refused to play: {reason}")]
    PlaybackRejected { reason: String },

    #[error("Track index {index} is out of range for a playlist of {len} tracks")]
    InvalidIndex { index: usize, len: usize },

    #[error("Playlist is empty")]
    EmptyPlaylist,

    #[error("Player controller is already running")]
    AlreadyStarted,

    #[error("Volume must be within (0, 1], got {volume}")]
    InvalidVolume { volume: f64 },

    #[error("A source set needs between 1 and 3 URLs, got {count}")]
    InvalidSourceSet { count: usize },

    // Collaborator errors
    #[error("Provider {provider} failed: {reason}")]
    ProviderFailed { provider: String, reason: String },

    #[error("Lyrics not found for track {track_id}")]
    LyricsNotFound { track_id: String },

    #[error("Failed to parse LRC: {reason}")]
    LrcParseError { reason: String },

    // Storage errors
    #[error("Settings database error: {0}")]
    SettingsError(#[from] tokio_rusqlite::Error),

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CoreError {
    /// Wrap a collaborator failure, keeping the provider name for logs.
    pub fn provider(provider: impl Into<String>, reason: impl ToString) -> Self {
        Self::ProviderFailed {
            provider: provider.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
