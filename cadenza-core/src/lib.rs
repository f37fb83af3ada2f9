pub mod config;
pub mod controller;
pub mod element;
pub mod error;
pub mod lrc;
pub mod navigator;
pub mod paths;
pub mod playback;
pub mod provider;
pub mod resolver;
pub mod settings;
pub mod source;
pub mod throttle;
pub mod time;
pub mod timeline;
pub mod track;
pub mod transport;

#[cfg(test)]
mod testing;

pub use config::{
    ApiConfig, CadenzaConfig, DEFAULT_API_BASE_URL, DEFAULT_STREAM_HOST, LoggingConfig,
    PlayerConfig, StreamConfig,
};
pub use controller::{ControllerDeps, PlayerController};
pub use element::{ElementEvent, RenderingElement};

/// Re-export toml error type for config parsing error handling
pub use toml::de::Error as TomlParseError;
pub use error::{CoreError, Result};
pub use lrc::{LrcFile, LrcMetadata};
pub use navigator::PlaybackMode;
pub use paths::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, LOG_FILE_NAME, SETTINGS_DB_FILE_NAME, config_dir,
    log_file_path, settings_db_path,
};
pub use playback::{
    DownloadRequest, PlayAtOutcome, PlayTicket, PlaybackPhase, PlayerEvent, PlayerTransportState,
};
pub use provider::{LogNotifier, MediaControls, MetadataClient, Notification, Notifier, StreamToken};
pub use resolver::SourceResolver;
pub use settings::{MemorySettingsStore, PlayerSettings, SettingsStore, SqliteSettingsStore};
pub use source::{MAX_SOURCES, SessionToken, SourceSet, SourceSlot};
pub use time::DurationExt;
pub use timeline::{LyricLine, LyricTimeline};
pub use track::{AlbumRef, Playlist, Singer, Track};
pub use transport::Transport;
