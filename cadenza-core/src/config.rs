use crate::error::{CoreError, Result};
use const_format::concatcp;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Streaming host that serves both primary and fallback URLs
pub const DEFAULT_STREAM_HOST: &str = "dl.stream.qqmusic.qq.com";

/// Base URL of the metadata / stream-token API
pub const DEFAULT_API_BASE_URL: &str = "https://c.y.qq.com";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CadenzaConfig {
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    #[serde(default = "default_stream_host")]
    pub host: String,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// `fromtag` sent with the primary stream request
    #[serde(default = "default_primary_from_tag")]
    pub primary_from_tag: u32,
    /// `fromtag` sent with fallback stream requests
    #[serde(default = "default_fallback_from_tag")]
    pub fallback_from_tag: u32,
    /// Bitrate prefixes for the fallback files, highest priority first
    #[serde(default = "default_fallback_prefixes")]
    pub fallback_prefixes: Vec<String>,
    #[serde(default = "default_credential_max_age")]
    pub session_credential_max_age_secs: u64,
}

fn default_stream_host() -> String {
    DEFAULT_STREAM_HOST.to_string()
}

fn default_scheme() -> String {
    "http".to_string()
}

const fn default_primary_from_tag() -> u32 {
    66
}

const fn default_fallback_from_tag() -> u32 {
    30
}

fn default_fallback_prefixes() -> Vec<String> {
    vec!["M500".to_string(), "M800".to_string()]
}

const fn default_credential_max_age() -> u64 {
    3600
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            host: default_stream_host(),
            scheme: default_scheme(),
            primary_from_tag: default_primary_from_tag(),
            fallback_from_tag: default_fallback_from_tag(),
            fallback_prefixes: default_fallback_prefixes(),
            session_credential_max_age_secs: default_credential_max_age(),
        }
    }
}

impl StreamConfig {
    #[must_use]
    pub const fn session_credential_max_age(&self) -> Duration {
        Duration::from_secs(self.session_credential_max_age_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Minimum spacing between processed time updates
    #[serde(default = "default_throttle_ms")]
    pub time_update_throttle_ms: u64,
    #[serde(default = "default_true")]
    pub notifications: bool,
    /// Publish now-playing state to the OS media controls
    #[serde(default = "default_media_controls")]
    pub media_controls: bool,
}

const fn default_throttle_ms() -> u64 {
    800
}

const fn default_true() -> bool {
    true
}

const fn default_media_controls() -> bool {
    cfg!(target_os = "linux")
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            time_update_throttle_ms: default_throttle_ms(),
            notifications: true,
            media_controls: default_media_controls(),
        }
    }
}

impl PlayerConfig {
    #[must_use]
    pub const fn time_update_throttle(&self) -> Duration {
        Duration::from_millis(self.time_update_throttle_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_max_retries() -> u32 {
    3
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to ~/.config/cadenza/cadenza.log
    #[serde(default)]
    pub enabled: bool,
}

impl CadenzaConfig {
    /// Get the config file path (~/.config/cadenza/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from file or create template on first run
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] after writing the template on
    /// first run, or an error if the file cannot be read, parsed or validated.
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&config_path, CONFIG_TEMPLATE)?;

            return Err(CoreError::ConfigNotFound { path: config_path });
        }

        let content = fs::read_to_string(&config_path)?;
        Self::parse(&content)
    }

    /// Parse and validate a config document.
    ///
    /// # Errors
    ///
    /// Returns an error on TOML syntax errors or invalid values.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if a required field is empty or a value is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.stream.host.trim().is_empty() {
            return Err(CoreError::ConfigMissingField {
                field: "stream.host".into(),
            });
        }
        if self.api.base_url.trim().is_empty() {
            return Err(CoreError::ConfigMissingField {
                field: "api.base_url".into(),
            });
        }
        if self.stream.fallback_prefixes.is_empty() || self.stream.fallback_prefixes.len() > 2 {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "stream.fallback_prefixes must list one or two prefixes, got {}",
                    self.stream.fallback_prefixes.len()
                ),
            });
        }
        if self.player.time_update_throttle_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "player.time_update_throttle_ms must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

/// Template written on first run
pub const CONFIG_TEMPLATE: &str = concatcp!(
    r#"# Cadenza Configuration
# ~/.config/cadenza/config.toml

[stream]
host = ""#,
    DEFAULT_STREAM_HOST,
    r#""
scheme = "http"
primary_from_tag = 66
fallback_from_tag = 30
# Fallback bitrates, tried after the primary stream
fallback_prefixes = ["M500", "M800"]
session_credential_max_age_secs = 3600

[player]
# Lyric position is recomputed at most once per interval
time_update_throttle_ms = 800
notifications = true
# Publish now-playing state to the OS media controls (Linux only by default)
# media_controls = true

[api]
base_url = ""#,
    DEFAULT_API_BASE_URL,
    r#""
timeout_secs = 10
max_retries = 3

[logging]
# Also write logs to ~/.config/cadenza/cadenza.log
enabled = false
"#
);
