//! Cadenza command line front end.
//!
//! Exercises the source resolver, the lyric timeline and the persisted player
//! settings against the live QQ Music endpoints without a rendering element.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail, ensure};
use cadenza_core::time::duration_from_secs_lossy;
use cadenza_core::{
    CadenzaConfig, CoreError, DurationExt, MetadataClient, PlaybackMode, PlayerSettings,
    SessionToken, SourceResolver, SqliteSettingsStore, Track,
};
use cadenza_qqmusic::QqMusicClient;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Cadenza - streaming playback controller with synchronized lyrics.
#[derive(Parser, Debug)]
#[command(name = "cadenza")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (TOML). Defaults to ~/.config/cadenza/config.toml.
    #[arg(short, long, value_name = "FILE", env = "CADENZA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the ranked stream URLs for one track of a playlist file.
    Resolve {
        /// JSON array of tracks as returned by the metadata service
        #[arg(value_name = "PLAYLIST")]
        playlist: PathBuf,

        /// Position of the track in the playlist
        #[arg(short, long, default_value_t = 0)]
        index: usize,
    },

    /// Fetch the lyric timeline of a track.
    Lyrics {
        /// Track identifier (song mid)
        track_id: String,

        /// Print only the line active at this position, in seconds
        #[arg(long, value_name = "SECS")]
        at: Option<f64>,
    },

    /// Show or change the persisted playback mode and volume.
    Settings {
        /// cycle, single or random
        #[arg(long)]
        mode: Option<PlaybackMode>,

        /// Output volume within (0, 1]
        #[arg(long)]
        volume: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(check_file_logging_enabled(args.config.as_deref()));
    info!("Cadenza v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Resolve { playlist, index } => resolve(&config, &playlist, index).await,
        Command::Lyrics { track_id, at } => lyrics(&config, &track_id, at).await,
        Command::Settings { mode, volume } => settings(mode, volume).await,
    }
}

fn load_config(path: Option<&Path>) -> Result<CadenzaConfig> {
    if let Some(path) = path {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        return CadenzaConfig::parse(&content).context("Invalid configuration");
    }

    match CadenzaConfig::load_or_create() {
        Ok(config) => Ok(config),
        Err(CoreError::ConfigNotFound { path }) => {
            warn!(
                "No config found, wrote a template to {} and continuing with defaults",
                path.display()
            );
            Ok(CadenzaConfig::default())
        }
        Err(e) => Err(e).context("Failed to load configuration"),
    }
}

async fn resolve(config: &CadenzaConfig, playlist: &Path, index: usize) -> Result<()> {
    let content = std::fs::read_to_string(playlist)
        .with_context(|| format!("Failed to read playlist {}", playlist.display()))?;
    let tracks: Vec<Track> =
        serde_json::from_str(&content).context("Playlist is not a JSON array of tracks")?;
    let Some(track) = tracks.get(index) else {
        bail!(CoreError::InvalidIndex {
            index,
            len: tracks.len()
        });
    };

    let client = Arc::new(QqMusicClient::new(&config.api).context("Failed to create HTTP client")?);
    let resolver = SourceResolver::new(client, config.stream.clone());
    let session = SessionToken::generate();
    info!("Resolving {} with session {}", track, session);

    let sources = resolver.resolve(track, &session).await?;
    println!("{track}");
    for (slot, url) in sources.iter() {
        println!("  {slot:?}: {url}");
    }
    println!("  Save as: {}", track.download_file_name());
    Ok(())
}

async fn lyrics(config: &CadenzaConfig, track_id: &str, at: Option<f64>) -> Result<()> {
    let client = QqMusicClient::new(&config.api).context("Failed to create HTTP client")?;
    let timeline = client.fetch_lyrics(track_id).await?;
    info!("Fetched {} lyric lines for {}", timeline.len(), track_id);

    if let Some(secs) = at {
        let position = duration_from_secs_lossy(secs);
        match timeline.locate(position, 0).and_then(|i| timeline.get(i)) {
            Some(line) => println!("[{}] {}", line.time.to_clock_string(), line.text),
            None => println!("No lyric line at {}", position.to_clock_string()),
        }
        return Ok(());
    }

    for line in timeline.lines() {
        println!("[{}] {}", line.time.to_clock_string(), line.text);
    }
    Ok(())
}

async fn settings(mode: Option<PlaybackMode>, volume: Option<f64>) -> Result<()> {
    let store = SqliteSettingsStore::new()
        .await
        .context("Failed to open settings database")?;

    if let Some(mode) = mode {
        PlayerSettings::save_mode(&store, mode).await?;
        info!("Saved playback mode {}", mode);
    }
    if let Some(volume) = volume {
        ensure!(
            volume > 0.0 && volume <= 1.0,
            CoreError::InvalidVolume { volume }
        );
        PlayerSettings::save_volume(&store, volume).await?;
        info!("Saved volume {}", volume);
    }

    let current = PlayerSettings::load(&store).await;
    println!("mode   = {}", current.mode);
    println!("volume = {}", current.volume);
    Ok(())
}

/// Quick check of `[logging] enabled` before the full config is loaded, so
/// config errors end up in the log file too.
fn check_file_logging_enabled(path: Option<&Path>) -> bool {
    #[derive(serde::Deserialize)]
    struct PartialConfig {
        #[serde(default)]
        logging: PartialLoggingConfig,
    }
    #[derive(serde::Deserialize, Default)]
    struct PartialLoggingConfig {
        #[serde(default)]
        enabled: bool,
    }

    let path = path.map_or_else(CadenzaConfig::config_path, Path::to_path_buf);
    let Ok(content) = std::fs::read_to_string(&path) else {
        return false;
    };

    toml::from_str::<PartialConfig>(&content)
        .map(|c| c.logging.enabled)
        .unwrap_or(false)
}

/// Initialize tracing with console output and optional file logging
fn init_tracing(file_logging_enabled: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if file_logging_enabled {
        let log_path = cadenza_core::log_file_path();

        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match File::create(&log_path) {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .with(file_layer)
                    .init();

                return;
            }
            Err(e) => {
                eprintln!("Failed to create log file at {}: {e}", log_path.display());
            }
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
