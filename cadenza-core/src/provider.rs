//! Interfaces of the external collaborators the controller depends on.

use crate::error::CoreError;
use crate::source::SessionToken;
use crate::timeline::LyricTimeline;
use crate::track::Track;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

/// Short-lived credential for one track's primary stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamToken {
    pub token: String,
}

/// Track metadata / stream-token service.
///
/// All failures are recoverable: the controller surfaces them to its caller
/// and keeps running.
#[async_trait]
pub trait MetadataClient: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Issue a fresh credential for the primary stream of `track`.
    async fn resolve_stream_token(
        &self,
        session: &SessionToken,
        track: &Track,
    ) -> Result<StreamToken, CoreError>;

    /// Fetch the lyric timeline for a track identifier.
    async fn fetch_lyrics(&self, track_id: &str) -> Result<LyricTimeline, CoreError>;

    /// Issue the session-wide credential used by the fallback streams.
    async fn issue_session_credential(&self, session: &SessionToken) -> Result<String, CoreError>;
}

/// A user-facing toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
}

/// Fire-and-forget notifications. Not part of the playback contract, so
/// implementations must not block or fail.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that writes to the log, for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        if notification.body.is_empty() {
            info!("{}", notification.title);
        } else {
            warn!("{}: {}", notification.title, notification.body);
        }
    }
}

/// OS-level media-control surface (MPRIS on Linux).
///
/// Optional capability: the controller holds `None` on platforms without one.
pub trait MediaControls: Send + Sync {
    /// Called on every position read.
    fn set_position(&self, position: Duration);

    /// Called whenever the track or its duration changes.
    fn set_metadata(&self, track: &Track, duration: Duration, volume: f64);

    fn set_playing(&self, playing: bool);
}
