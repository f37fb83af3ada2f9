//! Command surface for the UI and OS media-control callbacks.

use crate::controller::PlayerController;
use crate::error::Result;
use crate::navigator::PlaybackMode;
use crate::playback::{DownloadRequest, PlayAtOutcome, PlayerEvent, PlayerTransportState};
use crate::time::DurationExt;
use crate::timeline::{LyricLine, LyricTimeline};
use crate::track::Track;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Thin facade over [`PlayerController`].
///
/// Position reads are forwarded to the OS media controls when they are
/// enabled, since that surface polls instead of subscribing.
#[derive(Clone)]
pub struct Transport {
    controller: Arc<PlayerController>,
}

impl Transport {
    #[must_use]
    pub fn new(controller: Arc<PlayerController>) -> Self {
        Self { controller }
    }

    #[must_use]
    pub fn controller(&self) -> &Arc<PlayerController> {
        &self.controller
    }

    /// # Errors
    ///
    /// See [`PlayerController::play_at`].
    pub async fn play_at(&self, index: usize) -> Result<PlayAtOutcome> {
        self.controller.play_at(index).await
    }

    /// # Errors
    ///
    /// See [`PlayerController::next`].
    pub async fn next(&self) -> Result<PlayAtOutcome> {
        self.controller.next().await
    }

    /// # Errors
    ///
    /// See [`PlayerController::previous`].
    pub async fn previous(&self) -> Result<PlayAtOutcome> {
        self.controller.previous().await
    }

    /// # Errors
    ///
    /// Returns an error if the mode cannot be persisted.
    pub async fn set_mode(&self, mode: PlaybackMode) -> Result<()> {
        self.controller.set_mode(mode).await
    }

    /// # Errors
    ///
    /// Returns an error for a volume outside (0, 1] or if it cannot be persisted.
    pub async fn set_volume(&self, volume: f64) -> Result<()> {
        self.controller.set_volume(volume).await
    }

    pub fn pause(&self) {
        self.controller.pause();
    }

    /// # Errors
    ///
    /// Returns an error if the element refuses to play.
    pub async fn resume(&self) -> Result<()> {
        self.controller.resume().await
    }

    pub fn seek(&self, position: Duration) {
        self.controller.seek(position);
    }

    /// # Errors
    ///
    /// See [`PlayerController::replace_playlist`].
    pub async fn replace_playlist(&self, tracks: Vec<Track>, current: Option<usize>) -> Result<()> {
        self.controller.replace_playlist(tracks, current).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.controller.subscribe()
    }

    pub async fn transport_state(&self) -> PlayerTransportState {
        let state = self.controller.transport_state().await;
        self.publish_position(state.position);
        state
    }

    pub async fn position(&self) -> Duration {
        let position = self.controller.transport_state().await.position;
        self.publish_position(position);
        position
    }

    pub async fn duration(&self) -> Duration {
        self.controller.transport_state().await.duration
    }

    pub async fn volume(&self) -> f64 {
        self.controller.transport_state().await.volume
    }

    pub async fn mode(&self) -> PlaybackMode {
        self.controller.mode().await
    }

    /// Position as `m:s`, e.g. `3:7`
    pub async fn position_string(&self) -> String {
        self.position().await.to_clock_string()
    }

    /// Duration as `m:s`
    pub async fn duration_string(&self) -> String {
        self.duration().await.to_clock_string()
    }

    pub async fn current_track(&self) -> Option<Track> {
        self.controller.current_track().await
    }

    pub async fn current_index(&self) -> Option<usize> {
        self.controller.current_index().await
    }

    pub async fn lyrics(&self) -> LyricTimeline {
        self.controller.lyrics().await
    }

    pub async fn current_lyric(&self) -> Option<LyricLine> {
        self.controller.current_lyric().await
    }

    pub async fn download_request(&self) -> Option<DownloadRequest> {
        self.controller.download_request().await
    }

    fn publish_position(&self, position: Duration) {
        if let Some(controls) = self.controller.media_controls() {
            controls.set_position(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CadenzaConfig;
    use crate::controller::ControllerDeps;
    use crate::element::{ElementEvent, RenderingElement};
    use crate::settings::MemorySettingsStore;
    use crate::testing::{
        FakeElement, FakeMetadata, RecordingMediaControls, RecordingNotifier, settle, tracks,
    };

    async fn transport(media_enabled: bool) -> (Transport, Arc<FakeElement>, Arc<RecordingMediaControls>) {
        let element = Arc::new(FakeElement::new());
        let media = Arc::new(RecordingMediaControls::default());
        let mut config = CadenzaConfig::default();
        config.player.media_controls = media_enabled;

        let controller = PlayerController::new(
            ControllerDeps {
                element: element.clone(),
                metadata: Arc::new(FakeMetadata::new()),
                settings: Arc::new(MemorySettingsStore::default()),
                notifier: Arc::new(RecordingNotifier::default()),
                media_controls: Some(media.clone()),
            },
            &config,
        )
        .await;
        let _handle = controller.start().unwrap();
        let transport = Transport::new(controller);
        transport.replace_playlist(tracks(3), None).await.unwrap();
        (transport, element, media)
    }

    #[tokio::test]
    async fn test_clock_strings() {
        let (transport, element, _) = transport(true).await;
        transport.play_at(0).await.unwrap();

        element.emit(ElementEvent::DurationChange(Duration::from_secs(245)));
        element.emit(ElementEvent::TimeUpdate(Duration::from_millis(67_900)));
        settle().await;

        assert_eq!(transport.position_string().await, "1:7");
        assert_eq!(transport.duration_string().await, "4:5");
    }

    #[tokio::test]
    async fn test_position_reads_are_published() {
        let (transport, element, media) = transport(true).await;
        transport.play_at(1).await.unwrap();
        element.emit(ElementEvent::TimeUpdate(Duration::from_secs(3)));
        settle().await;

        transport.position().await;
        transport.transport_state().await;

        assert_eq!(media.positions(), vec![Duration::from_secs(3); 2]);
    }

    #[tokio::test]
    async fn test_disabled_media_controls_are_not_called() {
        let (transport, element, media) = transport(false).await;
        transport.play_at(0).await.unwrap();
        element.emit(ElementEvent::DurationChange(Duration::from_secs(10)));
        settle().await;

        transport.position().await;

        assert!(media.positions().is_empty());
        assert!(media.last_metadata().is_none());
    }

    #[tokio::test]
    async fn test_commands_reach_the_element() {
        let (transport, element, _) = transport(true).await;

        transport.set_mode(PlaybackMode::SingleRepeat).await.unwrap();
        transport.set_volume(0.25).await.unwrap();
        transport.play_at(2).await.unwrap();
        transport.seek(Duration::from_secs(30));
        transport.pause();

        assert!(element.is_looping());
        assert!((element.volume() - 0.25).abs() < f64::EPSILON);
        assert_eq!(element.current_time(), Duration::from_secs(30));
        assert_eq!(transport.mode().await, PlaybackMode::SingleRepeat);
        assert_eq!(transport.current_index().await, Some(2));
        assert_eq!(transport.current_track().await.unwrap().id, "track2");

        transport.resume().await.unwrap();
        assert_eq!(element.play_count(), 2);
    }
}
