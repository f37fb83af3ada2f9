//! Playback state machine.
//!
//! The controller owns the "now playing" slot, the rendering element and its
//! source slots. Transport commands and element lifecycle events both funnel
//! through it. No lock is held across an await; instead every deferred
//! completion carries the [`PlayTicket`] it was issued for and is discarded
//! if a newer `play_at` has taken over in the meantime.

use crate::config::CadenzaConfig;
use crate::element::{ElementEvent, RenderingElement};
use crate::error::{CoreError, Result};
use crate::navigator::{self, PlaybackMode};
use crate::playback::{
    DownloadRequest, PlayAtOutcome, PlayTicket, PlaybackPhase, PlayerEvent, PlayerTransportState,
};
use crate::provider::{MediaControls, MetadataClient, Notification, Notifier};
use crate::resolver::SourceResolver;
use crate::settings::{PlayerSettings, SettingsStore};
use crate::source::{SessionToken, SourceSet, SourceSlot};
use crate::throttle::{Offer, Throttle};
use crate::timeline::{LyricLine, LyricTimeline};
use crate::track::{Playlist, Track};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// Collaborators injected into the controller.
pub struct ControllerDeps {
    pub element: Arc<dyn RenderingElement>,
    pub metadata: Arc<dyn MetadataClient>,
    pub settings: Arc<dyn SettingsStore>,
    pub notifier: Arc<dyn Notifier>,
    pub media_controls: Option<Arc<dyn MediaControls>>,
}

struct ControllerInner {
    playlist: Playlist,
    current_index: Option<usize>,
    /// Bumped by every `play_at` and playlist replacement
    generation: u64,
    transport: PlayerTransportState,
    mode: PlaybackMode,
    sources: Option<SourceSet>,
    lyrics: LyricTimeline,
    lyric_index: usize,
    /// Limits position updates; held ticks are released by a timer task
    throttle: Throttle<Duration>,
    /// Generation whose final-source failure already triggered an advance
    unlicensed_generation: Option<u64>,
    consecutive_unlicensed: usize,
}

impl ControllerInner {
    fn is_current(&self, ticket: PlayTicket) -> bool {
        self.generation == ticket.generation && self.current_index == Some(ticket.index)
    }

    fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.playlist.get(i))
    }

    /// Record a position and move the lyric index. Returns the new line if it changed.
    fn apply_position(&mut self, position: Duration) -> Option<(usize, LyricLine)> {
        self.transport.position = position;
        match self.lyrics.locate(position, self.lyric_index) {
            Some(index) if index != self.lyric_index => {
                self.lyric_index = index;
                self.lyrics.get(index).cloned().map(|line| (index, line))
            }
            _ => None,
        }
    }
}

/// Outcome of inspecting a failure on the final source slot.
enum FinalSourceFailure {
    Ignored,
    Advance { track: Track, index: usize },
    Exhausted(Track),
}

pub struct PlayerController {
    inner: RwLock<ControllerInner>,
    element: Arc<dyn RenderingElement>,
    metadata: Arc<dyn MetadataClient>,
    resolver: SourceResolver,
    settings: Arc<dyn SettingsStore>,
    notifier: Arc<dyn Notifier>,
    media_controls: Option<Arc<dyn MediaControls>>,
    notifications_enabled: bool,
    session: SessionToken,
    event_tx: broadcast::Sender<PlayerEvent>,
    cancel_token: CancellationToken,
    started: AtomicBool,
}

impl PlayerController {
    /// Create a controller, restoring mode and volume from the settings store
    /// and applying them to the rendering element.
    pub async fn new(deps: ControllerDeps, config: &CadenzaConfig) -> Arc<Self> {
        let ControllerDeps {
            element,
            metadata,
            settings,
            notifier,
            media_controls,
        } = deps;

        let restored = PlayerSettings::load(settings.as_ref()).await;
        element.set_volume(restored.volume);
        element.set_looping(restored.mode.loops_track());
        info!(
            "Restored player settings: mode={}, volume={}",
            restored.mode, restored.volume
        );

        let (event_tx, _) = broadcast::channel(64);

        Arc::new(Self {
            inner: RwLock::new(ControllerInner {
                playlist: Playlist::default(),
                current_index: None,
                generation: 0,
                transport: PlayerTransportState {
                    volume: restored.volume,
                    ..PlayerTransportState::default()
                },
                mode: restored.mode,
                sources: None,
                lyrics: LyricTimeline::empty(),
                lyric_index: 0,
                throttle: Throttle::new(config.player.time_update_throttle()),
                unlicensed_generation: None,
                consecutive_unlicensed: 0,
            }),
            resolver: SourceResolver::new(metadata.clone(), config.stream.clone()),
            element,
            metadata,
            settings,
            notifier,
            media_controls: media_controls.filter(|_| config.player.media_controls),
            notifications_enabled: config.player.notifications,
            session: SessionToken::generate(),
            event_tx,
            cancel_token: CancellationToken::new(),
            started: AtomicBool::new(false),
        })
    }

    /// Subscribe to controller events
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.event_tx.subscribe()
    }

    /// Get a clone of the cancellation token
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    #[must_use]
    pub fn session(&self) -> &SessionToken {
        &self.session
    }

    pub(crate) fn media_controls(&self) -> Option<&Arc<dyn MediaControls>> {
        self.media_controls.as_ref()
    }

    /// Subscribe to the rendering element and process its events in a
    /// background task until [`stop`](Self::stop) is called.
    ///
    /// Also warms up the session credential so the first `play_at` does not
    /// have to wait for it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AlreadyStarted`] if the event loop is already running.
    pub fn start(self: &Arc<Self>) -> Result<tokio::task::JoinHandle<()>> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(CoreError::AlreadyStarted);
        }
        let mut rx = self.element.subscribe();

        let warm = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = warm.resolver.session_credential(&warm.session).await {
                warn!("Session credential warm-up failed, will retry on play: {}", e);
            }
        });

        let this = Arc::clone(self);
        Ok(tokio::spawn(async move {
            info!("Player controller listening for element events");
            loop {
                tokio::select! {
                    () = this.cancel_token.cancelled() => {
                        info!("Player controller shutting down");
                        break;
                    }
                    event = rx.recv() => {
                        match event {
                            Ok(event) => this.handle_event(event).await,
                            Err(broadcast::error::RecvError::Lagged(n)) => {
                                debug!("Missed {} element events", n);
                            }
                            Err(broadcast::error::RecvError::Closed) => {
                                info!("Element event channel closed");
                                break;
                            }
                        }
                    }
                }
            }
        }))
    }

    /// Stop processing element events. The subscription is dropped with the task.
    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    /// Replace the playlist and the current index together.
    ///
    /// Deferred completions issued against the old playlist are invalidated.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidIndex`] if `current` does not point into
    /// `tracks`; nothing is changed in that case.
    pub async fn replace_playlist(&self, tracks: Vec<Track>, current: Option<usize>) -> Result<()> {
        if let Some(index) = current
            && index >= tracks.len()
        {
            return Err(CoreError::InvalidIndex {
                index,
                len: tracks.len(),
            });
        }

        let mut inner = self.inner.write().await;
        inner.playlist = Playlist::new(tracks);
        inner.current_index = current;
        inner.generation += 1;
        inner.throttle.reset();
        inner.consecutive_unlicensed = 0;
        info!(
            "Playlist replaced ({} tracks, current: {:?})",
            inner.playlist.len(),
            current
        );
        Ok(())
    }

    /// Switch playback to the track at `index`.
    ///
    /// Stops the element, clears lyrics, resolves and binds the new sources,
    /// then loads and plays. Lyrics are fetched in the background once
    /// playback has started.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidIndex`]/[`CoreError::EmptyPlaylist`] for a
    /// bad index, [`CoreError::ResolveFailure`] if no source could be resolved
    /// (playback stays stopped) and [`CoreError::PlaybackRejected`] if the
    /// element refused to start.
    #[allow(clippy::too_many_lines)]
    pub async fn play_at(self: &Arc<Self>, index: usize) -> Result<PlayAtOutcome> {
        let (ticket, track) = {
            let mut inner = self.inner.write().await;
            if inner.playlist.is_empty() {
                return Err(CoreError::EmptyPlaylist);
            }
            let track = inner.playlist.track(index)?.clone();

            self.element.pause();
            self.element.set_current_time(Duration::ZERO);

            inner.generation += 1;
            inner.current_index = Some(index);
            inner.lyrics = LyricTimeline::empty();
            inner.lyric_index = 0;
            inner.sources = None;
            inner.transport.phase = PlaybackPhase::Loading;
            inner.transport.is_playing = false;
            inner.transport.position = Duration::ZERO;
            inner.throttle.reset();

            let ticket = PlayTicket {
                index,
                generation: inner.generation,
            };
            (ticket, track)
        };

        info!("Playing #{}: {}", index, track);
        self.emit(PlayerEvent::TrackChanged {
            index,
            track: track.clone(),
        });

        let sources = match self.resolver.resolve(&track, &self.session).await {
            Ok(sources) => sources,
            Err(e) => {
                let mut inner = self.inner.write().await;
                if !inner.is_current(ticket) {
                    debug!("Discarding resolve failure for superseded #{}", index);
                    return Ok(PlayAtOutcome::Superseded);
                }
                inner.transport.phase = PlaybackPhase::Idle;
                inner.transport.is_loading = false;
                drop(inner);
                warn!("{}", e);
                self.emit(PlayerEvent::Error {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        {
            let mut inner = self.inner.write().await;
            if !inner.is_current(ticket) {
                debug!("Discarding sources resolved for superseded #{}", index);
                return Ok(PlayAtOutcome::Superseded);
            }
            self.element.bind_sources(&sources);
            self.element.load();
            inner.sources = Some(sources);
        }

        if let Err(e) = self.element.play().await {
            let mut inner = self.inner.write().await;
            if !inner.is_current(ticket) {
                return Ok(PlayAtOutcome::Superseded);
            }
            inner.transport.phase = PlaybackPhase::Errored;
            drop(inner);
            warn!("Element refused to play {}: {}", track, e);
            return Err(CoreError::PlaybackRejected {
                reason: e.to_string(),
            });
        }

        {
            let mut inner = self.inner.write().await;
            if !inner.is_current(ticket) {
                return Ok(PlayAtOutcome::Superseded);
            }
            if inner.transport.phase == PlaybackPhase::Loading {
                inner.transport.phase = PlaybackPhase::Playing;
            }
        }

        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.load_lyrics(ticket, &track.id).await;
        });

        Ok(PlayAtOutcome::Started)
    }

    /// Advance to the next track under the current mode.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyPlaylist`] or any error from [`play_at`](Self::play_at).
    pub async fn next(self: &Arc<Self>) -> Result<PlayAtOutcome> {
        let (mode, len, current) = self.navigation_snapshot().await?;
        // With nothing selected yet, "next" starts from the top
        let target = navigator::next(mode, len, current.unwrap_or(len - 1));
        self.play_at(target).await
    }

    /// Go back to the previous track under the current mode.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyPlaylist`] or any error from [`play_at`](Self::play_at).
    pub async fn previous(self: &Arc<Self>) -> Result<PlayAtOutcome> {
        let (mode, len, current) = self.navigation_snapshot().await?;
        let target = navigator::previous(mode, len, current.unwrap_or(0));
        self.play_at(target).await
    }

    /// Move on from the track at `failed`, never picking it again in random mode.
    async fn skip_failed(self: &Arc<Self>, failed: usize) -> Result<PlayAtOutcome> {
        let (mode, len, _) = self.navigation_snapshot().await?;
        self.play_at(navigator::skip_failed(mode, len, failed)).await
    }

    async fn navigation_snapshot(&self) -> Result<(PlaybackMode, usize, Option<usize>)> {
        let inner = self.inner.read().await;
        if inner.playlist.is_empty() {
            return Err(CoreError::EmptyPlaylist);
        }
        Ok((inner.mode, inner.playlist.len(), inner.current_index))
    }

    /// Apply a playback mode to the element and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings store rejects the write; the mode is
    /// applied regardless.
    pub async fn set_mode(&self, mode: PlaybackMode) -> Result<()> {
        self.inner.write().await.mode = mode;
        self.element.set_looping(mode.loops_track());
        info!("Playback mode set to {}", mode);
        self.emit(PlayerEvent::ModeChanged { mode });
        PlayerSettings::save_mode(self.settings.as_ref(), mode).await
    }

    /// Apply an output volume to the element and persist it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidVolume`] outside (0, 1], or an error if the
    /// settings store rejects the write.
    pub async fn set_volume(&self, volume: f64) -> Result<()> {
        if !(volume > 0.0 && volume <= 1.0) {
            return Err(CoreError::InvalidVolume { volume });
        }

        let metadata = {
            let mut inner = self.inner.write().await;
            inner.transport.volume = volume;
            inner
                .current_track()
                .cloned()
                .map(|track| (track, inner.transport.duration))
        };
        self.element.set_volume(volume);
        self.emit(PlayerEvent::VolumeChanged { volume });
        if let Some((track, duration)) = metadata {
            self.publish_metadata(&track, duration, volume);
        }

        PlayerSettings::save_volume(self.settings.as_ref(), volume).await
    }

    pub fn pause(&self) {
        self.element.pause();
    }

    /// Resume playback of the bound sources.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PlaybackRejected`] if the element refuses to play.
    pub async fn resume(&self) -> Result<()> {
        self.element.play().await.map_err(|e| CoreError::PlaybackRejected {
            reason: e.to_string(),
        })
    }

    pub fn seek(&self, position: Duration) {
        self.element.set_current_time(position);
    }

    pub async fn transport_state(&self) -> PlayerTransportState {
        self.inner.read().await.transport.clone()
    }

    pub async fn current_index(&self) -> Option<usize> {
        self.inner.read().await.current_index
    }

    pub async fn current_track(&self) -> Option<Track> {
        self.inner.read().await.current_track().cloned()
    }

    pub async fn mode(&self) -> PlaybackMode {
        self.inner.read().await.mode
    }

    pub async fn playlist(&self) -> Playlist {
        self.inner.read().await.playlist.clone()
    }

    pub async fn sources(&self) -> Option<SourceSet> {
        self.inner.read().await.sources.clone()
    }

    pub async fn lyrics(&self) -> LyricTimeline {
        self.inner.read().await.lyrics.clone()
    }

    /// The lyric line matching the last processed position
    pub async fn current_lyric(&self) -> Option<LyricLine> {
        let inner = self.inner.read().await;
        inner.lyrics.get(inner.lyric_index).cloned()
    }

    /// Primary URL and display metadata for saving the current track.
    pub async fn download_request(&self) -> Option<DownloadRequest> {
        let inner = self.inner.read().await;
        let track = inner.current_track()?.clone();
        let sources = inner.sources.as_ref()?;
        Some(DownloadRequest {
            url: sources.primary().to_string(),
            file_name: track.download_file_name(),
            track,
        })
    }

    async fn load_lyrics(&self, ticket: PlayTicket, track_id: &str) {
        let fetched = self.metadata.fetch_lyrics(track_id).await;

        let mut inner = self.inner.write().await;
        if !inner.is_current(ticket) {
            debug!("Discarding lyrics for superseded track {}", track_id);
            return;
        }

        match fetched {
            Ok(timeline) => {
                info!("Loaded {} lyric lines for {}", timeline.len(), track_id);
                inner.lyrics = timeline.clone();
                inner.lyric_index = 0;
                drop(inner);
                self.emit(PlayerEvent::LyricsLoaded { timeline });
            }
            Err(e) => {
                drop(inner);
                info!("No lyrics for {}: {}", track_id, e);
                self.emit(PlayerEvent::LyricsNotFound);
            }
        }
    }

    async fn handle_event(self: &Arc<Self>, event: ElementEvent) {
        match event {
            ElementEvent::Play => {
                {
                    let mut inner = self.inner.write().await;
                    inner.transport.is_playing = true;
                    if inner.transport.phase != PlaybackPhase::Idle {
                        inner.transport.phase = PlaybackPhase::Playing;
                    }
                }
                self.publish_playing(true);
                self.emit(PlayerEvent::PlaybackStarted);
            }
            ElementEvent::Pause => {
                {
                    let mut inner = self.inner.write().await;
                    inner.transport.is_playing = false;
                    if inner.transport.phase == PlaybackPhase::Playing {
                        inner.transport.phase = PlaybackPhase::Paused;
                    }
                }
                self.publish_playing(false);
                self.emit(PlayerEvent::PlaybackPaused);
            }
            ElementEvent::LoadStart | ElementEvent::Seeking => {
                self.set_loading(true).await;
            }
            ElementEvent::CanPlayThrough => {
                self.inner.write().await.consecutive_unlicensed = 0;
                self.set_loading(false).await;
            }
            ElementEvent::DurationChange(duration) => {
                let published = {
                    let mut inner = self.inner.write().await;
                    inner.transport.duration = duration;
                    inner
                        .current_track()
                        .cloned()
                        .map(|track| (track, inner.transport.volume))
                };
                self.emit(PlayerEvent::DurationChanged { duration });
                if let Some((track, volume)) = published
                    && !duration.is_zero()
                {
                    self.publish_metadata(&track, duration, volume);
                }
            }
            ElementEvent::TimeUpdate(position) => self.on_time_update(position).await,
            ElementEvent::Ended => self.on_ended().await,
            ElementEvent::SourceError {
                slot,
                src,
                current_src,
            } => self.on_source_error(slot, &src, &current_src).await,
        }
    }

    async fn set_loading(&self, loading: bool) {
        let changed = {
            let mut inner = self.inner.write().await;
            let changed = inner.transport.is_loading != loading;
            inner.transport.is_loading = loading;
            changed
        };
        if changed {
            self.emit(PlayerEvent::LoadingChanged { loading });
        }
    }

    async fn on_time_update(self: &Arc<Self>, position: Duration) {
        let line_changed = {
            let mut inner = self.inner.write().await;
            // Ticks from the previous track's path until the new one is bound
            if inner.transport.phase == PlaybackPhase::Loading {
                return;
            }
            match inner.throttle.offer(position) {
                Offer::Pass(position) => inner.apply_position(position),
                Offer::Schedule(deadline) => {
                    let this = Arc::clone(self);
                    let generation = inner.generation;
                    tokio::spawn(async move {
                        tokio::time::sleep_until(deadline).await;
                        this.release_held_position(generation).await;
                    });
                    return;
                }
                Offer::Held => return,
            }
        };
        self.emit_position(position, line_changed);
    }

    /// Apply the last tick held back by the throttle, unless the track changed since.
    async fn release_held_position(&self, generation: u64) {
        let (position, line_changed) = {
            let mut inner = self.inner.write().await;
            if inner.generation != generation {
                return;
            }
            let Some(position) = inner.throttle.take_trailing() else {
                return;
            };
            (position, inner.apply_position(position))
        };
        self.emit_position(position, line_changed);
    }

    fn emit_position(&self, position: Duration, line_changed: Option<(usize, LyricLine)>) {
        self.emit(PlayerEvent::PositionChanged { position });
        if let Some((index, line)) = line_changed {
            debug!("Lyric line {} at {:?}: {}", index, position, line.text);
            self.emit(PlayerEvent::LyricLineChanged { index, line });
        }
    }

    async fn on_ended(self: &Arc<Self>) {
        let mode = {
            let mut inner = self.inner.write().await;
            if inner.transport.phase == PlaybackPhase::Loading {
                debug!("Ignoring end of previous track");
                return;
            }
            inner.transport.phase = PlaybackPhase::Ended;
            inner.transport.is_playing = false;
            inner.mode
        };

        if mode.loops_track() {
            // The element normally loops by itself; restart if it did not
            self.element.set_current_time(Duration::ZERO);
            if let Err(e) = self.element.play().await {
                warn!("Failed to restart looping track: {}", e);
            }
            return;
        }

        if let Err(e) = self.next().await {
            warn!("Auto-advance after end of track failed: {}", e);
        }
    }

    async fn on_source_error(self: &Arc<Self>, slot: SourceSlot, src: &str, current_src: &str) {
        let failure = {
            let mut inner = self.inner.write().await;
            inner.transport.is_loading = false;
            self.classify_source_error(&mut inner, slot, src, current_src)
        };
        self.emit(PlayerEvent::LoadingChanged { loading: false });

        match failure {
            FinalSourceFailure::Ignored => {}
            FinalSourceFailure::Advance { track, index } => {
                self.report_unavailable(&track, src);
                if let Err(e) = self.skip_failed(index).await {
                    warn!("Auto-advance after unavailable source failed: {}", e);
                }
            }
            FinalSourceFailure::Exhausted(track) => {
                self.report_unavailable(&track, src);
                self.element.pause();
                warn!("Every track in the playlist failed to play, stopping");
                self.notify(Notification {
                    title: "Playback stopped".into(),
                    body: "No track in the playlist could be played.".into(),
                    icon: None,
                });
                self.emit(PlayerEvent::Stopped);
            }
        }
    }

    /// Decide whether a source error means the current track has no playable
    /// rights. Records the decision so the same track never advances twice.
    fn classify_source_error(
        &self,
        inner: &mut ControllerInner,
        slot: SourceSlot,
        src: &str,
        current_src: &str,
    ) -> FinalSourceFailure {
        let Some(sources) = inner.sources.as_ref() else {
            debug!("Source error with nothing bound: {}", src);
            return FinalSourceFailure::Ignored;
        };
        if slot != sources.final_slot() {
            // Earlier slots fall through to the next one inside the element
            debug!("Transient load error on {:?}: {}", slot, src);
            return FinalSourceFailure::Ignored;
        }
        if current_src.is_empty() || !is_stream_host(src, self.resolver.stream_host()) {
            return FinalSourceFailure::Ignored;
        }
        if sources.final_fallback() != src {
            debug!("Discarding source error from a previous track: {}", src);
            return FinalSourceFailure::Ignored;
        }
        if inner.unlicensed_generation == Some(inner.generation) {
            debug!("Source failure for this track already handled: {}", src);
            return FinalSourceFailure::Ignored;
        }
        let Some((index, track)) = inner
            .current_index
            .zip(inner.current_track().cloned())
        else {
            return FinalSourceFailure::Ignored;
        };

        inner.unlicensed_generation = Some(inner.generation);
        inner.consecutive_unlicensed += 1;
        inner.transport.is_playing = false;

        if inner.consecutive_unlicensed >= inner.playlist.len() {
            inner.consecutive_unlicensed = 0;
            inner.transport.phase = PlaybackPhase::Idle;
            FinalSourceFailure::Exhausted(track)
        } else {
            inner.transport.phase = PlaybackPhase::Errored;
            FinalSourceFailure::Advance { track, index }
        }
    }

    fn report_unavailable(&self, track: &Track, src: &str) {
        let error = CoreError::UnlicensedSource {
            track: track.name.clone(),
            src: src.to_string(),
        };
        warn!("{}", error);
        self.notify(Notification {
            title: format!("{} playback error", track.name),
            body: "The stream could not be loaded; the track may not be licensed for playback."
                .into(),
            icon: Some(track.album_art_url()),
        });
        self.emit(PlayerEvent::SourceUnavailable {
            track: track.clone(),
        });
    }

    fn notify(&self, notification: Notification) {
        if self.notifications_enabled {
            self.notifier.notify(notification);
        }
    }

    fn publish_playing(&self, playing: bool) {
        if let Some(controls) = &self.media_controls {
            controls.set_playing(playing);
        }
    }

    fn publish_metadata(&self, track: &Track, duration: Duration, volume: f64) {
        if let Some(controls) = &self.media_controls {
            controls.set_metadata(track, duration, volume);
        }
    }

    fn emit(&self, event: PlayerEvent) {
        let _ = self.event_tx.send(event);
    }
}

fn is_stream_host(src: &str, host: &str) -> bool {
    Url::parse(src)
        .ok()
        .and_then(|url| url.host_str().map(|h| h.eq_ignore_ascii_case(host)))
        .unwrap_or(false)
}
