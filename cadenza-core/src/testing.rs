//! In-process fakes for the controller's collaborators.

use crate::element::{ElementEvent, RenderingElement};
use crate::error::CoreError;
use crate::provider::{MediaControls, MetadataClient, Notification, Notifier, StreamToken};
use crate::source::{SessionToken, SourceSet};
use crate::timeline::{LyricLine, LyricTimeline};
use crate::track::Track;
use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{broadcast, watch};

/// `count` tracks named `track{i}` with one album and one singer each.
pub fn tracks(count: usize) -> Vec<Track> {
    (0..count)
        .map(|i| {
            Track::new(format!("track{i}"), format!("track{i} name"), format!("C400track{i}.m4a"))
                .with_album(format!("album{i}"), format!("album{i} name"))
                .with_singer(format!("singer{i}"))
        })
        .collect()
}

/// Let spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}

/// Wait for `check` to hold, giving background tasks a chance to run between tries.
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let mut satisfied = false;
    for _ in 0..100 {
        if check().await {
            satisfied = true;
            break;
        }
        settle().await;
    }
    assert!(satisfied, "condition never became true");
}

/// Keyed gates that hold a call until released.
#[derive(Default)]
struct Gates {
    held: Mutex<HashMap<String, watch::Sender<bool>>>,
}

impl Gates {
    fn hold(&self, key: &str) {
        let (tx, _) = watch::channel(false);
        self.held.lock().unwrap().insert(key.to_string(), tx);
    }

    fn release(&self, key: &str) {
        if let Some(tx) = self.held.lock().unwrap().remove(key) {
            tx.send_replace(true);
        }
    }

    async fn pass(&self, key: &str) {
        let rx = self.held.lock().unwrap().get(key).map(watch::Sender::subscribe);
        if let Some(mut rx) = rx {
            let _ = rx.wait_for(|released| *released).await;
        }
    }
}

/// Metadata client that numbers every credential it issues.
///
/// Stream tokens look like `vkey-{track}-{n}` and session credentials like
/// `session-{n}`, both counting from 1. Lyrics for a track have lines at
/// 0s, 5s, 10s and 15s with text `{track} line {i}`.
#[derive(Default)]
pub struct FakeMetadata {
    stream_tokens: AtomicUsize,
    session_credentials: AtomicUsize,
    fail_stream: AtomicBool,
    fail_session: AtomicBool,
    stream_gates: Gates,
    lyric_gates: Gates,
}

impl FakeMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_credentials_issued(&self) -> usize {
        self.session_credentials.load(Ordering::SeqCst)
    }

    pub fn fail_stream_tokens(&self, fail: bool) {
        self.fail_stream.store(fail, Ordering::SeqCst);
    }

    pub fn fail_session_credentials(&self, fail: bool) {
        self.fail_session.store(fail, Ordering::SeqCst);
    }

    pub fn hold_stream_token(&self, track_id: &str) {
        self.stream_gates.hold(track_id);
    }

    pub fn release_stream_token(&self, track_id: &str) {
        self.stream_gates.release(track_id);
    }

    pub fn hold_lyrics(&self, track_id: &str) {
        self.lyric_gates.hold(track_id);
    }

    pub fn release_lyrics(&self, track_id: &str) {
        self.lyric_gates.release(track_id);
    }
}

#[async_trait]
impl MetadataClient for FakeMetadata {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn resolve_stream_token(
        &self,
        _session: &SessionToken,
        track: &Track,
    ) -> Result<StreamToken, CoreError> {
        self.stream_gates.pass(&track.id).await;
        if self.fail_stream.load(Ordering::SeqCst) {
            return Err(CoreError::provider("fake", "stream token refused"));
        }
        let n = self.stream_tokens.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(StreamToken {
            token: format!("vkey-{}-{n}", track.id),
        })
    }

    async fn fetch_lyrics(&self, track_id: &str) -> Result<LyricTimeline, CoreError> {
        self.lyric_gates.pass(track_id).await;
        Ok(LyricTimeline::new(
            (0..4u64)
                .map(|i| LyricLine::new(Duration::from_secs(i * 5), format!("{track_id} line {i}")))
                .collect(),
        ))
    }

    async fn issue_session_credential(&self, _session: &SessionToken) -> Result<String, CoreError> {
        if self.fail_session.load(Ordering::SeqCst) {
            return Err(CoreError::provider("fake", "session credential refused"));
        }
        let n = self.session_credentials.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("session-{n}"))
    }
}

#[derive(Default)]
struct ElementState {
    bound: Vec<SourceSet>,
    loads: usize,
    plays: usize,
    pauses: usize,
    current_time: Duration,
    volume: f64,
    looping: bool,
}

/// Rendering element that records commands. Tests push lifecycle events with
/// [`FakeElement::emit`].
pub struct FakeElement {
    state: Mutex<ElementState>,
    fail_play: AtomicBool,
    tx: broadcast::Sender<ElementEvent>,
}

impl Default for FakeElement {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            state: Mutex::new(ElementState::default()),
            fail_play: AtomicBool::new(false),
            tx,
        }
    }
}

impl FakeElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: ElementEvent) {
        let _ = self.tx.send(event);
    }

    pub fn fail_play(&self, fail: bool) {
        self.fail_play.store(fail, Ordering::SeqCst);
    }

    pub fn last_bound(&self) -> Option<SourceSet> {
        self.state.lock().unwrap().bound.last().cloned()
    }

    pub fn bind_count(&self) -> usize {
        self.state.lock().unwrap().bound.len()
    }

    pub fn load_count(&self) -> usize {
        self.state.lock().unwrap().loads
    }

    pub fn play_count(&self) -> usize {
        self.state.lock().unwrap().plays
    }

    pub fn pause_count(&self) -> usize {
        self.state.lock().unwrap().pauses
    }

    pub fn volume(&self) -> f64 {
        self.state.lock().unwrap().volume
    }

    pub fn is_looping(&self) -> bool {
        self.state.lock().unwrap().looping
    }
}

#[async_trait]
impl RenderingElement for FakeElement {
    fn bind_sources(&self, sources: &SourceSet) {
        self.state.lock().unwrap().bound.push(sources.clone());
    }

    fn load(&self) {
        self.state.lock().unwrap().loads += 1;
    }

    async fn play(&self) -> Result<(), CoreError> {
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(CoreError::PlaybackRejected {
                reason: "autoplay blocked".into(),
            });
        }
        self.state.lock().unwrap().plays += 1;
        Ok(())
    }

    fn pause(&self) {
        self.state.lock().unwrap().pauses += 1;
    }

    fn current_time(&self) -> Duration {
        self.state.lock().unwrap().current_time
    }

    fn set_current_time(&self, position: Duration) {
        self.state.lock().unwrap().current_time = position;
    }

    fn set_volume(&self, volume: f64) {
        self.state.lock().unwrap().volume = volume;
    }

    fn set_looping(&self, looping: bool) {
        self.state.lock().unwrap().looping = looping;
    }

    fn subscribe(&self) -> broadcast::Receiver<ElementEvent> {
        self.tx.subscribe()
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.sent.lock().unwrap().push(notification);
    }
}

#[derive(Default)]
pub struct RecordingMediaControls {
    positions: Mutex<Vec<Duration>>,
    metadata: Mutex<Option<(String, Duration)>>,
    playing: Mutex<Option<bool>>,
}

impl RecordingMediaControls {
    pub fn positions(&self) -> Vec<Duration> {
        self.positions.lock().unwrap().clone()
    }

    /// Track id and duration of the last metadata publish
    pub fn last_metadata(&self) -> Option<(String, Duration)> {
        self.metadata.lock().unwrap().clone()
    }

    pub fn last_playing(&self) -> Option<bool> {
        *self.playing.lock().unwrap()
    }
}

impl MediaControls for RecordingMediaControls {
    fn set_position(&self, position: Duration) {
        self.positions.lock().unwrap().push(position);
    }

    fn set_metadata(&self, track: &Track, duration: Duration, _volume: f64) {
        *self.metadata.lock().unwrap() = Some((track.id.clone(), duration));
    }

    fn set_playing(&self, playing: bool) {
        *self.playing.lock().unwrap() = Some(playing);
    }
}
