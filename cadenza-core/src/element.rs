//! Abstraction over the platform audio-playback primitive.
//!
//! The element owns up to three source slots (see [`SourceSet`]). When the
//! primary slot fails it moves on to the next slot by itself; the controller
//! only produces the ranked list and watches the final slot for errors.

use crate::error::CoreError;
use crate::source::{SourceSet, SourceSlot};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::broadcast;

/// Lifecycle events emitted by a rendering element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementEvent {
    Play,
    Pause,
    LoadStart,
    Seeking,
    /// Enough data is buffered to play through
    CanPlayThrough,
    DurationChange(Duration),
    TimeUpdate(Duration),
    Ended,
    /// A bound source slot failed to load
    SourceError {
        slot: SourceSlot,
        /// URL the failing slot was bound to
        src: String,
        /// URL the element was playing from, empty when nothing was selected
        current_src: String,
    },
}

#[async_trait]
pub trait RenderingElement: Send + Sync {
    /// Bind the ranked URLs to the source slots, clearing any unused slot.
    fn bind_sources(&self, sources: &SourceSet);

    /// Begin loading from the bound sources.
    fn load(&self);

    /// Start playback, resolving once playback has begun.
    async fn play(&self) -> Result<(), CoreError>;

    fn pause(&self);

    fn current_time(&self) -> Duration;

    fn set_current_time(&self, position: Duration);

    fn set_volume(&self, volume: f64);

    fn set_looping(&self, looping: bool);

    /// Subscribe to lifecycle events.
    fn subscribe(&self) -> broadcast::Receiver<ElementEvent>;
}
