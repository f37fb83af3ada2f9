//! Lyric timeline and the index that keeps it aligned with playback.

use std::time::Duration;

/// A single line of lyrics with its start time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricLine {
    pub time: Duration,
    pub text: String,
}

impl LyricLine {
    pub fn new(time: Duration, text: impl Into<String>) -> Self {
        Self {
            time,
            text: text.into(),
        }
    }
}

/// Ordered lyric lines with strictly increasing timestamps. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LyricTimeline {
    lines: Vec<LyricLine>,
}

impl LyricTimeline {
    /// Build a timeline from arbitrary lines.
    ///
    /// Lines are sorted by time; when two lines share a timestamp the first
    /// one wins so that timestamps stay strictly increasing.
    #[must_use]
    pub fn new(mut lines: Vec<LyricLine>) -> Self {
        lines.sort_by_key(|l| l.time);
        lines.dedup_by_key(|l| l.time);
        Self { lines }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&LyricLine> {
        self.lines.get(index)
    }

    /// Locate the active line for `position`, starting the search at `last_index`.
    ///
    /// See [`locate`].
    #[must_use]
    pub fn locate(&self, position: Duration, last_index: usize) -> Option<usize> {
        locate(position, last_index, &self.lines)
    }
}

/// Find the interval `[lines[i].time, lines[i + 1].time]` containing `position`.
///
/// The interval at `last_index` is tried first since playback normally stays
/// on the same line between ticks. After that the search continues forward
/// from `last_index + 1` (forward seek or skipped ticks) and finally wraps to
/// the start (backward seek or loop restart).
///
/// Returns `None` when `position` lies before the first or after the last
/// timestamp. Callers keep their previous index in that case.
#[must_use]
pub fn locate(position: Duration, last_index: usize, lines: &[LyricLine]) -> Option<usize> {
    let contains = |i: usize| {
        lines
            .get(i)
            .zip(i.checked_add(1).and_then(|j| lines.get(j)))
            .is_some_and(|(start, end)| start.time <= position && position <= end.time)
    };

    if contains(last_index) {
        return Some(last_index);
    }

    let interval_count = lines.len().saturating_sub(1);
    (last_index.saturating_add(1)..interval_count)
        .find(|&i| contains(i))
        .or_else(|| (0..interval_count).find(|&i| contains(i)))
}
