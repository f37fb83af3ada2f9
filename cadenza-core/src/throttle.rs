use std::time::Duration;
use tokio::time::Instant;

/// Rate limiter that fires on both edges of its window.
///
/// The first value passes immediately and opens a window of `interval`.
/// Values arriving inside the window are held; only the latest is kept, and
/// the caller releases it with [`take_trailing`](Self::take_trailing) once the
/// window closes.
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    interval: Duration,
    last: Option<Instant>,
    pending: Option<T>,
}

/// What the caller should do with an offered value.
#[derive(Debug, PartialEq, Eq)]
pub enum Offer<T> {
    /// Process the value now
    Pass(T),
    /// The value is held. Call [`Throttle::take_trailing`] at the deadline.
    Schedule(Instant),
    /// The value replaced one that is already scheduled
    Held,
}

impl<T> Throttle<T> {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
            pending: None,
        }
    }

    pub fn offer(&mut self, value: T) -> Offer<T> {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => {
                if self.pending.replace(value).is_some() {
                    Offer::Held
                } else {
                    Offer::Schedule(last + self.interval)
                }
            }
            _ => {
                self.last = Some(now);
                self.pending = None;
                Offer::Pass(value)
            }
        }
    }

    /// Release the held value, opening a new window if there was one.
    pub fn take_trailing(&mut self) -> Option<T> {
        let value = self.pending.take()?;
        self.last = Some(Instant::now());
        Some(value)
    }

    /// Forget the window and any held value.
    pub fn reset(&mut self) {
        self.last = None;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_throttle_holds_calls_inside_window() {
        let start = Instant::now();
        let mut throttle = Throttle::new(Duration::from_millis(800));
        assert_eq!(throttle.offer(1), Offer::Pass(1));
        assert_eq!(
            throttle.offer(2),
            Offer::Schedule(start + Duration::from_millis(800))
        );

        tokio::time::advance(Duration::from_millis(799)).await;
        assert_eq!(throttle.offer(3), Offer::Held);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(throttle.offer(4), Offer::Pass(4));
        assert_eq!(throttle.take_trailing(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trailing_value_is_the_latest() {
        let mut throttle = Throttle::new(Duration::from_millis(800));
        assert_eq!(throttle.offer(1), Offer::Pass(1));
        assert!(matches!(throttle.offer(2), Offer::Schedule(_)));
        assert_eq!(throttle.offer(3), Offer::Held);

        tokio::time::advance(Duration::from_millis(800)).await;
        assert_eq!(throttle.take_trailing(), Some(3));
        assert_eq!(throttle.take_trailing(), None);

        // Releasing opens a fresh window
        assert!(matches!(throttle.offer(5), Offer::Schedule(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_lets_next_call_through() {
        let mut throttle = Throttle::new(Duration::from_secs(10));
        assert_eq!(throttle.offer(1), Offer::Pass(1));
        assert!(matches!(throttle.offer(2), Offer::Schedule(_)));
        throttle.reset();
        assert_eq!(throttle.take_trailing(), None);
        assert_eq!(throttle.offer(3), Offer::Pass(3));
    }
}
