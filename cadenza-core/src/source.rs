//! Ranked stream sources and the session identifier they are issued for.

use crate::error::{CoreError, Result};
use rand::Rng;

/// Maximum number of source slots on the rendering element.
pub const MAX_SOURCES: usize = 3;

/// One of the ranked URL bindings on the rendering element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceSlot {
    Primary,
    Fallback1,
    Fallback2,
}

impl SourceSlot {
    /// Slots in priority order.
    pub const ALL: [Self; MAX_SOURCES] = [Self::Primary, Self::Fallback1, Self::Fallback2];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Fallback1 => 1,
            Self::Fallback2 => 2,
        }
    }
}

/// Candidate stream URLs for one track, primary first.
///
/// Always holds between one and [`MAX_SOURCES`] URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    urls: Vec<String>,
}

impl SourceSet {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidSourceSet`] for zero or more than three URLs.
    pub fn new(urls: Vec<String>) -> Result<Self> {
        if urls.is_empty() || urls.len() > MAX_SOURCES {
            return Err(CoreError::InvalidSourceSet { count: urls.len() });
        }
        Ok(Self { urls })
    }

    #[must_use]
    pub fn primary(&self) -> &str {
        &self.urls[0]
    }

    /// The last-priority URL. The controller watches this slot for failures.
    #[must_use]
    pub fn final_fallback(&self) -> &str {
        &self.urls[self.urls.len() - 1]
    }

    /// The slot the final fallback is bound to.
    #[must_use]
    pub fn final_slot(&self) -> SourceSlot {
        SourceSlot::ALL[self.urls.len() - 1]
    }

    #[must_use]
    pub fn get(&self, slot: SourceSlot) -> Option<&str> {
        self.urls.get(slot.index()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SourceSlot, &str)> {
        SourceSlot::ALL
            .into_iter()
            .zip(self.urls.iter().map(String::as_str))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Per-process session identifier sent along with stream requests.
///
/// Ten decimal digits drawn from the thread-local CSPRNG. It only serves as a
/// cache-busting client identifier and carries no authority.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    #[must_use]
    pub fn generate() -> Self {
        let value: u64 = rand::rng().random_range(1_000_000_000..10_000_000_000);
        Self(value.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
