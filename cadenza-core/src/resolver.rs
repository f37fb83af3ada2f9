//! Builds the ranked stream URLs for a track.
//!
//! The primary URL uses a credential issued for that track alone. The
//! fallbacks use a session-wide credential that is cached and refreshed
//! once it gets older than the configured maximum age.

use crate::config::StreamConfig;
use crate::error::{CoreError, Result};
use crate::provider::MetadataClient;
use crate::source::{SessionToken, SourceSet};
use crate::track::Track;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct CachedCredential {
    value: String,
    fetched_at: Instant,
}

impl CachedCredential {
    fn is_stale(&self, max_age: Duration) -> bool {
        self.fetched_at.elapsed() >= max_age
    }
}

pub struct SourceResolver {
    metadata: Arc<dyn MetadataClient>,
    stream: StreamConfig,
    session_credential: RwLock<Option<CachedCredential>>,
}

impl SourceResolver {
    #[must_use]
    pub fn new(metadata: Arc<dyn MetadataClient>, stream: StreamConfig) -> Self {
        Self {
            metadata,
            stream,
            session_credential: RwLock::new(None),
        }
    }

    /// Host every stream URL points at.
    #[must_use]
    pub fn stream_host(&self) -> &str {
        &self.stream.host
    }

    /// Get the session-wide credential, fetching it if missing or stale.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's error when a fresh credential is needed and
    /// cannot be issued.
    pub async fn session_credential(&self, session: &SessionToken) -> Result<String> {
        let max_age = self.stream.session_credential_max_age();
        {
            let guard = self.session_credential.read().await;
            if let Some(ref cached) = *guard
                && !cached.is_stale(max_age)
            {
                return Ok(cached.value.clone());
            }
        }

        info!("Fetching session credential from {}", self.metadata.name());
        let value = self.metadata.issue_session_credential(session).await?;
        *self.session_credential.write().await = Some(CachedCredential {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    /// Resolve the ranked source set for `track`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ResolveFailure`] if either credential cannot be
    /// obtained. Credentials from earlier tracks are never reused for the
    /// primary stream.
    pub async fn resolve(&self, track: &Track, session: &SessionToken) -> Result<SourceSet> {
        let failure = |e: CoreError| CoreError::ResolveFailure {
            track: track.name.clone(),
            reason: e.to_string(),
        };

        let stream_token = self
            .metadata
            .resolve_stream_token(session, track)
            .await
            .map_err(failure)?;
        let session_credential = self.session_credential(session).await.map_err(failure)?;

        let StreamConfig {
            scheme,
            host,
            primary_from_tag,
            fallback_from_tag,
            fallback_prefixes,
            ..
        } = &self.stream;

        let mut urls = Vec::with_capacity(1 + fallback_prefixes.len());
        urls.push(format!(
            "{scheme}://{host}/{}?vkey={}&guid={session}&uin=0&fromtag={primary_from_tag}",
            track.file_name, stream_token.token
        ));
        urls.extend(fallback_prefixes.iter().map(|prefix| {
            format!(
                "{scheme}://{host}/{prefix}{}.mp3?vkey={session_credential}&guid={session}&fromtag={fallback_from_tag}",
                track.id
            )
        }));

        debug!("Resolved {} sources for {}", urls.len(), track.name);
        SourceSet::new(urls)
    }
}
