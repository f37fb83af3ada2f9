//! QQ Music implementation of the metadata collaborator.
//!
//! Three endpoints are used:
//! - `fcg_music_express_mobile3.fcg` issues a per-track stream token (vkey)
//! - `fcg_musicexpress.fcg` issues the session-wide key used by the fallback streams
//! - `fcg_query_lyric_new.fcg` returns the LRC lyric text

pub mod error;
pub mod lyrics;

pub use error::QqMusicError;

use async_trait::async_trait;
use cadenza_core::{ApiConfig, CoreError, LyricTimeline, MetadataClient, SessionToken, StreamToken, Track};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const PROVIDER_NAME: &str = "qqmusic";

/// Client id expected by the stream token endpoint
const STREAM_TOKEN_CID: &str = "205361747";

/// The lyric endpoint rejects requests without a player page referer
const LYRIC_REFERER: &str = "https://y.qq.com/portal/player.html";

#[derive(Debug, Deserialize)]
struct StreamTokenResponse {
    #[serde(default)]
    code: i64,
    data: Option<StreamTokenData>,
}

#[derive(Debug, Deserialize)]
struct StreamTokenData {
    #[serde(default)]
    items: Vec<StreamTokenItem>,
}

#[derive(Debug, Deserialize)]
struct StreamTokenItem {
    #[serde(default)]
    vkey: String,
}

#[derive(Debug, Deserialize)]
struct SessionKeyResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    key: String,
}

#[derive(Debug, Deserialize)]
struct LyricResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    retcode: i64,
    #[serde(default)]
    lyric: String,
}

/// HTTP client for the QQ Music web endpoints
pub struct QqMusicClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl QqMusicClient {
    /// Create a client with the timeout and retry count from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &ApiConfig) -> Result<Self, QqMusicError> {
        let base_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("Cadenza/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(base_client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn stream_token_url(&self, session: &SessionToken, track: &Track) -> String {
        format!(
            "{}/base/fcgi-bin/fcg_music_express_mobile3.fcg?format=json&cid={STREAM_TOKEN_CID}&uin=0&songmid={}&filename={}&guid={session}",
            self.base_url,
            urlencoding::encode(&track.id),
            urlencoding::encode(&track.file_name),
        )
    }

    fn session_key_url(&self, session: &SessionToken) -> String {
        format!(
            "{}/base/fcgi-bin/fcg_musicexpress.fcg?json=3&guid={session}&format=json",
            self.base_url
        )
    }

    fn lyric_url(&self, track_id: &str) -> String {
        format!(
            "{}/lyric/fcgi-bin/fcg_query_lyric_new.fcg?songmid={}&format=json&nobase64=1&g_tk=5381",
            self.base_url,
            urlencoding::encode(track_id)
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        referer: Option<&str>,
    ) -> Result<T, QqMusicError> {
        debug!("QQ Music GET: {}", url);

        let mut request = self.client.get(url);
        if let Some(referer) = referer {
            request = request.header(reqwest::header::REFERER, referer);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            warn!("QQ Music returned status: {}", response.status());
            return Err(QqMusicError::Status {
                status: response.status(),
            });
        }

        let body = response.text().await?;
        parse_body(&body)
    }
}

/// Parse a response body, unwrapping a JSONP callback if the endpoint sent one.
fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, QqMusicError> {
    let body = body.trim();
    let json = match (body.find('('), body.strip_suffix(')')) {
        (Some(open), Some(inner)) if !body.starts_with('{') => &inner[open + 1..],
        _ => body,
    };
    Ok(serde_json::from_str(json)?)
}

fn stream_token_from(response: StreamTokenResponse) -> Result<StreamToken, QqMusicError> {
    if response.code != 0 {
        return Err(QqMusicError::Api {
            code: response.code,
        });
    }
    response
        .data
        .and_then(|data| data.items.into_iter().next())
        .map(|item| item.vkey)
        .filter(|vkey| !vkey.is_empty())
        .map(|token| StreamToken { token })
        .ok_or(QqMusicError::MissingField { field: "vkey" })
}

fn session_key_from(response: SessionKeyResponse) -> Result<String, QqMusicError> {
    if response.code != 0 {
        return Err(QqMusicError::Api {
            code: response.code,
        });
    }
    if response.key.is_empty() {
        return Err(QqMusicError::MissingField { field: "key" });
    }
    Ok(response.key)
}

#[async_trait]
impl MetadataClient for QqMusicClient {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn resolve_stream_token(
        &self,
        session: &SessionToken,
        track: &Track,
    ) -> Result<StreamToken, CoreError> {
        info!("Requesting stream token for {}", track);
        let response: StreamTokenResponse = self
            .get_json(&self.stream_token_url(session, track), None)
            .await?;
        Ok(stream_token_from(response)?)
    }

    async fn fetch_lyrics(&self, track_id: &str) -> Result<LyricTimeline, CoreError> {
        info!("Fetching lyrics for {}", track_id);
        let response: LyricResponse = self
            .get_json(&self.lyric_url(track_id), Some(LYRIC_REFERER))
            .await?;

        // retcode -1901 means the track has no lyrics
        if response.code != 0 || response.retcode != 0 {
            debug!(
                "Lyric endpoint returned code {} / retcode {} for {}",
                response.code, response.retcode, track_id
            );
            return Err(CoreError::LyricsNotFound {
                track_id: track_id.to_string(),
            });
        }

        lyrics::parse_lyric_payload(track_id, &response.lyric)
    }

    async fn issue_session_credential(&self, session: &SessionToken) -> Result<String, CoreError> {
        let response: SessionKeyResponse = self.get_json(&self.session_key_url(session), None).await?;
        Ok(session_key_from(response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> QqMusicClient {
        QqMusicClient::new(&ApiConfig {
            base_url: "https://c.y.qq.com/".into(),
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_urls() {
        let client = client();
        let session = SessionToken::from("1234567890");
        let track = Track::new("003mid", "Song", "C400003mid.m4a");

        assert_eq!(
            client.stream_token_url(&session, &track),
            "https://c.y.qq.com/base/fcgi-bin/fcg_music_express_mobile3.fcg?format=json&cid=205361747&uin=0&songmid=003mid&filename=C400003mid.m4a&guid=1234567890"
        );
        assert_eq!(
            client.session_key_url(&session),
            "https://c.y.qq.com/base/fcgi-bin/fcg_musicexpress.fcg?json=3&guid=1234567890&format=json"
        );
        assert_eq!(
            client.lyric_url("003mid"),
            "https://c.y.qq.com/lyric/fcgi-bin/fcg_query_lyric_new.fcg?songmid=003mid&format=json&nobase64=1&g_tk=5381"
        );
    }

    #[test]
    fn test_stream_token_response() {
        let body = r#"{"code":0,"cid":205361747,"data":{"expiration":80400,"items":[{"subcode":0,"songmid":"003mid","filename":"C400003mid.m4a","vkey":"ABCDEF"}]}}"#;
        let token = stream_token_from(parse_body(body).unwrap()).unwrap();
        assert_eq!(token.token, "ABCDEF");
    }

    #[test]
    fn test_empty_vkey_is_missing() {
        let body = r#"{"code":0,"data":{"items":[{"vkey":""}]}}"#;
        assert!(matches!(
            stream_token_from(parse_body(body).unwrap()),
            Err(QqMusicError::MissingField { field: "vkey" })
        ));
    }

    #[test]
    fn test_api_error_code() {
        let body = r#"{"code":-100}"#;
        assert!(matches!(
            session_key_from(parse_body(body).unwrap()),
            Err(QqMusicError::Api { code: -100 })
        ));
    }

    #[test]
    fn test_session_key_from_jsonp() {
        let body = r#"jsonCallback({"code":0,"sip":["http://dl.stream.qqmusic.qq.com/"],"key":"KEY123"})"#;
        assert_eq!(session_key_from(parse_body(body).unwrap()).unwrap(), "KEY123");
    }

    #[test]
    fn test_qqmusic_error_becomes_provider_failure() {
        let err: CoreError = QqMusicError::MissingField { field: "key" }.into();
        assert!(matches!(err, CoreError::ProviderFailed { provider, .. } if provider == "qqmusic"));
    }
}
