//! Data source adapter: one GET of the playlist endpoint, validated at the
//! boundary, with a placeholder snapshot substituted on any failure.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::ACCEPT;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::WidgetConfig;
use crate::fallback::placeholder_snapshot;
use crate::protocol::{PlaylistResponse, Snapshot};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("endpoint returned status {0}")]
    Status(u16),
    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("endpoint reported failure: {0}")]
    Rejected(String),
    #[error("response has no data array")]
    MissingData,
}

/// Result of one load attempt as seen by the widget.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Data straight from the endpoint.
    Live(Snapshot),
    /// Endpoint failed; placeholder data stands in.
    Fallback(Snapshot),
    /// Endpoint failed and fallback is disabled.
    Unavailable(FetchError),
}

impl LoadOutcome {
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            Self::Live(s) | Self::Fallback(s) => Some(s),
            Self::Unavailable(_) => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Anything the widget can pull snapshots from.
pub trait SnapshotSource: Send + Sync + 'static {
    fn load(&self) -> impl Future<Output = LoadOutcome> + Send;
}

pub struct PlaylistSource {
    client: reqwest::Client,
    endpoint: String,
    allow_fallback: bool,
    fallback_size: usize,
}

impl PlaylistSource {
    pub fn new(config: &WidgetConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("playlist-history/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            allow_fallback: config.allow_fallback,
            fallback_size: config.fallback_size,
        })
    }

    /// Single network read, no fallback.
    pub async fn fetch(&self) -> Result<Snapshot, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        parse_response(&body)
    }
}

impl SnapshotSource for PlaylistSource {
    async fn load(&self) -> LoadOutcome {
        match self.fetch().await {
            Ok(snapshot) => {
                debug!("[playlist] loaded {} entries from {}", snapshot.len(), self.endpoint);
                LoadOutcome::Live(snapshot)
            }
            Err(e) if self.allow_fallback => {
                warn!(
                    "[playlist] fetch from {} failed, using placeholder data: {}",
                    self.endpoint, e
                );
                LoadOutcome::Fallback(placeholder_snapshot(Utc::now(), self.fallback_size))
            }
            Err(e) => {
                error!("[playlist] fetch from {} failed: {}", self.endpoint, e);
                LoadOutcome::Unavailable(e)
            }
        }
    }
}

/// Validate a response body against the `{ success, data }` envelope.
pub fn parse_response(body: &[u8]) -> Result<Snapshot, FetchError> {
    let payload: PlaylistResponse = serde_json::from_slice(body)?;
    if !payload.success {
        return Err(FetchError::Rejected(
            payload.error.unwrap_or_else(|| "no reason given".to_string()),
        ));
    }
    payload.data.ok_or(FetchError::MissingData)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_success_envelope_as_is() {
        let body = br#"{"success":true,"data":[
            {"timestamp":"2024-03-01T10:02:00Z","artist":"Queen","title":"Bohemian Rhapsody","album":"A Night at the Opera","year":1975},
            {"timestamp":"2024-03-01T10:00:00Z","artist":"Nirvana","title":"Smells Like Teen Spirit","album":"Nevermind","year":1991}
        ],"count":2}"#;
        let snapshot = parse_response(body).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].artist.as_deref(), Some("Queen"));
        assert_eq!(snapshot[1].year, Some(1991));
    }

    #[test]
    fn loosely_typed_year_keeps_the_live_snapshot() {
        let body = br#"{"success":true,"data":[
            {"timestamp":"2024-03-01T10:02:00Z","artist":"Queen","title":"Bohemian Rhapsody","year":1975},
            {"timestamp":"2024-03-01T10:00:00Z","artist":"Nirvana","title":"Smells Like Teen Spirit","year":"1991"},
            {"timestamp":"2024-03-01T09:57:00Z","artist":"Eagles","title":"Hotel California","year":"n/a"}
        ]}"#;
        let snapshot = parse_response(body).unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[1].year, Some(1991));
        assert_eq!(snapshot[2].year, None);
        assert_eq!(snapshot[2].artist.as_deref(), Some("Eagles"));
    }

    #[test]
    fn rejects_failure_flag() {
        let err = parse_response(br#"{"success":false,"error":"table offline"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Rejected(ref m) if m == "table offline"));
    }

    #[test]
    fn rejects_missing_data_and_bad_shapes() {
        assert!(matches!(
            parse_response(br#"{"success":true}"#),
            Err(FetchError::MissingData)
        ));
        assert!(matches!(
            parse_response(br#"{"data":[]}"#),
            Err(FetchError::Malformed(_))
        ));
        assert!(matches!(
            parse_response(br#"{"success":true,"data":[{"artist":"Queen"}]}"#),
            Err(FetchError::Malformed(_))
        ));
        assert!(matches!(parse_response(b"<html>"), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn empty_data_is_a_valid_snapshot() {
        let snapshot = parse_response(br#"{"success":true,"data":[]}"#).unwrap();
        assert!(snapshot.is_empty());
    }
}
