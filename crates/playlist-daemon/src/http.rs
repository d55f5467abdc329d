use crate::store::HistoryStore;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use playlist_proto::config::HttpConfig;
use playlist_proto::filter::{FilterField, FilterState};
use playlist_proto::protocol::{format_timestamp, HealthStatus, PlaylistResponse};
use playlist_proto::render::{escape_html, render_view};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info};

#[derive(Clone)]
struct HttpState {
    store: Arc<HistoryStore>,
    default_limit: usize,
    max_limit: usize,
}

impl HttpState {
    fn limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    #[serde(default)]
    artist: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    album: String,
    #[serde(default)]
    year: String,
    limit: Option<usize>,
}

impl SearchParams {
    fn filters(&self) -> FilterState {
        let mut filters = FilterState::new();
        filters.set(FilterField::Artist, &self.artist);
        filters.set(FilterField::Title, &self.title);
        filters.set(FilterField::Album, &self.album);
        filters.set(FilterField::Year, &self.year);
        filters
    }
}

pub fn router(store: Arc<HistoryStore>, config: &HttpConfig) -> Router {
    let state = HttpState {
        store,
        default_limit: config.default_limit,
        max_limit: config.max_limit,
    };

    Router::new()
        .route("/", get(index))
        .route("/api/playlist", get(get_playlist))
        .route("/api/playlist/search", get(search_playlist))
        .route("/api/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn start_server(
    store: Arc<HistoryStore>,
    config: HttpConfig,
) -> tokio::task::JoinHandle<anyhow::Result<()>> {
    tokio::spawn(async move {
        let app = router(store, &config);

        let addr = format!("{}:{}", config.bind_address, config.port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            error!("[http] failed to bind {}: {}", addr, e);
            anyhow::anyhow!("failed to bind {}: {}", addr, e)
        })?;

        info!("[http] playlist API listening on http://{}", addr);

        axum::serve(listener, app).await.map_err(|e| {
            error!("[http] server error: {}", e);
            anyhow::Error::from(e)
        })
    })
}

/// Malformed query strings get the JSON failure envelope rather than axum's
/// plain-text rejection.
fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(PlaylistResponse::failed(message)),
    )
        .into_response()
}

async fn get_playlist(
    State(state): State<HttpState>,
    params: Result<Query<ListParams>, axum::extract::rejection::QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(p) => p,
        Err(e) => return bad_request(e.body_text()),
    };
    let limit = state.limit(params.limit);
    let data = state.store.recent(limit);
    debug!("[http] GET /api/playlist limit={} -> {}", limit, data.len());
    Json(PlaylistResponse::ok(data)).into_response()
}

async fn search_playlist(
    State(state): State<HttpState>,
    params: Result<Query<SearchParams>, axum::extract::rejection::QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(p) => p,
        Err(e) => return bad_request(e.body_text()),
    };
    let limit = state.limit(params.limit);
    let data = state.store.search(&params.filters(), limit);
    debug!(
        "[http] GET /api/playlist/search {:?} limit={} -> {}",
        params,
        limit,
        data.len()
    );
    Json(PlaylistResponse::ok(data)).into_response()
}

async fn health(State(state): State<HttpState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        timestamp: format_timestamp(Utc::now()),
        entries: state.store.len(),
    })
}

/// Server-rendered history page, filtered by the same query parameters as
/// `/api/playlist/search`.
async fn index(
    State(state): State<HttpState>,
    params: Result<Query<SearchParams>, axum::extract::rejection::QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(p) => p,
        Err(e) => return bad_request(e.body_text()),
    };
    let snapshot = state.store.recent(state.limit(params.limit));
    let view = render_view(&snapshot, &params.filters(), Utc::now());
    Html(page(&params, &view.to_html())).into_response()
}

fn page(params: &SearchParams, list: &str) -> String {
    let input = |name: &str, value: &str| {
        format!(
            r#"<input type="text" name="{name}" placeholder="{name}" value="{}">"#,
            escape_html(value)
        )
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Playlist History</title></head>
<body>
<form class="filter-row" method="get" action="/">
{}{}{}{}
<button type="submit">Filter</button>
<a href="/">Clear filters</a>
</form>
<div id="playlistHistory">
{}
</div>
</body>
</html>
"#,
        input("artist", &params.artist),
        input("title", &params.title),
        input("album", &params.album),
        input("year", &params.year),
        list
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        let store = Arc::new(HistoryStore::seeded(Utc::now(), 50));
        router(store, &HttpConfig::default())
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, PlaylistResponse) {
        let (status, body) = get_body(app, uri).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    #[tokio::test]
    async fn playlist_returns_success_envelope() {
        let (status, body) = get_json(app(), "/api/playlist").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert_eq!(body.count, Some(50));
        assert_eq!(body.data.map(|d| d.len()), Some(50));
    }

    #[tokio::test]
    async fn limit_is_honoured_and_capped() {
        let (_, body) = get_json(app(), "/api/playlist?limit=5").await;
        assert_eq!(body.count, Some(5));

        let store = Arc::new(HistoryStore::seeded(Utc::now(), 30));
        let config = HttpConfig {
            max_limit: 10,
            ..HttpConfig::default()
        };
        let (_, body) = get_json(router(store, &config), "/api/playlist?limit=500").await;
        assert_eq!(body.count, Some(10));
    }

    #[tokio::test]
    async fn bad_limit_gets_failure_envelope() {
        let (status, body) = get_json(app(), "/api/playlist?limit=lots").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert!(body.error.is_some());
    }

    #[tokio::test]
    async fn search_filters_case_insensitively() {
        let (_, body) = get_json(app(), "/api/playlist/search?artist=QUEEN&year=1975").await;
        let data = body.data.unwrap();
        assert!(!data.is_empty());
        assert!(data.iter().all(|e| e.artist.as_deref() == Some("Queen")));

        let (_, body) = get_json(app(), "/api/playlist/search?artist=queen&year=1991").await;
        assert_eq!(body.count, Some(0));
    }

    #[tokio::test]
    async fn health_reports_entry_count() {
        let (status, body) = get_body(app(), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        let health: HealthStatus = serde_json::from_str(&body).unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.entries, 50);
    }

    #[tokio::test]
    async fn index_renders_escaped_filtered_page() {
        let (status, body) = get_body(app(), "/?artist=%3Cb%3Equeen").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("No playlist entries match your current filters."));
        assert!(body.contains(r#"value="&lt;b&gt;queen""#));
        assert!(!body.contains("<b>queen"));

        let (_, body) = get_body(app(), "/?album=nevermind").await;
        assert!(body.contains("Smells Like Teen Spirit"));
        assert!(!body.contains("Bohemian Rhapsody"));
    }

    #[tokio::test]
    async fn bind_failure_surfaces_through_the_server_handle() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = HttpConfig {
            bind_address: "127.0.0.1".to_string(),
            port: taken.local_addr().unwrap().port(),
            ..HttpConfig::default()
        };
        let store = Arc::new(HistoryStore::seeded(Utc::now(), 5));

        let result = start_server(store, config).await.unwrap();
        let err = result.unwrap_err();
        assert!(err.to_string().contains("failed to bind"));
    }
}
