//! Local HTTP fixtures for exercising the playlist source end to end.

use axum::{http::StatusCode, routing::get, Router};
use playlist_proto::config::WidgetConfig;
use tokio::net::TcpListener;

/// Serve `router` on an ephemeral localhost port; returns the base URL.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{}", addr)
}

/// Serve a fixed status and JSON body at `/api/playlist`.
pub async fn serve_playlist(status: StatusCode, body: &'static str) -> String {
    let router = Router::new().route(
        "/api/playlist",
        get(move || async move { (status, [("content-type", "application/json")], body) }),
    );
    format!("{}/api/playlist", serve(router).await)
}

/// A port nothing listens on.
pub async fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);
    format!("http://{}/api/playlist", addr)
}

pub fn widget_config(endpoint: String, allow_fallback: bool) -> WidgetConfig {
    WidgetConfig {
        endpoint,
        allow_fallback,
        ..WidgetConfig::default()
    }
}
