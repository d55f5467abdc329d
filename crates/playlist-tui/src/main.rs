mod app;
mod target;
mod theme;
mod widgets;

use playlist_proto::config::Config;
use playlist_proto::source::PlaylistSource;
use playlist_proto::widget::PlaylistWidget;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = playlist_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("tui.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; keep HTTP client internals quiet by default.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("playlist-history log: {}", log_path.display());

    tracing::info!("playlist-history starting…");

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("config unreadable, using defaults: {:#}", e);
        Config::default()
    });
    tracing::info!("polling {}", config.widget.endpoint);

    let (tx, rx) = mpsc::unbounded_channel();
    let source = PlaylistSource::new(&config.widget)?;
    let widget = PlaylistWidget::new(source, target::TuiTarget::new(tx.clone())).start();

    let app = app::App::new(widget.events(), config.widget.endpoint.clone());
    let result = app.run(tx, rx).await;

    widget.stop().await?;
    tracing::info!("playlist-history exiting");
    result
}
