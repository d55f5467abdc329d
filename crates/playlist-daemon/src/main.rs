mod http;
mod store;

use std::sync::Arc;

use playlist_proto::config::Config;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = playlist_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("daemon.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,playlist_daemon=debug")),
        )
        .init();

    eprintln!("playlist-daemon log: {}", log_path.display());
    info!("Log file: {:?}", log_path);

    let config = Config::load()?;
    info!("Config loaded from: {:?}", Config::config_path());

    let store = Arc::new(store::HistoryStore::seeded(
        chrono::Utc::now(),
        config.http.seed_entries,
    ));
    info!("History seeded with {} entries", store.len());

    let server = http::start_server(store, config.http.clone());

    tokio::select! {
        res = server => res??,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }

    Ok(())
}
