//! # GS Link
//!
//! Ground-station link daemon: keeps the wfb-ng link statistics
//! snapshot current and periodically logs a link summary. The one-shot
//! `radio` command prints the current radio settings, falling back to
//! the local config when the air unit is unreachable.

use anyhow::Result;
use tokio::time::{interval, Duration};
use tracing::{info, warn};
use tracing_subscriber;

use gs_link::config::Config;
use gs_link::radio::forward::HttpForwarder;
use gs_link::radio::reconciler::RadioReconciler;
use gs_link::radio::service::InitServiceController;
use gs_link::stats::ingestor::StatsIngestor;

/// Config path used when GS_LINK_CONFIG is not set
const DEFAULT_CONFIG_PATH: &str = "/etc/gs-link.toml";

/// Seconds between link summary log lines
const STATUS_INTERVAL_SECS: u64 = 10;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("GS Link v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path =
        std::env::var("GS_LINK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            warn!("could not load {}: {}; using defaults", config_path, e);
            Config::default()
        }
    };

    if let Some(command) = std::env::args().nth(1) {
        return match command.as_str() {
            "radio" => show_radio(&config).await,
            other => anyhow::bail!("unknown command: {}", other),
        };
    }

    // Daemon mode: run the stats ingestor until Ctrl+C
    let ingestor = StatsIngestor::new(&config.stats);
    ingestor.start();
    info!("stats ingestor started ({})", config.stats.address);
    info!("Press Ctrl+C to exit");

    let mut status_interval = interval(Duration::from_secs(STATUS_INTERVAL_SECS));

    loop {
        tokio::select! {
            _ = status_interval.tick() => {
                let snapshot = ingestor.snapshot();
                info!(
                    "link: video {} pkt/s, fec {} pkt/s, lost {} pkt/s, rssi {:?}, snr {:?}",
                    snapshot.video_packets_per_sec,
                    snapshot.fec_packets_per_sec,
                    snapshot.lost_packets_per_sec,
                    snapshot.rssi,
                    snapshot.snr,
                );
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                ingestor.stop();
                break;
            }
        }
    }

    Ok(())
}

/// Print the current radio settings as JSON
async fn show_radio(config: &Config) -> Result<()> {
    let forwarder = HttpForwarder::new(
        config.radio.remote_url.clone(),
        Duration::from_millis(config.radio.forward_timeout_ms),
    )?;
    let reconciler = RadioReconciler::new(forwarder, InitServiceController, &config.radio);

    let result = reconciler.get().await;
    info!("radio settings source: {}", result.source.as_str());
    println!("{}", serde_json::to_string_pretty(&result.settings)?);
    Ok(())
}
