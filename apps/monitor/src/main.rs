//! roomsense monitor entry point.

mod config;

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use roomsense_engine::TelemetryEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting roomsense monitor"
    );

    // Load configuration.
    let monitor_config = match config::MonitorConfig::load() {
        Ok(c) => {
            tracing::info!(endpoint = %c.endpoint, "configuration loaded");
            c
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to load config, using defaults");
            config::MonitorConfig::default()
        }
    };

    let report_every = Duration::from_secs(monitor_config.report_interval_secs.max(1));
    let engine = TelemetryEngine::new(monitor_config.engine_config());
    engine.start().await;

    let mut ticker = tokio::time::interval(report_every);
    ticker.tick().await; // Skip the immediate first tick.

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                break;
            }
            _ = ticker.tick() => report(&engine).await,
        }
    }

    engine.stop().await;
    tracing::info!("monitor stopped");
    Ok(())
}

/// Logs one status line per channel plus the link state.
async fn report(engine: &TelemetryEngine) {
    let snapshot = engine.observe().await;

    tracing::info!(status = ?snapshot.status, "link");
    for channel in &snapshot.channels {
        tracing::info!(
            metric = channel.metric.name(),
            current = format_args!("{:.1}{}", channel.current, channel.metric.unit()),
            samples = channel.window.len(),
            "channel"
        );
    }
    for actuator in &snapshot.actuators {
        tracing::info!(
            actuator = actuator.actuator.wire_key(),
            level = actuator.level,
            "actuator"
        );
    }
}
