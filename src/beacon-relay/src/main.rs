//! Beacon Relay — forwards user event payloads to the analytics collector.
//!
//! Reads a user event payload from a JSON file, reshapes it into
//! schema-tagged collector records, and emits them.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use beacon_core::config::AppConfig;
use beacon_core::types::UserEventPayload;
use beacon_snowplow::{CollectorEmitter, EventHandler, Tracker, UserEventHandler};
use clap::Parser;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "beacon-relay")]
#[command(about = "Forwards user event payloads to the analytics collector")]
#[command(version)]
struct Cli {
    /// Path to a user event payload JSON file
    payload: PathBuf,

    /// Collector endpoint (overrides config)
    #[arg(long, env = "BEACON__SNOWPLOW__COLLECTOR_ENDPOINT")]
    collector: Option<String>,

    /// Application id stamped on every event (overrides config)
    #[arg(long, env = "BEACON__SNOWPLOW__APP_ID")]
    app_id: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beacon_relay=info,beacon_snowplow=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(collector) = cli.collector {
        config.snowplow.collector_endpoint = collector;
    }
    if let Some(app_id) = cli.app_id {
        config.snowplow.app_id = app_id;
    }

    info!(
        collector = %config.snowplow.collector_endpoint,
        app_id = %config.snowplow.app_id,
        namespace = %config.snowplow.namespace,
        "Beacon relay starting"
    );

    let emitter = Arc::new(CollectorEmitter::new(
        config.snowplow.collector_endpoint.clone(),
    ));
    let tracker = Arc::new(Tracker::new(
        emitter,
        config.snowplow.app_id.clone(),
        config.snowplow.namespace.clone(),
    ));
    let handler = UserEventHandler::new(tracker, config.snowplow.schemas.clone());

    let raw = std::fs::read_to_string(&cli.payload)
        .with_context(|| format!("reading payload file {}", cli.payload.display()))?;
    let payload: UserEventPayload =
        serde_json::from_str(&raw).context("parsing user event payload")?;

    handler.process(&payload).await?;
    info!("payload forwarded");
    Ok(())
}
