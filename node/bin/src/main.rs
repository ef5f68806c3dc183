//! The headend server: wires the planning, horizon, and runtime components
//! for one channel and supervises them until shutdown.

mod config;
mod ts_tap;

use anyhow::Context;
use clap::Parser;
use config::ServerConfig;
use headend_air::AirGateway;
use headend_catalog::{CatalogManifest, InMemoryAssetLibrary};
use headend_horizon::HorizonManager;
use headend_planner::{PlanningPipeline, SchedulePlanArtifact};
use headend_runtime::{ChannelManager, TsRingBuffer};
use headend_storage::{
    AsRunStore, CompiledLogStore, ExecutionWindowStore, SequenceStore, TrafficPlayLog,
};
use headend_timebase::{MasterClock, SystemClock};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "headend-server", about = "24x7 broadcast playout core")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "headend.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = ServerConfig::load(&args.config)?.validate()?;

    let clock: Arc<dyn MasterClock> = Arc::new(SystemClock::new());

    let manifest_raw = std::fs::read_to_string(&config.catalog_manifest_path)
        .with_context(|| format!("reading {}", config.catalog_manifest_path.display()))?;
    let manifest: CatalogManifest =
        serde_json::from_str(&manifest_raw).context("parsing catalog manifest")?;
    let library = Arc::new(
        InMemoryAssetLibrary::from_manifest(manifest).context("seeding asset library")?,
    );

    let plan_raw = std::fs::read_to_string(&config.plan_path)
        .with_context(|| format!("reading {}", config.plan_path.display()))?;
    let plan: SchedulePlanArtifact =
        serde_json::from_str(&plan_raw).context("parsing schedule plan")?;

    let window = Arc::new(ExecutionWindowStore::new());
    let sequences = Arc::new(SequenceStore::new());
    let play_log = Arc::new(TrafficPlayLog::new());
    let asrun = Arc::new(AsRunStore::new());
    let compiled = Arc::new(CompiledLogStore::new());

    let pipeline = PlanningPipeline::new(
        plan,
        config.schedule.clone(),
        library,
        sequences,
        play_log,
        config.traffic_policy.clone(),
        config.fallback.clone(),
    );
    let horizon = HorizonManager::new(
        config.horizon.clone(),
        Arc::new(pipeline),
        window.clone(),
        clock.clone(),
    )
    .with_compiled_store(compiled);

    let mut tasks = tokio::task::JoinSet::new();
    tasks.spawn(async move {
        match horizon.run().await {
            Ok(()) => tracing::warn!("horizon manager unexpectedly exited"),
            Err(err) => tracing::error!(?err, "horizon manager failed"),
        }
    });

    if let Some(endpoint) = config.ts_tap_endpoint.clone() {
        let ring = Arc::new(TsRingBuffer::new(config.ring_buffer_max_bytes));
        tasks.spawn(ts_tap::run(endpoint, ring));
    }

    // Wait for the horizon to cover the playhead before going on air.
    wait_for_window(&*window, &*clock).await?;

    let gateway = Arc::new(AirGateway::new(config.control_endpoint.clone(), clock.clone()));
    let mut channel = ChannelManager::new(
        config.channel_runtime.clone(),
        gateway,
        window,
        clock,
        asrun,
    );

    // The channel is on air for as long as the process runs; edge-side
    // viewer tracking attaches through the same manager when present.
    channel.viewer_attached().await.context("starting playout session")?;

    tokio::signal::ctrl_c().await.context("waiting for shutdown signal")?;
    tracing::info!("shutdown requested; stopping playout");
    channel.stop().await;
    tasks.abort_all();
    Ok(())
}

/// Block until the execution window covers "now" or a bounded wait runs
/// out. The horizon manager owns planning; this only observes.
async fn wait_for_window(
    window: &ExecutionWindowStore,
    clock: &dyn MasterClock,
) -> anyhow::Result<()> {
    use headend_storage::ReadExecutionWindow;

    for _ in 0..100 {
        if window.get_entry_at(clock.now_utc_ms()).is_some() {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    anyhow::bail!("execution window never covered the playhead; check horizon configuration")
}
