mod blackboard; // shared snapshot of the simulated board
mod bus; // broadcast topics between the control thread and async tasks
mod control; // control thread: wiring and tick loop
mod settings; // `config/default.toml` + environment overrides
mod sim; // simulated clock, pins and echo line

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use blackboard::{snapshot, Blackboard, Line};
use bus::Topic;
use rangewarn_zones::ZoneChange;
use sim::SimClock;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};
use tracing_subscriber::{self, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Rangewarn started. Loading configuration...");
    let path = settings::config_path();
    let cfg = settings::load_config(&path)
        .with_context(|| format!("Failed to load configuration from {}", path))?;

    let bb: Blackboard = Arc::default();
    let zone_topic: Topic<ZoneChange> = Topic::new(16);
    let zone_rx = zone_topic.subscribe();
    let stop = Arc::new(AtomicBool::new(false));

    let clock = SimClock::new(cfg.simulation.clock_offset_ms);
    let system = control::build_system(&cfg, clock, &bb, zone_topic)?;

    info!("Spawning control thread...");
    let control_thread = std::thread::Builder::new()
        .name("control".into())
        .spawn({
            let bb = Arc::clone(&bb);
            let stop = Arc::clone(&stop);
            let tick = Duration::from_micros(cfg.simulation.tick_us);
            move || control::run(system, bb, stop, tick)
        })
        .context("Failed to spawn control thread")?;

    let report_period = Duration::from_millis(cfg.simulation.report_period_ms);
    let run_for = (cfg.simulation.run_for_ms > 0).then(|| Duration::from_millis(cfg.simulation.run_for_ms));

    tokio::select! {
        res = zone_logger(zone_rx) => res?,
        res = status_reporter(bb.clone(), report_period) => res?,
        res = shutdown_signal(run_for) => res?,
    }

    info!("Stopping control thread...");
    stop.store(true, Ordering::Relaxed);
    control_thread
        .join()
        .map_err(|_| anyhow::anyhow!("Control thread panicked"))?;

    let state = snapshot(&bb);
    info!(
        zone = %state.zone,
        distance_cm = ?state.last_distance_cm,
        reaction_ms = state.last_reaction_ms,
        buzzer_beeps = state.rising_edges(Line::Buzzer),
        pings = state.rising_edges(Line::Trigger),
        faults = state.faults.len(),
        "Final state"
    );
    Ok(())
}

/// Log every zone change published by the control thread.
async fn zone_logger(mut rx: broadcast::Receiver<Arc<ZoneChange>>) -> anyhow::Result<()> {
    info!("Zone logger task started.");
    loop {
        match rx.recv().await {
            Ok(change) => info!(
                zone = %change.zone,
                id = change.zone.id(),
                at_ms = change.at_ms,
                reaction_ms = change.reaction_ms,
                distance_cm = ?change.distance_cm,
                "zone_change"
            ),
            Err(RecvError::Lagged(missed)) => warn!(missed, "Zone logger fell behind"),
            Err(RecvError::Closed) => {
                info!("Zone topic closed.");
                return Ok(());
            }
        }
    }
}

/// Periodically report what the panel is showing.
async fn status_reporter(bb: Blackboard, period: Duration) -> anyhow::Result<()> {
    info!("Status reporter task started.");
    let mut tick = tokio::time::interval(period);
    loop {
        tick.tick().await;
        let s = snapshot(&bb);
        info!(
            zone = %s.zone,
            distance_cm = ?s.last_distance_cm,
            red = s.level(Line::Red),
            orange = s.level(Line::Orange),
            green = s.level(Line::Green),
            buzzer = s.level(Line::Buzzer),
            "status"
        );
        if !s.faults.is_empty() {
            warn!(faults = ?s.faults, "Faults raised");
        }
        debug!(edges = ?s.rising_edges, "Rising edge counters");
    }
}

/// Resolve on Ctrl-C, or once `run_for` has elapsed when set.
async fn shutdown_signal(run_for: Option<Duration>) -> anyhow::Result<()> {
    match run_for {
        Some(limit) => {
            tokio::select! {
                res = tokio::signal::ctrl_c() => res.context("Failed to listen for Ctrl-C")?,
                _ = tokio::time::sleep(limit) => info!(?limit, "Run time elapsed."),
            }
        }
        None => tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?,
    }
    info!("Shutdown requested.");
    Ok(())
}
