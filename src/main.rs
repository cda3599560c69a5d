/*!
 * Scheduler Simulation - Headless Driver
 *
 * Runs the simulation at a fixed tick rate with the autopilot playing:
 * - optional JSON config path as the first argument
 * - SIM_* environment overrides on top
 * - ends on Ctrl+C, after SIM_DURATION_SECS, or at game over
 */

use anyhow::{Context, Result};
use sched_sim::core::limits::{MAX_TICK_DELTA_SECS, TARGET_TICKS_PER_SEC};
use sched_sim::{init_tracing, Autopilot, SimConfig, Simulation, SimulationBuilder};
use std::time::{Duration, Instant};
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

/// How often the driver logs a summary line
const SUMMARY_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load(&path).with_context(|| format!("loading {}", path))?,
        None => SimConfig::default(),
    }
    .with_env()
    .context("applying environment overrides")?;

    let duration = std::env::var("SIM_DURATION_SECS")
        .ok()
        .map(|v| v.parse::<u64>().map(Duration::from_secs))
        .transpose()
        .context("parsing SIM_DURATION_SECS")?;

    let sim = SimulationBuilder::new()
        .with_config(config)
        .build()
        .context("building simulation")?;
    sim.start().context("starting simulation")?;

    info!("Scheduler simulation running");
    info!("================================================");

    let outcome = tokio::select! {
        _ = run(&sim, duration) => "finished",
        _ = tokio::signal::ctrl_c() => "interrupted",
    };

    sim.stop();
    let snapshot = sim.snapshot();
    info!(
        outcome,
        score = snapshot.score,
        vitality = snapshot.vitality,
        stop_reason = ?snapshot.stop_reason,
        stats = ?snapshot.stats,
        "Simulation ended"
    );
    Ok(())
}

async fn run(sim: &Simulation, duration: Option<Duration>) {
    let mut ticker = interval(Duration::from_micros(1_000_000 / TARGET_TICKS_PER_SEC));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut pilot = Autopilot::new();
    let started = Instant::now();
    let mut last_tick = Instant::now();
    let mut last_summary = Instant::now();

    loop {
        ticker.tick().await;
        let now = Instant::now();
        let delta = now
            .duration_since(last_tick)
            .as_secs_f64()
            .min(MAX_TICK_DELTA_SECS);
        last_tick = now;

        let report = sim.tick(delta);
        if report.stopped.is_some() || !sim.is_running() {
            break;
        }
        pilot.step(sim);

        if now.duration_since(last_summary) >= SUMMARY_INTERVAL {
            last_summary = now;
            let snapshot = sim.snapshot();
            info!(
                vitality = snapshot.vitality,
                score = snapshot.score,
                queued = snapshot.queue.len(),
                buffered = snapshot.buffer.items.len(),
                memory_used = snapshot.memory.used,
                consumed = snapshot.stats.consumed,
                "Summary"
            );
        }
        if duration.is_some_and(|limit| started.elapsed() >= limit) {
            break;
        }
    }
}
