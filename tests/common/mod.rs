/*!
 * Shared test helpers
 */

#![allow(dead_code)]

use sched_sim::{SimConfig, Simulation, SimulationBuilder};
use std::time::{Duration, Instant};

/// Poll `condition` until it holds or `timeout` passes
pub fn wait_for<F: FnMut() -> bool>(timeout: Duration, mut condition: F) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Config with fast consumers and no automatic spawning
pub fn quiet_config() -> SimConfig {
    let mut config = SimConfig {
        seed: Some(1234),
        ..SimConfig::default()
    };
    config.spawn.enabled = false;
    config.consumer.min_latency_ms = 5;
    config.consumer.max_latency_ms = 10;
    config
}

pub fn quiet_sim() -> Simulation {
    SimulationBuilder::new()
        .with_config(quiet_config())
        .build()
        .expect("valid config")
}
