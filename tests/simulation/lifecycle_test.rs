/*!
 * Lifecycle tests
 * start/stop/reset under live worker threads
 */

use crate::common::{quiet_config, quiet_sim, wait_for};
use pretty_assertions::assert_eq;
use sched_sim::{ProcessSpec, SimEvent, SimulationBuilder, StopReason};
use std::time::{Duration, Instant};

#[test]
fn test_stop_unblocks_idle_workers_promptly() {
    let sim = quiet_sim();
    sim.start().unwrap();
    assert_eq!(sim.consumers().len(), 2);
    std::thread::sleep(Duration::from_millis(50));

    let started = Instant::now();
    sim.stop();
    assert!(started.elapsed() < sim.config().join_timeout());
    assert!(!sim.is_running());
    assert!(sim.consumers().is_empty());
    assert!(sim.buffer().shut_down);
}

#[test]
fn test_stop_interrupts_consumption_latency() {
    let mut config = quiet_config();
    config.consumer.min_latency_ms = 10_000;
    config.consumer.max_latency_ms = 10_000;
    config.settle_delay_secs = 0.1;
    let sim = SimulationBuilder::new().with_config(config).build().unwrap();
    sim.start().unwrap();

    sim.spawn_process(ProcessSpec::standard(1, 1.0)).unwrap();
    sim.move_queue_to_core(1, 0).unwrap();
    sim.tick(1.0);
    sim.tick(1.0);
    assert!(wait_for(Duration::from_secs(2), || {
        sim.consumers().iter().any(|c| c.is_busy())
    }));

    let started = Instant::now();
    sim.stop();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(sim.stats().consumed, 0);

    let buffered: Vec<_> = sim.buffer().items.iter().map(|p| p.id).collect();
    assert_eq!(buffered, vec![1]);
}

#[test]
fn test_interrupted_process_is_consumed_after_restart() {
    let mut config = quiet_config();
    config.consumers = 1;
    config.consumer.min_latency_ms = 400;
    config.consumer.max_latency_ms = 400;
    config.settle_delay_secs = 0.1;
    let sim = SimulationBuilder::new().with_config(config).build().unwrap();
    sim.start().unwrap();

    sim.spawn_process(ProcessSpec::standard(1, 1.0)).unwrap();
    sim.move_queue_to_core(1, 0).unwrap();
    sim.tick(1.0);
    sim.tick(1.0);
    assert!(wait_for(Duration::from_secs(2), || {
        sim.consumers().iter().any(|c| c.is_busy())
    }));
    sim.stop();
    assert_eq!(sim.stats().consumed, 0);
    assert_eq!(sim.buffer().items.len(), 1);

    sim.start().unwrap();
    assert!(wait_for(Duration::from_secs(3), || sim.stats().consumed == 1));
    assert!(sim.buffer().items.is_empty());
    sim.stop();
}

#[test]
fn test_restart_keeps_buffered_processes() {
    let mut config = quiet_config();
    config.consumers = 1;
    let sim = SimulationBuilder::new().with_config(config).build().unwrap();
    sim.start().unwrap();
    sim.spawn_process(ProcessSpec::standard(1, 1.0)).unwrap();
    sim.move_queue_to_core(1, 0).unwrap();
    sim.tick(1.0);
    sim.stop();
    assert_eq!(sim.buffer().items.len(), 1);

    let first_run = sim.run_id();
    sim.start().unwrap();
    assert_ne!(sim.run_id(), first_run);
    assert!(!sim.buffer().shut_down);
    sim.tick(2.0);
    assert!(wait_for(Duration::from_secs(5), || sim.stats().consumed == 1));
    sim.stop();
}

#[test]
fn test_lifecycle_events_in_order() {
    let sim = quiet_sim();
    let events = sim.subscribe();
    sim.start().unwrap();
    sim.stop();
    sim.stop();

    let received: Vec<_> = events.try_iter().collect();
    assert_eq!(received.len(), 2);
    assert!(matches!(received[0], SimEvent::Started { .. }));
    assert_eq!(
        received[1],
        SimEvent::Stopped {
            reason: StopReason::Requested
        }
    );
}

#[test]
fn test_dropping_last_handle_releases_simulation() {
    let sim = quiet_sim();
    let events = sim.subscribe();
    sim.start().unwrap();
    let other = sim.clone();
    drop(sim);
    assert!(other.is_running());
    assert!(matches!(events.try_recv(), Ok(SimEvent::Started { .. })));

    // Worker threads only hold weak references, so the last drop frees
    // everything and the event bus disconnects
    drop(other);
    assert_eq!(
        events.recv_timeout(Duration::from_secs(2)),
        Err(flume::RecvTimeoutError::Disconnected)
    );
}
