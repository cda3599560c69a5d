/*!
 * End-to-end scenarios
 * Whole-process journeys through queue, cores, IO, buffer and consumers
 */

use crate::common::{quiet_config, quiet_sim, wait_for};
use pretty_assertions::assert_eq;
use sched_sim::{Phase, ProcessSpec, SimEvent, SimulationBuilder};
use std::time::Duration;

#[test]
fn test_standard_process_reaches_buffer_and_releases_memory() {
    let sim = quiet_sim();
    sim.start().unwrap();

    let spawned = sim.spawn_process(ProcessSpec::standard(4, 2.0)).unwrap();
    assert_eq!(sim.queue().len(), 1);
    assert_eq!(sim.memory_stats().used, 0);

    sim.move_queue_to_core(spawned.id, 0).unwrap();
    assert_eq!(sim.memory_stats().used, 4);
    assert_eq!(sim.cores()[0].occupant.as_ref().unwrap().phase, Phase::OnCore);

    sim.tick(1.0);
    assert_eq!(sim.memory_stats().used, 4);
    sim.tick(1.0);
    sim.tick(1.0);

    assert!(sim.cores()[0].occupant.is_none());
    assert_eq!(sim.memory_stats().used, 0);
    assert_eq!(sim.memory_stats().available, sim.memory_stats().capacity);

    let buffer = sim.buffer();
    assert_eq!(buffer.items.len(), 1);
    assert_eq!(buffer.items[0].id, spawned.id);
    assert_eq!(buffer.items[0].phase, Phase::InBuffer);
    sim.stop();
}

#[test]
fn test_consumed_process_scores_and_disappears() {
    let sim = quiet_sim();
    let events = sim.subscribe();
    sim.start().unwrap();

    sim.spawn_process(ProcessSpec::standard(2, 1.0)).unwrap();
    sim.move_queue_to_core(1, 0).unwrap();
    sim.tick(1.0);
    sim.tick(2.0);

    assert!(wait_for(Duration::from_secs(5), || sim.stats().consumed == 1));
    assert_eq!(sim.score(), 20);
    assert!(wait_for(Duration::from_secs(1), || {
        sim.consumers().iter().all(|c| !c.is_busy())
    }));

    let snapshot = sim.snapshot();
    assert!(snapshot.queue.is_empty());
    assert!(snapshot.buffer.items.is_empty());
    assert_eq!(snapshot.resident_memory(), 0);

    let consumed: Vec<_> = events
        .try_iter()
        .filter(|e| matches!(e, SimEvent::Consumed { .. }))
        .collect();
    assert_eq!(consumed.len(), 1);
    sim.stop();
}

#[test]
fn test_io_required_fires_once_at_halfway() {
    let sim = quiet_sim();
    let events = sim.subscribe();
    sim.start().unwrap();

    sim.spawn_process(ProcessSpec::io(2, 4.0, 3.0)).unwrap();
    sim.move_queue_to_core(1, 0).unwrap();

    let mut fired_at = Vec::new();
    for step in 1..=8 {
        let report = sim.tick(0.5);
        if !report.io_required.is_empty() {
            fired_at.push(step);
        }
    }
    assert_eq!(fired_at, vec![4]);

    let io_events = events
        .try_iter()
        .filter(|e| matches!(e, SimEvent::IoRequired { .. }))
        .count();
    assert_eq!(io_events, 1);

    // Execution stays paused at the halfway mark until the IO trip is done
    let occupant = sim.cores()[0].occupant.clone().unwrap();
    assert_eq!(occupant.exec_remaining, 2.0);
    assert_eq!(occupant.phase, Phase::IoPending);
    sim.stop();
}

#[test]
fn test_oversized_delta_cannot_skip_io() {
    let sim = quiet_sim();
    sim.start().unwrap();
    sim.spawn_process(ProcessSpec::io(2, 4.0, 1.0)).unwrap();
    sim.move_queue_to_core(1, 0).unwrap();

    let report = sim.tick(10.0);
    assert_eq!(report.io_required, vec![1]);
    assert!(report.completed.is_empty());
    assert_eq!(sim.cores()[0].occupant.as_ref().unwrap().exec_remaining, 2.0);
    sim.stop();
}

#[test]
fn test_io_completion_waits_for_pickup() {
    let sim = quiet_sim();
    let events = sim.subscribe();
    sim.start().unwrap();
    sim.spawn_process(ProcessSpec::io(2, 2.0, 1.0)).unwrap();
    sim.move_queue_to_core(1, 0).unwrap();
    sim.tick(1.0);
    sim.move_core_to_io(1, 0).unwrap();

    let report = sim.tick(1.5);
    assert_eq!(report.io_completed, Some(1));
    let report = sim.tick(1.5);
    assert_eq!(report.io_completed, None);

    let parked = sim.io_slot().occupant.unwrap();
    assert_eq!(parked.phase, Phase::IoAwaitingCore);
    assert!(parked.io_completed);

    let completions = events
        .try_iter()
        .filter(|e| matches!(e, SimEvent::IoCompleted { .. }))
        .count();
    assert_eq!(completions, 1);
    sim.stop();
}

#[test]
fn test_full_buffer_defers_handoff_without_stalling_tick() {
    let mut config = quiet_config();
    config.buffer_capacity = 1;
    config.cores = 2;
    let sim = SimulationBuilder::new().with_config(config).build().unwrap();
    sim.start().unwrap();

    sim.spawn_process(ProcessSpec::standard(1, 1.0)).unwrap();
    sim.spawn_process(ProcessSpec::standard(1, 1.0)).unwrap();
    sim.move_queue_to_core(1, 0).unwrap();
    sim.move_queue_to_core(2, 1).unwrap();

    let report = sim.tick(1.0);
    assert_eq!(report.completed, vec![1, 2]);
    assert_eq!(sim.buffer().items.len(), 1);
    assert_eq!(sim.memory_stats().used, 0);

    // Settle the head, let a consumer free the slot, then settle the second
    let mut ticks = 0;
    let drained = wait_for(Duration::from_secs(5), || {
        sim.tick(2.0);
        ticks += 1;
        sim.stats().consumed == 2
    });
    assert!(drained, "consumed {} after {} ticks", sim.stats().consumed, ticks);
    assert!(wait_for(Duration::from_secs(1), || sim.stats().buffered == 2));
    assert_eq!(sim.score(), 40);
    sim.stop();
}
