/*!
 * FCFS and memory accounting under concurrency
 */

use crate::common::{quiet_config, quiet_sim};
use sched_sim::{ActionRejection, Autopilot, ProcessSpec, SimulationBuilder};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_concurrent_drags_give_exactly_one_success() {
    for _ in 0..20 {
        let sim = quiet_sim();
        sim.start().unwrap();
        sim.spawn_process(ProcessSpec::standard(1, 5.0)).unwrap();
        sim.spawn_process(ProcessSpec::standard(1, 5.0)).unwrap();

        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = [1u64, 2u64]
            .into_iter()
            .map(|process_id| {
                let sim = sim.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    sim.move_queue_to_core(process_id, 0)
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "results: {:?}", results);
        assert!(results.iter().all(|r| match r {
            Ok(()) => true,
            Err(ActionRejection::NotAtHead { .. }) | Err(ActionRejection::CoreBusy { .. }) => true,
            Err(_) => false,
        }));
        assert_eq!(sim.memory_stats().used, 1);
        assert_eq!(sim.queue().len(), 1);
        sim.stop();
    }
}

#[test]
fn test_memory_conservation_through_a_game() {
    let mut config = quiet_config();
    config.spawn.enabled = true;
    config.spawn.interval_secs = (0.2, 0.6).into();
    config.initial_vitality = 10_000;
    config.seed = Some(99);
    let sim = SimulationBuilder::new().with_config(config).build().unwrap();
    sim.start().unwrap();

    let mut pilot = Autopilot::new();
    for _ in 0..600 {
        sim.tick(1.0 / 30.0);
        pilot.step(&sim);

        let snapshot = sim.snapshot();
        let memory = snapshot.memory;
        assert_eq!(
            snapshot.resident_memory(),
            memory.capacity - memory.available,
            "resident memory must match the pool"
        );
        assert!(snapshot.buffer.items.len() <= snapshot.buffer.capacity);
    }
    assert!(pilot.totals().scheduled > 0);
    sim.stop();
}
