/*!
 * Tracing setup
 */

use crate::common::quiet_sim;
use sched_sim::{init_tracing, ProcessSpec};
use serial_test::serial;

#[test]
#[serial]
fn test_simulation_runs_with_tracing_installed() {
    init_tracing();
    assert!(!init_tracing());

    let sim = quiet_sim();
    sim.start().unwrap();
    sim.spawn_process(ProcessSpec::standard(1, 1.0)).unwrap();
    sim.move_queue_to_core(1, 0).unwrap();
    sim.tick(1.0);
    sim.reset();
    assert!(sim.queue().is_empty());
}
