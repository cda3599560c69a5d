/*!
 * Event and stats reporting
 */

use crate::common::quiet_sim;
use pretty_assertions::assert_eq;
use sched_sim::{ProcessSpec, SimEvent, SimSnapshot};
use std::time::Duration;

#[test]
fn test_event_stream_for_one_process() {
    let sim = quiet_sim();
    let events = sim.subscribe();
    sim.start().unwrap();
    sim.spawn_process(ProcessSpec::standard(1, 1.0)).unwrap();
    sim.move_queue_to_core(1, 0).unwrap();
    sim.tick(1.0);
    sim.tick(2.0);

    let mut kinds = Vec::new();
    while kinds.last() != Some(&"score_changed") {
        let event = events
            .recv_timeout(Duration::from_secs(5))
            .expect("event stream stalled");
        let json = serde_json::to_value(&event).unwrap();
        kinds.push(match event {
            SimEvent::Started { .. } => "started",
            SimEvent::Spawned { .. } => "spawned",
            SimEvent::AssignedToCore { .. } => "assigned_to_core",
            SimEvent::CpuCompleted { .. } => "cpu_completed",
            SimEvent::Buffered { .. } => "buffered",
            SimEvent::Consumed { .. } => "consumed",
            SimEvent::ScoreChanged { .. } => "score_changed",
            _ => "other",
        });
        assert_eq!(json["event"], *kinds.last().unwrap());
    }
    assert_eq!(
        kinds,
        vec![
            "started",
            "spawned",
            "assigned_to_core",
            "cpu_completed",
            "buffered",
            "consumed",
            "score_changed"
        ]
    );
    sim.stop();
}

#[test]
fn test_rejections_are_counted() {
    let sim = quiet_sim();
    sim.start().unwrap();
    sim.spawn_process(ProcessSpec::standard(1, 1.0)).unwrap();
    let _ = sim.move_core_to_io(1, 0);
    let _ = sim.move_io_to_core(1, 0);
    let _ = sim.move_queue_to_core(1, 99);

    let stats = sim.stats();
    assert_eq!(stats.rejected_actions, 3);
    assert_eq!(stats.assigned, 0);
    sim.stop();
}

#[test]
fn test_snapshot_serializes() {
    let sim = quiet_sim();
    sim.start().unwrap();
    sim.spawn_process(ProcessSpec::io(3, 4.0, 2.0)).unwrap();

    let snapshot = sim.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: SimSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.queue.len(), 1);
    assert_eq!(parsed.queue[0].io_total, Some(2.0));
    assert_eq!(parsed.run_id, sim.run_id());
    assert!(parsed.running);
    sim.stop();
}
