/*!
 * Timer properties
 * Countdowns never increase and never go negative
 */

use proptest::prelude::*;
use sched_sim::core::types::Seconds;
use sched_sim::process::IdAllocator;
use sched_sim::{CpuCore, IoSlot, Process, ProcessSpec, ScheduleQueue, SpawnConfig};

fn deltas() -> impl Strategy<Value = Vec<Seconds>> {
    prop::collection::vec(0.0f64..1.5, 1..40)
}

proptest! {
    #[test]
    fn prop_execution_time_monotonic(exec in 0.5f64..8.0, steps in deltas()) {
        let core = CpuCore::new(0);
        core.assign(Process::new(1, &ProcessSpec::standard(1, exec))).unwrap();

        let mut last = exec;
        let mut finished = false;
        for delta in steps {
            core.tick(delta, |_, p| { finished = p.exec_remaining() == 0.0; }, |_, _| {});
            match core.occupant() {
                Some(p) => {
                    prop_assert!(p.exec_remaining <= last);
                    prop_assert!(p.exec_remaining >= 0.0);
                    last = p.exec_remaining;
                }
                None => {
                    prop_assert!(finished);
                    break;
                }
            }
        }
    }

    #[test]
    fn prop_io_process_holds_at_halfway(exec in 1.0f64..8.0, steps in deltas()) {
        let core = CpuCore::new(0);
        core.assign(Process::new(1, &ProcessSpec::io(1, exec, 2.0))).unwrap();

        let mut triggers = 0;
        for delta in steps {
            core.tick(delta, |_, _| panic!("must not finish before IO"), |_, _| triggers += 1);
            let p = core.occupant().unwrap();
            prop_assert!(p.exec_remaining >= exec / 2.0);
        }
        prop_assert!(triggers <= 1);
    }

    #[test]
    fn prop_io_time_monotonic(io in 0.5f64..6.0, steps in deltas()) {
        let core = CpuCore::new(0);
        core.assign(Process::new(1, &ProcessSpec::io(1, 2.0, io))).unwrap();
        core.tick(1.0, |_, _| {}, |_, _| {});
        let slot = IoSlot::new();
        slot.assign(core.remove().unwrap()).unwrap();

        let mut last = io;
        let mut completions = 0;
        for delta in steps {
            slot.tick(delta, |_| completions += 1);
            let remaining = slot.occupant().unwrap().io_remaining.unwrap();
            prop_assert!(remaining <= last);
            prop_assert!(remaining >= 0.0);
            last = remaining;
        }
        prop_assert!(completions <= 1);
    }

    #[test]
    fn prop_patience_monotonic_and_expires_once(patience in 0.5f64..10.0, steps in deltas()) {
        let config = SpawnConfig { enabled: false, ..SpawnConfig::default() };
        let queue = ScheduleQueue::new(config, 16, IdAllocator::new(), Some(1));
        queue.spawn(&ProcessSpec::standard(1, 1.0).with_patience(patience)).unwrap();

        let mut last = patience;
        let mut expirations = 0;
        for delta in steps {
            queue.tick(delta, |_| expirations += 1, |_| {});
            if let Some(head) = queue.head() {
                prop_assert!(head.patience_remaining <= last);
                prop_assert!(head.patience_remaining > 0.0);
                last = head.patience_remaining;
            }
        }
        prop_assert!(expirations <= 1);
        prop_assert_eq!(expirations == 1, queue.is_empty());
    }
}
