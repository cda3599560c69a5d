/*!
 * Buffer properties
 * Capacity and FIFO hold for any put/take/tick interleaving on one thread
 */

use proptest::prelude::*;
use sched_sim::{HandoffBuffer, Process, ProcessSpec};
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Op {
    Put,
    Take,
    Tick(f64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Put),
        Just(Op::Take),
        (0.0f64..1.0).prop_map(Op::Tick),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_buffer_matches_fifo_model(capacity in 1usize..5, ops in prop::collection::vec(op(), 1..60)) {
        let buffer = HandoffBuffer::new(capacity, 0.5);
        let mut model: VecDeque<u64> = VecDeque::new();
        let mut next_id = 1;

        for op in ops {
            match op {
                Op::Put => {
                    let result = buffer.put_timeout(
                        Process::new(next_id, &ProcessSpec::standard(1, 1.0)),
                        Duration::ZERO,
                    );
                    if model.len() < capacity {
                        prop_assert!(result.is_ok());
                        model.push_back(next_id);
                    } else {
                        prop_assert!(result.is_err());
                    }
                    next_id += 1;
                }
                Op::Take => {
                    let head_ready = buffer.snapshot().items.first().is_some_and(|p| p.ready);
                    let result = buffer.take_timeout(Duration::ZERO);
                    if head_ready {
                        prop_assert_eq!(result.unwrap().id(), model.pop_front().unwrap());
                    } else {
                        prop_assert!(result.is_err());
                    }
                }
                Op::Tick(delta) => {
                    buffer.tick(delta);
                }
            }
            prop_assert!(buffer.len() <= capacity);
            prop_assert_eq!(buffer.len(), model.len());
        }
    }
}
