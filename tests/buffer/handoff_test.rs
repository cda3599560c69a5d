/*!
 * Hand-off buffer tests
 * Blocking behavior across real threads
 */

use crate::common::wait_for;
use pretty_assertions::assert_eq;
use sched_sim::{BufferError, HandoffBuffer, Process, ProcessSpec};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn process(id: u64) -> Process {
    Process::new(id, &ProcessSpec::standard(1, 1.0))
}

#[test]
fn test_second_taker_blocks_until_second_put() {
    let buffer = HandoffBuffer::new(1, 1.5);
    buffer.put(process(1)).unwrap();
    buffer.tick(2.0);

    let first = buffer.take_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(first.id(), 1);

    let taker = {
        let buffer = buffer.clone();
        thread::spawn(move || buffer.take_timeout(Duration::from_secs(5)))
    };
    thread::sleep(Duration::from_millis(100));
    assert!(!taker.is_finished());

    buffer.put(process(2)).unwrap();
    thread::sleep(Duration::from_millis(50));
    assert!(!taker.is_finished(), "head must settle before it can be taken");

    buffer.tick(2.0);
    let second = taker.join().unwrap().unwrap();
    assert_eq!(second.id(), 2);
}

#[test]
fn test_shutdown_releases_blocked_takers_and_putters() {
    let buffer = HandoffBuffer::new(1, 1.5);
    let takers: Vec<_> = (0..2)
        .map(|_| {
            let buffer = buffer.clone();
            thread::spawn(move || buffer.take())
        })
        .collect();

    buffer.put(process(1)).unwrap();
    let putter = {
        let buffer = buffer.clone();
        thread::spawn(move || buffer.put(process(2)).map_err(|e| (e.reason, e.into_process().id())))
    };
    thread::sleep(Duration::from_millis(50));

    let started = Instant::now();
    buffer.shutdown();
    for taker in takers {
        assert_eq!(taker.join().unwrap().unwrap_err(), BufferError::ShutDown);
    }
    assert_eq!(putter.join().unwrap(), Err((BufferError::ShutDown, 2)));
    assert!(started.elapsed() < Duration::from_secs(1));

    buffer.clear();
    assert!(buffer.is_empty());
    buffer.put(process(3)).unwrap();
}

#[test]
fn test_fifo_order_preserved_across_takers() {
    let buffer = HandoffBuffer::new(8, 0.5);
    for id in 1..=6 {
        buffer.put(process(id)).unwrap();
    }
    buffer.tick(1.0);

    let taken: Vec<u64> = (0..6)
        .map(|_| buffer.take_timeout(Duration::from_secs(1)).unwrap().id())
        .collect();
    assert_eq!(taken, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(
        buffer.take_timeout(Duration::from_millis(20)).unwrap_err(),
        BufferError::TimedOut
    );
}

#[test]
fn test_capacity_never_exceeded_under_contention() {
    let capacity = 3;
    let buffer = HandoffBuffer::new(capacity, 0.0);
    let taken = Arc::new(AtomicUsize::new(0));
    let total = 60;

    let producers: Vec<_> = (0..4)
        .map(|p| {
            let buffer = buffer.clone();
            thread::spawn(move || {
                for i in 0..total / 4 {
                    buffer.put(process((p * 100 + i) as u64)).unwrap();
                }
            })
        })
        .collect();
    let consumers: Vec<_> = (0..2)
        .map(|_| {
            let buffer = buffer.clone();
            let taken = Arc::clone(&taken);
            thread::spawn(move || loop {
                match buffer.take_timeout(Duration::from_millis(200)) {
                    Ok(_) => {
                        taken.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(BufferError::ShutDown) => break,
                    Err(BufferError::TimedOut) => {}
                }
            })
        })
        .collect();

    let finished = wait_for(Duration::from_secs(10), || {
        assert!(buffer.len() <= capacity);
        taken.load(Ordering::SeqCst) == total
    });
    assert!(finished);

    for producer in producers {
        producer.join().unwrap();
    }
    buffer.shutdown();
    for consumer in consumers {
        consumer.join().unwrap();
    }
}
