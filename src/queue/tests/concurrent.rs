//! Concurrent producer/consumer behavior: drain completeness, per-producer
//! ordering, and exactly-once watermark signalling under contention.

use super::{assert_valid_transition_chain, RecordingSink};
use crate::queue::{MonitoredQueue, QueueState};
use std::sync::Arc;
use std::thread;

const SENTINEL: u64 = u64::MAX;

fn encode(producer: u64, sequence: u64) -> u64 {
    (producer << 32) | sequence
}

fn decode(value: u64) -> (u64, u64) {
    (value >> 32, value & 0xFFFF_FFFF)
}

#[test]
fn test_multi_producer_single_consumer_drains_everything() {
    const PRODUCERS: u64 = 5;
    const PER_PRODUCER: u64 = 20_000;

    let queue = Arc::new(MonitoredQueue::new(1_000));

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let mut count: u64 = 0;
            let mut sum: u64 = 0;
            loop {
                let value = queue.pop_front();
                if value == SENTINEL {
                    break;
                }
                count += 1;
                sum += value;
            }
            (count, sum)
        })
    };

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|producer| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for sequence in 0..PER_PRODUCER {
                    queue.push_back(encode(producer, sequence)).unwrap();
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }
    queue.push_back(SENTINEL).unwrap();

    let (count, sum) = consumer.join().unwrap();

    // Every element arrives exactly once: the count and the checksum both
    // match what the producers pushed.
    let expected_sum: u64 = (0..PRODUCERS)
        .map(|p| (0..PER_PRODUCER).map(|s| encode(p, s)).sum::<u64>())
        .sum();
    assert_eq!(count, PRODUCERS * PER_PRODUCER);
    assert_eq!(sum, expected_sum);
    assert!(queue.is_empty());
    assert_eq!(queue.num_elements(), 0);
}

#[test]
fn test_per_producer_order_is_preserved() {
    const PRODUCERS: u64 = 2;
    const PER_PRODUCER: u64 = 10_000;

    let queue = Arc::new(MonitoredQueue::new(64));

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let mut next_expected = [0u64; PRODUCERS as usize];
            loop {
                let value = queue.pop_front();
                if value == SENTINEL {
                    break;
                }
                let (producer, sequence) = decode(value);
                assert_eq!(
                    sequence, next_expected[producer as usize],
                    "producer {} element arrived out of order",
                    producer
                );
                next_expected[producer as usize] = sequence + 1;
            }
            next_expected
        })
    };

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|producer| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for sequence in 0..PER_PRODUCER {
                    queue.push_back(encode(producer, sequence)).unwrap();
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }
    queue.push_back(SENTINEL).unwrap();

    let next_expected = consumer.join().unwrap();
    assert!(next_expected.iter().all(|&n| n == PER_PRODUCER));
}

#[test]
fn test_transitions_are_exactly_once_under_contention() {
    const PRODUCERS: usize = 4;
    const CONSUMERS: usize = 2;
    const PER_PRODUCER: u64 = 5_000;

    let queue = Arc::new(MonitoredQueue::new(100));
    queue.set_watermarks(10, 50, 90);

    let (sink, events) = RecordingSink::new();
    queue.set_event_sink(sink);

    let consumers: Vec<_> = (0..CONSUMERS)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut count = 0u64;
                loop {
                    if queue.pop_front() == SENTINEL {
                        break;
                    }
                    count += 1;
                }
                count
            })
        })
        .collect();

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|producer| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for sequence in 0..PER_PRODUCER {
                    queue.push_back(encode(producer as u64, sequence)).unwrap();
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }
    for _ in 0..CONSUMERS {
        queue.push_back(SENTINEL).unwrap();
    }

    let drained: u64 = consumers.into_iter().map(|c| c.join().unwrap()).sum();
    assert_eq!(drained, PRODUCERS as u64 * PER_PRODUCER);
    assert!(queue.is_empty());

    // The recorded sequence must form an unbroken chain of legal
    // transitions; a missed or doubled crossing breaks the chain. The queue
    // ends empty, so the last recorded transition (if any) lands on Normal.
    let events = events.lock().unwrap();
    assert_valid_transition_chain(&events);
    if let Some((_, last_new, _)) = events.last() {
        assert_eq!(*last_new, QueueState::Normal);
    }
    assert_eq!(queue.state(), QueueState::Normal);
}
