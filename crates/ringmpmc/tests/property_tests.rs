//! Property-based tests checking the ring against a sequential queue model.

use proptest::prelude::*;
use ringmpmc::RingQueue;
use std::collections::VecDeque;

proptest! {
    /// Any interleaving of pushes and pops behaves like a bounded FIFO:
    /// occupancy stays within capacity, `len` mirrors the model, elements
    /// come out in insertion order, and fullness hands the element back.
    #[test]
    fn prop_matches_sequential_model(
        ops in prop::collection::vec(prop::bool::ANY, 1..200),
    ) {
        let queue = RingQueue::with_capacity(16).unwrap();
        let capacity = queue.capacity();
        let mut model = VecDeque::new();
        let mut counter = 0u64;

        for push_op in ops {
            if push_op {
                match queue.try_push(counter) {
                    Ok(()) => model.push_back(counter),
                    Err(returned) => {
                        // Full: the element comes back and the model agrees.
                        prop_assert_eq!(returned, counter);
                        prop_assert_eq!(model.len(), capacity);
                    }
                }
                counter += 1;
            } else {
                prop_assert_eq!(queue.try_pop(), model.pop_front());
            }

            prop_assert!(queue.len() <= capacity);
            prop_assert_eq!(queue.len(), model.len());
            prop_assert_eq!(queue.is_empty(), model.is_empty());
            prop_assert_eq!(queue.is_full(), model.len() == capacity);
        }

        // Full drain yields the model's remainder, then empty.
        while let Some(expected) = model.pop_front() {
            prop_assert_eq!(queue.try_pop(), Some(expected));
        }
        prop_assert_eq!(queue.try_pop(), None);
        prop_assert!(queue.is_empty());
    }
}

proptest! {
    /// Consumed never exceeds produced, and a full drain empties the ring.
    #[test]
    fn prop_drain_matches_produced(writes in 0usize..200) {
        let queue = RingQueue::with_capacity(64).unwrap();

        let mut produced = 0usize;
        for i in 0..writes {
            if queue.try_push(i as u64).is_ok() {
                produced += 1;
            }
        }
        prop_assert_eq!(produced, writes.min(64));
        prop_assert_eq!(queue.len(), produced);

        let mut consumed = 0usize;
        while queue.try_pop().is_some() {
            consumed += 1;
        }
        prop_assert_eq!(consumed, produced);
        prop_assert!(queue.is_empty());
    }
}

proptest! {
    /// Every power-of-two capacity works across lap boundaries.
    #[test]
    fn prop_lap_reuse_any_capacity(
        bits in 0u32..7,
        rounds in 1usize..20,
    ) {
        let capacity = 1usize << bits;
        let queue = RingQueue::with_capacity(capacity).unwrap();

        let mut counter = 0u64;
        for _ in 0..rounds {
            for _ in 0..capacity {
                prop_assert!(queue.try_push(counter).is_ok());
                counter += 1;
            }
            prop_assert!(queue.is_full());
            for expected in counter - capacity as u64..counter {
                prop_assert_eq!(queue.try_pop(), Some(expected));
            }
            prop_assert!(queue.is_empty());
        }
    }
}
