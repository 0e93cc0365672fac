//! RingMPMC - Lock-Free Multi-Producer Multi-Consumer Bounded Queue
//!
//! A bounded FIFO ring where producers and consumers coordinate through
//! per-slot sequence numbers instead of a shared lock. Each enqueue and
//! dequeue claims a monotonically increasing ticket by CAS, and the slot's
//! own atomic sequence publishes the element from the producer holding a
//! ticket to the one consumer draining that same ticket.
//!
//! # Key Features
//!
//! - Per-slot release/acquire publication; no mutex anywhere in the core
//! - Cache-padded `head`/`tail` tickets (no producer/consumer false sharing)
//! - Adaptive spin backoff on CAS conflicts (spin with PAUSE, then yield)
//! - Power-of-two capacities, so slot indexing is a single bitmask
//!
//! # Example
//!
//! ```
//! use ringmpmc::RingQueue;
//!
//! let queue = RingQueue::with_capacity(8).unwrap();
//!
//! // Non-blocking: full and empty report through the return value.
//! queue.try_push(42).unwrap();
//! assert_eq!(queue.try_pop(), Some(42));
//! assert_eq!(queue.try_pop(), None);
//!
//! // Spinning: retries with adaptive backoff until it succeeds.
//! queue.push(43);
//! assert_eq!(queue.pop(), 43);
//! ```
//!
//! For callers that want to park on a condition variable instead of spinning,
//! see the `ringmpmc-blocking` companion crate.

mod error;
mod invariants;
mod ring;
mod spin;

pub use error::QueueError;
pub use ring::RingQueue;
pub use spin::SpinWait;
