//! Blocking Wrapper for the ringmpmc Lock-Free Queue
//!
//! This crate layers producer/consumer blocking on top of the lock-free
//! [`ringmpmc::RingQueue`]. Blocking calls first retry non-blocking
//! operations for a configurable spin budget, then park on a condition
//! variable until the other side makes progress or shutdown is signalled.
//!
//! # Features
//!
//! - **Spin-then-park**: short imbalances never touch the kernel; sustained
//!   ones park instead of burning CPU
//! - **Cooperative drain/shutdown**: [`BlockingQueue::drain_and_shutdown`]
//!   wakes every parked thread, lets consumers drain the remaining elements,
//!   and leaves the queue refusing further blocking calls
//! - **Lock-free data path**: mutexes guard only the park handshake, never an
//!   element transfer
//!
//! # Example
//!
//! ```
//! use ringmpmc_blocking::BlockingQueue;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let queue = Arc::new(BlockingQueue::with_capacity(8, 16).unwrap());
//!
//! let consumer = {
//!     let queue = Arc::clone(&queue);
//!     thread::spawn(move || {
//!         let mut received = Vec::new();
//!         // `pop` returns None once the queue is drained and shut down.
//!         while let Some(value) = queue.pop() {
//!             received.push(value);
//!         }
//!         received
//!     })
//! };
//!
//! for i in 0..100 {
//!     queue.push(i).unwrap();
//! }
//! queue.drain_and_shutdown();
//!
//! assert_eq!(consumer.join().unwrap(), (0..100).collect::<Vec<_>>());
//! ```

mod config;
mod metrics;
mod queue;

pub use config::BlockingConfig;
pub use metrics::ParkMetrics;
pub use queue::BlockingQueue;

// Construction errors come from the ring; re-export for callers.
pub use ringmpmc::QueueError;
