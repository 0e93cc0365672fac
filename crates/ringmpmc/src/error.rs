//! Construction-time error types.

use thiserror::Error;

/// Errors reported when building a queue.
///
/// Runtime conditions (full, empty, contention, shutdown) are never errors;
/// they are reported through the operation return values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The requested capacity was zero.
    #[error("queue capacity must be positive")]
    ZeroCapacity,

    /// The requested capacity was two or more but not a power of two.
    ///
    /// Slot indexing uses a bitmask, so the ring only supports power-of-two
    /// capacities (1, 2, 4, 8, ...).
    #[error("queue capacity must be a power of two, got {capacity}")]
    CapacityNotPowerOfTwo {
        /// The rejected capacity.
        capacity: usize,
    },
}
