//! Park-path counters.

/// Snapshot of how often blocking calls reached the condition-variable slow
/// path. Counted only when a caller exhausts its spin budget, so the lock-free
/// fast path stays instrumentation-free.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParkMetrics {
    /// Times a producer entered the park slow path.
    pub producer_parks: u64,
    /// Times a consumer entered the park slow path.
    pub consumer_parks: u64,
}
