//! Construction parameters for the blocking queue.

/// Configuration for a [`BlockingQueue`](crate::BlockingQueue).
///
/// The spin budget trades CPU for latency: each blocking call burns that many
/// non-blocking attempts before parking on a condition variable, which
/// amortises the condvar overhead across short producer/consumer imbalances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockingConfig {
    /// Ring capacity. Must be a power of two (1, 2, 4, ...); validated when
    /// the queue is built.
    pub capacity: usize,
    /// Non-blocking attempts a blocking call makes before parking. Zero parks
    /// on the first failed attempt.
    pub spin_budget: u32,
}

impl BlockingConfig {
    /// Creates a configuration with explicit settings.
    pub const fn new(capacity: usize, spin_budget: u32) -> Self {
        Self {
            capacity,
            spin_budget,
        }
    }

    /// Small ring, short spin: parks early to keep latency bounded.
    pub const fn low_latency() -> Self {
        Self::new(256, 16)
    }

    /// Large ring, long spin: stays out of the kernel under bursty load.
    pub const fn high_throughput() -> Self {
        Self::new(4096, 128)
    }

    /// Sets the capacity.
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the spin budget.
    pub const fn with_spin_budget(mut self, spin_budget: u32) -> Self {
        self.spin_budget = spin_budget;
        self
    }
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self::new(1024, 64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_override_fields() {
        let config = BlockingConfig::default()
            .with_capacity(32)
            .with_spin_budget(0);
        assert_eq!(config.capacity, 32);
        assert_eq!(config.spin_budget, 0);

        assert!(BlockingConfig::low_latency().capacity < BlockingConfig::high_throughput().capacity);
    }
}
