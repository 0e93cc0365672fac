//! Adaptive spin-wait used on CAS conflicts and in the spinning wrappers.

use std::hint;
use std::thread;

/// Exponential spin-then-yield backoff.
///
/// Starts with a single CPU relax hint and doubles the spin count on every
/// wait until the yield threshold, after which each wait hands the timeslice
/// back to the OS scheduler. Bounds wasted CPU under sustained contention
/// while keeping short conflicts syscall-free.
///
/// `hint::spin_loop()` compiles to PAUSE on x86 and YIELD on AArch64.
#[derive(Debug)]
pub struct SpinWait {
    counter: u32,
}

impl SpinWait {
    const YIELD_THRESHOLD: u32 = 16;

    /// Creates a fresh backoff with the minimum spin count.
    #[inline]
    pub fn new() -> Self {
        Self { counter: 1 }
    }

    /// Waits once: busy-spin below the threshold, yield above it.
    #[inline]
    pub fn wait(&mut self) {
        if self.counter <= Self::YIELD_THRESHOLD {
            for _ in 0..self.counter {
                hint::spin_loop();
            }
            self.counter *= 2;
        } else {
            thread::yield_now();
        }
    }

    /// Resets to the minimum spin count for the next wait cycle.
    #[inline]
    pub fn reset(&mut self) {
        self.counter = 1;
    }
}

impl Default for SpinWait {
    fn default() -> Self {
        Self::new()
    }
}
