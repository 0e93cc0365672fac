use crate::{BlockingConfig, ParkMetrics};
use ringmpmc::{QueueError, RingQueue, SpinWait};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// One side's park/wake machinery.
///
/// The mutex guards only the park handshake; it is never held across a ring
/// mutation. The waiter count is modified only while holding the mutex, which
/// is what makes the notify loops in [`BlockingQueue::drain_and_shutdown`]
/// converge; the atomic lets the opposite side read it lock-free as a wake
/// hint.
struct WaitSide {
    lock: Mutex<()>,
    cv: Condvar,
    waiters: AtomicUsize,
    parks: AtomicU64,
}

impl WaitSide {
    fn new() -> Self {
        Self {
            lock: Mutex::new(()),
            cv: Condvar::new(),
            waiters: AtomicUsize::new(0),
            parks: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The mutex guards a bare handshake; a poisoned guard is still usable.
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wakes parked threads if the waiter hint reads positive.
    ///
    /// The hint load is lock-free; the notification itself happens under the
    /// mutex so a thread between its predicate check and the wait cannot miss
    /// the signal.
    fn notify_if_parked(&self) {
        if self.waiters.load(Ordering::SeqCst) > 0 {
            let _guard = self.lock();
            self.cv.notify_all();
        }
    }
}

/// Blocking MPMC queue: a lock-free ring plus spin-then-park producer and
/// consumer blocking and a cooperative drain/shutdown protocol.
///
/// All element traffic goes through the embedded [`RingQueue`]; the blocking
/// layer only manages wait/wake signalling. Once
/// [`drain_and_shutdown`](Self::drain_and_shutdown) has run, `push` refuses
/// new elements and `pop` reports end-of-stream (`None`) as soon as the ring
/// is empty, while `try_pop` keeps draining whatever is left.
pub struct BlockingQueue<T> {
    ring: RingQueue<T>,
    spin_budget: u32,
    shutdown: AtomicBool,
    push_side: WaitSide,
    pop_side: WaitSide,
}

impl<T> BlockingQueue<T> {
    /// Builds a queue from a [`BlockingConfig`].
    ///
    /// # Errors
    ///
    /// Returns the ring's [`QueueError`] for a zero or non-power-of-two
    /// capacity.
    pub fn new(config: BlockingConfig) -> Result<Self, QueueError> {
        Ok(Self {
            ring: RingQueue::with_capacity(config.capacity)?,
            spin_budget: config.spin_budget,
            shutdown: AtomicBool::new(false),
            push_side: WaitSide::new(),
            pop_side: WaitSide::new(),
        })
    }

    /// Builds a queue from explicit capacity and spin budget.
    ///
    /// # Errors
    ///
    /// Returns the ring's [`QueueError`] for a zero or non-power-of-two
    /// capacity.
    pub fn with_capacity(capacity: usize, spin_budget: u32) -> Result<Self, QueueError> {
        Self::new(BlockingConfig::new(capacity, spin_budget))
    }

    // ---------------------------------------------------------------------
    // NON-BLOCKING API
    // ---------------------------------------------------------------------

    /// Attempts to enqueue without blocking.
    ///
    /// Returns `Err(value)` if the queue is full or shut down.
    pub fn try_push(&self, value: T) -> Result<(), T> {
        if self.shutdown.load(Ordering::Acquire) {
            return Err(value);
        }
        match self.ring.try_push(value) {
            Ok(()) => {
                self.pop_side.notify_if_parked();
                Ok(())
            }
            Err(value) => Err(value),
        }
    }

    /// Attempts to dequeue without blocking.
    ///
    /// Not gated on shutdown: draining a shut-down queue must keep working.
    pub fn try_pop(&self) -> Option<T> {
        let value = self.ring.try_pop();
        if value.is_some() {
            self.push_side.notify_if_parked();
        }
        value
    }

    // ---------------------------------------------------------------------
    // BLOCKING API
    // ---------------------------------------------------------------------

    /// Enqueues, parking once the spin budget is exhausted.
    ///
    /// Returns `Err(value)` only when shutdown aborted the wait. While the
    /// queue stays full and shutdown is never signalled, this blocks
    /// indefinitely.
    pub fn push(&self, value: T) -> Result<(), T> {
        let mut value = value;
        let mut remaining = self.spin_budget;
        loop {
            if self.shutdown.load(Ordering::Acquire) {
                return Err(value);
            }
            match self.ring.try_push(value) {
                Ok(()) => {
                    self.pop_side.notify_if_parked();
                    return Ok(());
                }
                Err(returned) => value = returned,
            }
            remaining = remaining.saturating_sub(1);
            if remaining > 0 {
                continue;
            }
            self.park(&self.push_side, || !self.ring.is_full());
            remaining = self.spin_budget;
        }
    }

    /// Dequeues, parking once the spin budget is exhausted.
    ///
    /// Returns `None` only when the queue is empty *and* shutdown is set, so
    /// consumers observe end-of-stream exactly after the drain completes. The
    /// shutdown check happens after a failed attempt: elements queued before
    /// shutdown are still returned.
    pub fn pop(&self) -> Option<T> {
        let mut remaining = self.spin_budget;
        loop {
            if let Some(value) = self.ring.try_pop() {
                self.push_side.notify_if_parked();
                return Some(value);
            }
            if self.shutdown.load(Ordering::Acquire) {
                return None;
            }
            remaining = remaining.saturating_sub(1);
            if remaining > 0 {
                continue;
            }
            self.park(&self.pop_side, || !self.ring.is_empty());
            remaining = self.spin_budget;
        }
    }

    /// Parks on `side` until `may_proceed` holds or shutdown is signalled.
    ///
    /// Spurious wakeups re-evaluate the predicate under the mutex.
    fn park(&self, side: &WaitSide, mut may_proceed: impl FnMut() -> bool) {
        let mut guard = side.lock();
        side.waiters.fetch_add(1, Ordering::SeqCst);
        side.parks.fetch_add(1, Ordering::Relaxed);
        while !may_proceed() && !self.shutdown.load(Ordering::Acquire) {
            guard = side.cv.wait(guard).unwrap_or_else(PoisonError::into_inner);
        }
        side.waiters.fetch_sub(1, Ordering::SeqCst);
    }

    // ---------------------------------------------------------------------
    // SHUTDOWN
    // ---------------------------------------------------------------------

    /// Initiates cooperative shutdown and waits for the queue to drain.
    ///
    /// Producers parked in [`push`](Self::push) are released and return
    /// `Err`; consumers parked in [`pop`](Self::pop) are released and keep
    /// draining until the ring is empty. On return no thread is parked in
    /// this queue, the ring is empty, and all subsequent blocking calls
    /// refuse.
    ///
    /// A non-empty ring only empties through consumers, so a caller shutting
    /// down without any must drain via [`try_pop`](Self::try_pop) first.
    /// Idempotent.
    pub fn drain_and_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        let mut wait = SpinWait::new();

        // Release parked producers. Shutdown keeps new ones from parking, so
        // the count only shrinks and this loop terminates.
        loop {
            let parked = {
                let _guard = self.push_side.lock();
                if self.push_side.waiters.load(Ordering::SeqCst) > 0 {
                    self.push_side.cv.notify_all();
                    true
                } else {
                    false
                }
            };
            if !parked {
                break;
            }
            wait.wait();
        }

        // Release parked consumers and wait for the drain to finish. A late
        // parker that failed its predicate and re-spun may still be in
        // flight, hence the re-check of both conditions.
        wait.reset();
        loop {
            let parked = {
                let _guard = self.pop_side.lock();
                if self.pop_side.waiters.load(Ordering::SeqCst) > 0 {
                    self.pop_side.cv.notify_all();
                    true
                } else {
                    false
                }
            };
            if !parked && self.ring.is_empty() {
                break;
            }
            wait.wait();
        }
    }

    /// Returns `true` once shutdown has been initiated.
    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// Returns the ring capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Returns the configured spin budget.
    #[inline]
    pub fn spin_budget(&self) -> u32 {
        self.spin_budget
    }

    /// Snapshot of the number of queued elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Snapshot emptiness check.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Snapshot fullness check.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Snapshot of the park counters.
    pub fn metrics(&self) -> ParkMetrics {
        ParkMetrics {
            producer_parks: self.push_side.parks.load(Ordering::Relaxed),
            consumer_parks: self.pop_side.parks.load(Ordering::Relaxed),
        }
    }
}
