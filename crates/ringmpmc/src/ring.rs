use crate::invariants::{
    debug_assert_occupancy_bounded, debug_assert_slot_at_rest, debug_assert_ticket_monotonic,
};
use crate::{QueueError, SpinWait};
use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// This MPMC ring buffer coordinates any number of producers and consumers
// through a per-slot sequence protocol instead of a shared lock.
//
// ## Tickets
//
// `head` and `tail` are unbounded u64 tickets, never wrapped indices. A
// producer claims enqueue ticket `h` by CAS-ing `head` from `h` to `h + 1`;
// a consumer claims drain ticket `t` the same way on `tail`. The slot for a
// ticket is `slots[ticket & mask]`, so ticket `t` and ticket `t + capacity`
// reuse the same physical slot on consecutive laps.
//
// ## Slot phases
//
// Each slot carries its own atomic `sequence` encoding which ticket it is
// currently serving. For the slot at index `i` on lap `k`:
//
//   sequence == k*capacity + i       empty, ready for producer ticket k*capacity + i
//   sequence == k*capacity + i + 1   full, holding the element of that ticket
//
// A producer that observes `sequence == h` may claim ticket `h`; a consumer
// that observes `sequence == t + 1` may claim ticket `t`. Popping re-primes
// the slot with `t + capacity`, handing it to the producer of the next lap.
//
// ## Ordering protocol
//
// Publication rides entirely on the per-slot `sequence`:
//
//   producer: write value, then store sequence with Release
//   consumer: load sequence with Acquire, then read value
//
// so the value write happens-before the value read within every lap, and the
// consumer's re-priming store hands the slot back to the next-lap producer
// the same way. The `head`/`tail` CAS only arbitrates ticket ownership and
// needs no ordering of its own; Relaxed suffices on both success and failure.
//
// =============================================================================

/// One ring slot: the ticket it is serving plus raw element storage.
///
/// The value is live iff the sequence is in the full phase for the slot's
/// current lap.
struct Slot<T> {
    sequence: AtomicU64,
    value: UnsafeCell<MaybeUninit<T>>,
}

/// Lock-free bounded MPMC FIFO queue.
///
/// Elements are handed from producers to consumers in ticket order: producers
/// claim strictly increasing enqueue tickets, consumers claim strictly
/// increasing drain tickets, and the consumer at ticket `t` waits for exactly
/// the element published at ticket `t`. The visible interleaving between
/// concurrent producers is unspecified beyond each producer's own order.
///
/// Capacity is fixed at construction and must be a power of two so slot
/// indexing reduces to a bitmask.
pub struct RingQueue<T> {
    slots: Box<[Slot<T>]>,
    mask: u64,
    /// Next enqueue ticket. Monotonic, never decreases.
    head: CachePadded<AtomicU64>,
    /// Next drain ticket. Monotonic, never decreases.
    tail: CachePadded<AtomicU64>,
}

// Safety: the slot protocol transfers exclusive access to each element from
// the producer that published it to the single consumer that claimed its
// ticket, so sharing the queue across threads only moves T between threads.
unsafe impl<T: Send> Send for RingQueue<T> {}
unsafe impl<T: Send> Sync for RingQueue<T> {}

impl<T> RingQueue<T> {
    /// Creates a ring with the given capacity.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::ZeroCapacity`] for capacity 0 and
    /// [`QueueError::CapacityNotPowerOfTwo`] for any capacity ≥ 2 that is not
    /// a power of two. Capacity 1 is accepted.
    pub fn with_capacity(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }
        if !capacity.is_power_of_two() {
            return Err(QueueError::CapacityNotPowerOfTwo { capacity });
        }

        // Each slot starts empty, primed for its own index as the lap-0 ticket.
        let slots: Box<[Slot<T>]> = (0..capacity as u64)
            .map(|ticket| Slot {
                sequence: AtomicU64::new(ticket),
                value: UnsafeCell::new(MaybeUninit::uninit()),
            })
            .collect();

        Ok(Self {
            slots,
            mask: capacity as u64 - 1,
            head: CachePadded::new(AtomicU64::new(0)),
            tail: CachePadded::new(AtomicU64::new(0)),
        })
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// Returns the configured capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns a snapshot of the number of queued elements.
    ///
    /// Racy by nature; suitable only for predicates and heuristics.
    #[inline]
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head.saturating_sub(tail) as usize
    }

    /// Returns `true` if the queue was empty at the moment of observation.
    #[inline]
    pub fn is_empty(&self) -> bool {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head == tail
    }

    /// Returns `true` if the queue was full at the moment of observation.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    #[inline]
    fn slot(&self, ticket: u64) -> &Slot<T> {
        &self.slots[(ticket & self.mask) as usize]
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Attempts to enqueue without blocking.
    ///
    /// Returns `Err(value)` if the queue is full at the claimed ticket, giving
    /// the element back to the caller. CAS conflicts with other producers are
    /// absorbed internally with adaptive backoff; only fullness fails.
    pub fn try_push(&self, value: T) -> Result<(), T> {
        let mut head = self.head.load(Ordering::Relaxed);
        let mut wait = SpinWait::new();
        loop {
            let slot = self.slot(head);
            let seq = slot.sequence.load(Ordering::Acquire);
            if seq == head {
                // Slot is empty and waiting for exactly this ticket.
                match self.head.compare_exchange_weak(
                    head,
                    head + 1,
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        debug_assert_occupancy_bounded!(
                            head + 1,
                            self.tail.load(Ordering::Relaxed),
                            self.capacity()
                        );
                        // SAFETY: the CAS made this thread the unique owner of
                        // ticket `head`; no consumer reads the slot until the
                        // release store below flips it to the full phase.
                        unsafe { (*slot.value.get()).write(value) };
                        slot.sequence.store(head + 1, Ordering::Release);
                        return Ok(());
                    }
                    Err(current) => {
                        // Another producer took the ticket; retry from the
                        // value the CAS observed.
                        head = current;
                        wait.wait();
                    }
                }
            } else if seq < head {
                // Still occupied from the previous lap: full at this ticket.
                return Err(value);
            } else {
                // Fell behind other producers; catch up.
                let current = self.head.load(Ordering::Acquire);
                debug_assert_ticket_monotonic!("enqueue", head, current);
                head = current;
            }
        }
    }

    /// Enqueues, spinning with adaptive backoff until a slot frees up.
    ///
    /// Never parks on the OS; intended for callers with upper-bound knowledge
    /// of contention. With no consumer draining a full ring this spins
    /// indefinitely.
    pub fn push(&self, value: T) {
        let mut value = value;
        let mut wait = SpinWait::new();
        loop {
            match self.try_push(value) {
                Ok(()) => return,
                Err(v) => {
                    value = v;
                    wait.wait();
                }
            }
        }
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Attempts to dequeue without blocking.
    ///
    /// Returns `None` if no element has been published for the claimed drain
    /// ticket. On success the element is moved out and the slot is re-primed
    /// for the next lap.
    pub fn try_pop(&self) -> Option<T> {
        let mut tail = self.tail.load(Ordering::Relaxed);
        let mut wait = SpinWait::new();
        loop {
            let slot = self.slot(tail);
            let seq = slot.sequence.load(Ordering::Acquire);
            if seq == tail + 1 {
                // An element destined for this ticket is published.
                match self.tail.compare_exchange_weak(
                    tail,
                    tail + 1,
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: the CAS made this thread the unique owner of
                        // drain ticket `tail`, and the Acquire load of the
                        // full phase synchronized with the producer's Release
                        // publication, so the value is initialized.
                        let value = unsafe { (*slot.value.get()).assume_init_read() };
                        // Hand the slot to the producer of the next lap.
                        slot.sequence
                            .store(tail + self.capacity() as u64, Ordering::Release);
                        return Some(value);
                    }
                    Err(current) => {
                        tail = current;
                        wait.wait();
                    }
                }
            } else if seq < tail + 1 {
                // Producer for this ticket has not published: empty here.
                return None;
            } else {
                // Fell behind other consumers; catch up.
                let current = self.tail.load(Ordering::Acquire);
                debug_assert_ticket_monotonic!("drain", tail, current);
                tail = current;
            }
        }
    }

    /// Dequeues, spinning with adaptive backoff until an element arrives.
    ///
    /// Never parks on the OS. With no producer filling an empty ring this
    /// spins indefinitely.
    pub fn pop(&self) -> T {
        let mut wait = SpinWait::new();
        loop {
            if let Some(value) = self.try_pop() {
                return value;
            }
            wait.wait();
        }
    }
}

impl<T> Drop for RingQueue<T> {
    fn drop(&mut self) {
        // Exclusive access: every claimed ticket has finished publishing, so
        // each undrained ticket's slot sits in the full phase. Guard on the
        // phase anyway and drop exactly those elements.
        let head = *self.head.get_mut();
        let tail = *self.tail.get_mut();
        for ticket in tail..head {
            let slot = &mut self.slots[(ticket & self.mask) as usize];
            let seq = *slot.sequence.get_mut();
            debug_assert_slot_at_rest!(seq, ticket);
            if seq == ticket + 1 {
                // SAFETY: full phase means the value was initialized and never
                // consumed.
                unsafe { slot.value.get_mut().assume_init_drop() };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_fifo_order() {
        let queue = RingQueue::with_capacity(8).unwrap();

        for i in 0..8 {
            assert!(queue.try_push(i).is_ok());
        }
        for i in 0..8 {
            assert_eq!(queue.try_pop(), Some(i));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_full_returns_value() {
        let queue = RingQueue::with_capacity(4).unwrap();

        for i in 0..4 {
            assert!(queue.try_push(i).is_ok());
        }
        assert!(queue.is_full());
        assert_eq!(queue.try_push(99), Err(99));

        // Draining one slot makes room again.
        assert_eq!(queue.try_pop(), Some(0));
        assert!(queue.try_push(99).is_ok());
    }

    #[test]
    fn test_pop_empty_returns_none() {
        let queue = RingQueue::<u64>::with_capacity(4).unwrap();
        assert_eq!(queue.try_pop(), None);

        queue.push(7);
        assert_eq!(queue.try_pop(), Some(7));
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn test_capacity_one() {
        let queue = RingQueue::with_capacity(1).unwrap();
        assert_eq!(queue.capacity(), 1);

        // The single slot cycles through laps.
        for lap in 0..10 {
            assert!(queue.try_push(lap).is_ok());
            assert_eq!(queue.try_push(lap), Err(lap));
            assert_eq!(queue.try_pop(), Some(lap));
        }
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn test_len_tracks_occupancy() {
        let queue = RingQueue::with_capacity(16).unwrap();
        assert_eq!(queue.len(), 0);

        for i in 0..10 {
            queue.push(i);
        }
        assert_eq!(queue.len(), 10);

        for _ in 0..4 {
            queue.pop();
        }
        assert_eq!(queue.len(), 6);
        assert!(!queue.is_empty());
        assert!(!queue.is_full());
    }

    #[test]
    fn test_wraparound_many_laps() {
        let queue = RingQueue::with_capacity(4).unwrap();

        // Push/pop far past one lap so every slot is reused repeatedly.
        for i in 0u64..1000 {
            queue.push(i);
            assert_eq!(queue.pop(), i);
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_invalid_capacities_rejected() {
        for capacity in [3usize, 5, 6, 7, 9, 12, 1000] {
            assert_eq!(
                RingQueue::<u64>::with_capacity(capacity).err(),
                Some(QueueError::CapacityNotPowerOfTwo { capacity })
            );
        }
        assert_eq!(
            RingQueue::<u64>::with_capacity(0).err(),
            Some(QueueError::ZeroCapacity)
        );
        for capacity in [1usize, 2, 4, 8, 16, 1024] {
            assert!(RingQueue::<u64>::with_capacity(capacity).is_ok());
        }
    }

    #[test]
    fn test_drop_releases_remaining_elements() {
        use std::sync::atomic::AtomicUsize;

        static DROP_COUNT: AtomicUsize = AtomicUsize::new(0);

        struct DropTracker;

        impl Drop for DropTracker {
            fn drop(&mut self) {
                DROP_COUNT.fetch_add(1, Ordering::SeqCst);
            }
        }

        DROP_COUNT.store(0, Ordering::SeqCst);

        let queue = RingQueue::with_capacity(8).unwrap();
        for _ in 0..5 {
            assert!(queue.try_push(DropTracker).is_ok());
        }
        // Consume two; those drop immediately.
        drop(queue.try_pop());
        drop(queue.try_pop());
        assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 2);

        // Teardown drops the three still queued, exactly once each.
        drop(queue);
        assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 5);
    }
}
