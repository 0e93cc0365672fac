//! Debug assertion macros for ring invariants.
//!
//! Active only in debug builds; release builds compile them away entirely.

/// Assert that the distance between the producer and consumer tickets never
/// exceeds the ring capacity.
///
/// Checked right after a producer claims a ticket.
macro_rules! debug_assert_occupancy_bounded {
    ($head:expr, $tail:expr, $capacity:expr) => {
        debug_assert!(
            ($head).wrapping_sub($tail) as usize <= $capacity,
            "occupancy {} exceeds capacity {}",
            ($head).wrapping_sub($tail),
            $capacity
        )
    };
}

/// Assert that a re-read ticket counter did not move backwards.
///
/// Checked when a producer or consumer refreshes its view of `head`/`tail`
/// after falling behind.
macro_rules! debug_assert_ticket_monotonic {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "{} ticket decreased from {} to {}",
            $name,
            $old,
            $new
        )
    };
}

/// Assert that a slot observed at rest is in one of its two legal phases:
/// empty for ticket `t` (`sequence == t`) or full holding ticket `t`
/// (`sequence == t + 1`).
///
/// Checked during teardown, when no other thread can be mid-operation.
macro_rules! debug_assert_slot_at_rest {
    ($seq:expr, $ticket:expr) => {
        debug_assert!(
            $seq == $ticket || $seq == $ticket + 1,
            "slot sequence {} outside rest phases for ticket {}",
            $seq,
            $ticket
        )
    };
}

pub(crate) use debug_assert_occupancy_bounded;
pub(crate) use debug_assert_slot_at_rest;
pub(crate) use debug_assert_ticket_monotonic;
