/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Sequence number tracking.
//!
//! Numbers reset on every Logon and there is no resend support, so gaps are
//! only reported to the caller; the expected number then jumps past them.

use gatefix_core::types::SeqNum;
use std::sync::atomic::{AtomicU64, Ordering};

/// Outcome of checking an inbound sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceCheck {
    /// The number was the expected one.
    InOrder,
    /// Lower than expected (possible duplicate).
    TooLow {
        /// Expected sequence number.
        expected: u64,
        /// Received sequence number.
        received: u64,
    },
    /// Higher than expected; messages were missed.
    Gap {
        /// Expected sequence number.
        expected: u64,
        /// Received sequence number.
        received: u64,
    },
}

impl SequenceCheck {
    /// Returns true if the number was the expected one.
    #[must_use]
    pub const fn is_in_order(&self) -> bool {
        matches!(self, Self::InOrder)
    }
}

/// Outgoing and incoming sequence numbers for one session.
#[derive(Debug)]
pub struct SequenceNumbers {
    next_outgoing: AtomicU64,
    next_incoming: AtomicU64,
}

impl SequenceNumbers {
    /// Creates counters starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_outgoing: AtomicU64::new(1),
            next_incoming: AtomicU64::new(1),
        }
    }

    /// Allocates the next outgoing sequence number.
    #[inline]
    pub fn allocate_outgoing(&self) -> SeqNum {
        SeqNum::new(self.next_outgoing.fetch_add(1, Ordering::SeqCst))
    }

    /// Returns the next expected incoming sequence number.
    #[inline]
    #[must_use]
    pub fn next_incoming(&self) -> SeqNum {
        SeqNum::new(self.next_incoming.load(Ordering::SeqCst))
    }

    /// Checks an inbound number and advances the expectation.
    ///
    /// In-order and gapped numbers move the expectation past `received`;
    /// a number that is too low leaves it untouched.
    pub fn check_incoming(&self, received: u64) -> SequenceCheck {
        let expected = self.next_incoming.load(Ordering::SeqCst);
        if received < expected {
            return SequenceCheck::TooLow { expected, received };
        }
        self.next_incoming.store(received + 1, Ordering::SeqCst);
        if received == expected {
            SequenceCheck::InOrder
        } else {
            SequenceCheck::Gap { expected, received }
        }
    }

    /// Resets both directions to 1.
    pub fn reset(&self) {
        self.next_outgoing.store(1, Ordering::SeqCst);
        self.next_incoming.store(1, Ordering::SeqCst);
    }
}

impl Default for SequenceNumbers {
    fn default() -> Self {
        Self::new()
    }
}
