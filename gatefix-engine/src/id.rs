/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Client order id generation.

use gatefix_core::types::Timestamp;
use std::fmt;

/// Clock returning nanoseconds since the Unix epoch.
pub type Clock = Box<dyn FnMut() -> u64 + Send>;

/// Strictly increasing ids seeded from a nanosecond clock.
///
/// Each id is the clock reading when that is above the previous id, and the
/// previous id plus one otherwise, so a clock that stalls or steps back
/// never yields a duplicate. Once `u64::MAX` has been issued the generator
/// is exhausted and yields nothing.
pub struct ClOrdIdGenerator {
    last: u64,
    clock: Clock,
}

impl ClOrdIdGenerator {
    /// Creates a generator reading the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Box::new(|| Timestamp::now().as_nanos()))
    }

    /// Creates a generator reading the given clock.
    #[must_use]
    pub fn with_clock(clock: Clock) -> Self {
        Self { last: 0, clock }
    }

    /// Returns the next id, or `None` once `u64::MAX` has been issued.
    pub fn next_id(&mut self) -> Option<u64> {
        let now = (self.clock)();
        self.last = if now > self.last {
            now
        } else {
            self.last.checked_add(1)?
        };
        Some(self.last)
    }

    /// Returns the most recently issued id, or zero.
    #[must_use]
    pub const fn last(&self) -> u64 {
        self.last
    }
}

impl Default for ClOrdIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClOrdIdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClOrdIdGenerator")
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripted(readings: Vec<u64>) -> ClOrdIdGenerator {
        let mut readings = readings.into_iter();
        ClOrdIdGenerator::with_clock(Box::new(move || readings.next().unwrap_or(0)))
    }

    #[test]
    fn test_follows_advancing_clock() {
        let mut ids = scripted(vec![100, 250, 900]);
        assert_eq!(ids.next_id(), Some(100));
        assert_eq!(ids.next_id(), Some(250));
        assert_eq!(ids.next_id(), Some(900));
        assert_eq!(ids.last(), 900);
    }

    #[test]
    fn test_clock_regression_increments() {
        let mut ids = scripted(vec![1000, 1000, 500, 1001, 1003]);
        assert_eq!(ids.next_id(), Some(1000));
        assert_eq!(ids.next_id(), Some(1001));
        assert_eq!(ids.next_id(), Some(1002));
        assert_eq!(ids.next_id(), Some(1003));
        assert_eq!(ids.next_id(), Some(1004));
    }

    #[test]
    fn test_strictly_increasing_under_any_clock() {
        let readings: Vec<u64> = (0..200u64).map(|i| (i * 7919) % 97).collect();
        let mut ids = scripted(readings);
        let mut previous = 0;
        for _ in 0..200 {
            let id = ids.next_id().unwrap();
            assert!(id > previous);
            previous = id;
        }
    }

    #[test]
    fn test_system_clock() {
        let mut ids = ClOrdIdGenerator::new();
        let first = ids.next_id().unwrap();
        assert!(ids.next_id().unwrap() > first);
    }

    #[test]
    fn test_exhausted_at_max() {
        let mut ids = scripted(vec![u64::MAX - 1, 5, 5, u64::MAX]);
        assert_eq!(ids.next_id(), Some(u64::MAX - 1));
        assert_eq!(ids.next_id(), Some(u64::MAX));
        assert_eq!(ids.next_id(), None);
        assert_eq!(ids.next_id(), None);
        assert_eq!(ids.last(), u64::MAX);
    }
}
