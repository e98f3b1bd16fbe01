/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Heartbeat and TestRequest timing.
//!
//! This module decides when the session should:
//! - send a Heartbeat because nothing was sent for one interval
//! - probe the counterparty with a TestRequest because nothing was received
//! - give up because the TestRequest went unanswered

use gatefix_core::types::Timestamp;
use std::time::{Duration, Instant};

/// Grace period added to the interval before probing with a TestRequest.
const TEST_REQUEST_GRACE: Duration = Duration::from_secs(1);

/// What the session should do next to keep the connection alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatAction {
    /// Nothing is due.
    Idle,
    /// Send a Heartbeat.
    SendHeartbeat,
    /// Send a TestRequest.
    SendTestRequest,
    /// A TestRequest went unanswered; drop the connection.
    TimedOut,
}

/// Tracks send/receive activity for one connection.
#[derive(Debug)]
pub struct HeartbeatMonitor {
    interval: Duration,
    last_sent: Instant,
    last_received: Instant,
    test_request_pending: Option<String>,
    test_request_sent_at: Option<Instant>,
}

impl HeartbeatMonitor {
    /// Creates a monitor for the given heartbeat interval.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            interval,
            last_sent: now,
            last_received: now,
            test_request_pending: None,
            test_request_sent_at: None,
        }
    }

    /// Records that a message was sent.
    #[inline]
    pub fn on_message_sent(&mut self) {
        self.last_sent = Instant::now();
    }

    /// Records that a message was received.
    ///
    /// A Heartbeat echoing the pending TestReqID clears the probe.
    ///
    /// # Arguments
    /// * `is_heartbeat` - Whether the received message is a Heartbeat
    /// * `test_req_id` - The TestReqID carried by the Heartbeat, if any
    pub fn on_message_received(&mut self, is_heartbeat: bool, test_req_id: Option<&str>) {
        self.last_received = Instant::now();

        if is_heartbeat
            && let (Some(pending), Some(received)) = (&self.test_request_pending, test_req_id)
            && pending == received
        {
            self.test_request_pending = None;
            self.test_request_sent_at = None;
        }
    }

    /// Records that a TestRequest was sent.
    pub fn on_test_request_sent(&mut self, test_req_id: String) {
        let now = Instant::now();
        self.test_request_pending = Some(test_req_id);
        self.test_request_sent_at = Some(now);
        self.last_sent = now;
    }

    /// Returns true if nothing was sent for one interval.
    #[must_use]
    pub fn heartbeat_due(&self) -> bool {
        self.last_sent.elapsed() >= self.interval
    }

    /// Returns true if nothing was received for the interval plus grace and
    /// no probe is outstanding.
    #[must_use]
    pub fn test_request_due(&self) -> bool {
        self.test_request_pending.is_none()
            && self.last_received.elapsed() >= self.interval + TEST_REQUEST_GRACE
    }

    /// Returns true if the outstanding TestRequest went unanswered for one interval.
    #[must_use]
    pub fn is_timed_out(&self) -> bool {
        self.test_request_sent_at
            .is_some_and(|sent_at| sent_at.elapsed() >= self.interval)
    }

    /// Returns the most urgent action.
    #[must_use]
    pub fn poll(&self) -> HeartbeatAction {
        if self.is_timed_out() {
            HeartbeatAction::TimedOut
        } else if self.test_request_due() {
            HeartbeatAction::SendTestRequest
        } else if self.heartbeat_due() {
            HeartbeatAction::SendHeartbeat
        } else {
            HeartbeatAction::Idle
        }
    }

    /// Returns the pending TestReqID, if any.
    #[must_use]
    pub fn pending_test_request(&self) -> Option<&str> {
        self.test_request_pending.as_deref()
    }

    /// Returns the time since the last message was received.
    #[must_use]
    pub fn time_since_last_received(&self) -> Duration {
        self.last_received.elapsed()
    }

    /// Returns the heartbeat interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Resets all timers, e.g. after a fresh Logon.
    pub fn reset(&mut self) {
        *self = Self::new(self.interval);
    }
}

/// Generates a TestReqID from the current time.
#[must_use]
pub fn generate_test_req_id() -> String {
    format!("TEST{}", Timestamp::now().as_nanos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_new_monitor_is_idle() {
        let monitor = HeartbeatMonitor::new(Duration::from_secs(30));
        assert_eq!(monitor.poll(), HeartbeatAction::Idle);
        assert!(monitor.pending_test_request().is_none());
    }

    #[test]
    fn test_heartbeat_due_after_interval() {
        let mut monitor = HeartbeatMonitor::new(Duration::from_millis(10));
        sleep(Duration::from_millis(15));
        assert!(monitor.heartbeat_due());
        assert_eq!(monitor.poll(), HeartbeatAction::SendHeartbeat);

        monitor.on_message_sent();
        assert!(!monitor.heartbeat_due());
    }

    #[test]
    fn test_matching_heartbeat_clears_probe() {
        let mut monitor = HeartbeatMonitor::new(Duration::from_secs(30));
        monitor.on_test_request_sent("TEST1".to_string());
        assert_eq!(monitor.pending_test_request(), Some("TEST1"));

        monitor.on_message_received(true, Some("OTHER"));
        assert_eq!(monitor.pending_test_request(), Some("TEST1"));

        monitor.on_message_received(true, Some("TEST1"));
        assert!(monitor.pending_test_request().is_none());
    }

    #[test]
    fn test_unanswered_probe_times_out() {
        let mut monitor = HeartbeatMonitor::new(Duration::from_millis(10));
        monitor.on_test_request_sent("TEST1".to_string());
        assert!(!monitor.is_timed_out());

        sleep(Duration::from_millis(15));
        assert_eq!(monitor.poll(), HeartbeatAction::TimedOut);

        monitor.reset();
        assert!(!monitor.is_timed_out());
    }

    #[test]
    fn test_generate_test_req_id() {
        let id = generate_test_req_id();
        assert!(id.starts_with("TEST"));
        assert!(id.len() > 4);
    }
}
