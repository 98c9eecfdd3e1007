//! Buffering stall escalation.

use super::Phase;
use std::time::{Duration, Instant};

/// Watches how long a session has been buffering.
///
/// A stall is reported once per buffering episode; leaving `Buffering`
/// re-arms the watch.
#[derive(Debug, Clone)]
pub struct StallWatch {
    timeout: Option<Duration>,
    since: Option<Instant>,
    reported: bool,
}

impl StallWatch {
    /// `None` disables escalation.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            since: None,
            reported: false,
        }
    }

    pub fn on_phase(&mut self, phase: Phase, now: Instant) {
        if phase == Phase::Buffering {
            if self.since.is_none() {
                self.since = Some(now);
                self.reported = false;
            }
        } else {
            self.since = None;
            self.reported = false;
        }
    }

    /// When the stall fires, if it is still pending.
    pub fn deadline(&self) -> Option<Instant> {
        match (self.timeout, self.since) {
            (Some(timeout), Some(since)) if !self.reported => Some(since + timeout),
            _ => None,
        }
    }

    /// Returns how long the session has waited if the stall fires now.
    pub fn poll(&mut self, now: Instant) -> Option<Duration> {
        let deadline = self.deadline()?;
        if now < deadline {
            return None;
        }
        self.reported = true;
        self.since.map(|since| now - since)
    }

    pub fn is_stalled(&self) -> bool {
        self.reported
    }

    pub fn cancel(&mut self) {
        self.since = None;
        self.reported = false;
    }
}
