//! Hosting environment boundary
//!
//! The hosting environment owns the real playable media object and the
//! event loop. This module defines the narrow contract the controllers use
//! to drive it, plus the clock they read time from.

pub mod simulated;

pub use simulated::{HandleCommand, SimulatedFeed, SimulatedMediaHandle};

use crate::utils::error::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Playable media object provided by the hosting environment
///
/// Commands are requests: their effect is reported back later through
/// playback signals, which the host delivers to the owning controller only
/// while signals are bound.
pub trait MediaHandle {
    /// Attach the playback signal listeners for this handle
    fn bind_signals(&mut self) -> Result<()>;

    /// Detach the playback signal listeners. Must be safe to call twice.
    fn unbind_signals(&mut self);

    /// Start loading a progressive media file
    ///
    /// # Arguments
    ///
    /// * `url` - Media URL supplied by the content source
    fn load(&mut self, url: &str) -> Result<()>;

    /// Request playback start
    fn play(&mut self) -> Result<()>;

    /// Request playback stop
    fn pause(&mut self) -> Result<()>;

    /// Move the playhead
    ///
    /// # Arguments
    ///
    /// * `seconds` - Target time in seconds
    fn set_current_time(&mut self, seconds: f64) -> Result<()>;

    /// Set the stored volume level (0.0 to 1.0)
    fn set_volume(&mut self, volume: f64) -> Result<()>;

    /// Set the muted flag
    fn set_muted(&mut self, muted: bool) -> Result<()>;

    /// Set the playback rate multiplier
    fn set_playback_rate(&mut self, rate: f64) -> Result<()>;

    /// Restart from the beginning when the end is reached
    fn set_looping(&mut self, looping: bool) -> Result<()>;

    /// Whether the player container is attached and can go fullscreen
    fn container_attached(&self) -> bool;

    /// Ask the host to make the player container fullscreen
    fn request_fullscreen(&mut self) -> Result<()>;

    /// Ask the host to leave fullscreen
    fn exit_fullscreen(&mut self) -> Result<()>;
}

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock shared between a controller and its driver
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    /// Create a clock frozen at the current instant
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    /// Convenience for `advance(Duration::from_millis(ms))`
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}
