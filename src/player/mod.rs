//! Transport player module for Showreel
//!
//! A player drives one media handle through loading, playing, seeking,
//! volume, rate and fullscreen changes. Playback signals raised by the
//! handle are folded into a single [`Phase`] by one transition function;
//! overlay controls hide themselves after a period of inactivity.

mod builder;
mod controller;
mod controls;
mod rate;
mod stall;
mod state;
mod volume;

pub use builder::{EventDispatcher, EventSubscription, PlayerBuilder};
pub use controller::PlaybackController;
pub use controls::{ControlsEffect, ControlsVisibility};
pub use rate::{PlaybackRate, PLAYBACK_RATES};
pub use stall::StallWatch;
pub use state::{next_phase, PlaybackSession, TransitionContext};
pub use volume::{AudioLevel, Volume};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Discrete playback state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No source loaded yet
    Idle,

    /// Source requested, metadata not yet known
    Loading,

    /// Metadata known, never started
    Ready,

    /// Currently playing
    Playing,

    /// Playback paused
    Paused,

    /// Waiting for data
    Buffering,

    /// Natural end of media reached
    Ended,
}

impl Phase {
    /// Phases in which overlay controls are always shown
    pub fn forces_controls(self) -> bool {
        !matches!(self, Phase::Playing)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Loading => "loading",
            Phase::Ready => "ready",
            Phase::Playing => "playing",
            Phase::Paused => "paused",
            Phase::Buffering => "buffering",
            Phase::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// Signal raised by the media handle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackSignal {
    /// Duration became known
    MetadataAvailable { duration: f64 },

    /// Playhead moved
    TimeAdvanced { current_time: f64 },

    /// Playback stalled for lack of data
    BufferStarved,

    /// Enough data arrived to continue
    BufferResumed,

    /// Playback actually started
    PlaybackStarted,

    /// Playback actually paused
    PlaybackPaused,

    /// Playback reached the end of the media
    PlaybackEnded,
}

/// Result of a transport command
///
/// Commands never fail loudly; a request the player could not act on is
/// reported as `Ignored` with the reason, and otherwise dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The request was forwarded to the handle
    Applied,

    /// The request was dropped
    Ignored(IgnoreReason),
}

impl CommandOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, CommandOutcome::Applied)
    }
}

/// Why a command was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Duration is not known yet
    NotReady,

    /// The command makes no sense in the current phase
    InvalidPhase(Phase),

    /// Already in the requested state
    NoChange,

    /// The argument was NaN or infinite
    InvalidValue,

    /// The player container is not attached to the page
    ContainerDetached,

    /// The media handle refused the request
    HandleRejected,
}

/// Player configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Volume a new session starts at (0.0 to 1.0)
    pub default_volume: f64,

    /// Start sessions muted
    pub start_muted: bool,

    /// Inactivity before overlay controls hide during playback
    pub controls_hide_delay_ms: u64,

    /// Buffering longer than this is reported as a stall (0 disables)
    pub stall_timeout_ms: u64,

    /// Start playing as soon as metadata is available
    pub auto_play: bool,
}

impl PlayerConfig {
    pub fn controls_hide_delay(&self) -> Duration {
        Duration::from_millis(self.controls_hide_delay_ms)
    }

    pub fn stall_timeout(&self) -> Option<Duration> {
        (self.stall_timeout_ms > 0).then(|| Duration::from_millis(self.stall_timeout_ms))
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_volume: 1.0,
            start_muted: false,
            controls_hide_delay_ms: 3000,
            stall_timeout_ms: 15_000,
            auto_play: false,
        }
    }
}

/// Player event for external event handling
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Phase changed
    PhaseChanged { from: Phase, to: Phase },

    /// Duration became known
    MetadataLoaded { duration: f64 },

    /// Position changed
    PositionChanged { current_time: f64 },

    /// Volume or mute changed
    VolumeChanged { volume: f64, muted: bool },

    /// Playback rate changed
    RateChanged { rate: f64 },

    /// Fullscreen flag changed
    FullscreenChanged { active: bool },

    /// Overlay controls shown or hidden
    ControlsVisibilityChanged { visible: bool },

    /// Buffering has lasted past the stall timeout
    Stalled { waited: Duration },

    /// End of media reached
    EndOfMedia,
}

/// Player event handler trait
pub trait PlayerEventHandler {
    /// Handle player event
    ///
    /// # Arguments
    ///
    /// * `event` - Player event
    fn handle_event(&mut self, event: &PlayerEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_forces_controls() {
        assert!(!Phase::Playing.forces_controls());
        for phase in [
            Phase::Idle,
            Phase::Loading,
            Phase::Ready,
            Phase::Paused,
            Phase::Buffering,
            Phase::Ended,
        ] {
            assert!(phase.forces_controls(), "{} should force controls", phase);
        }
    }

    #[test]
    fn test_player_config_default() {
        let config = PlayerConfig::default();
        assert_eq!(config.controls_hide_delay(), Duration::from_millis(3000));
        assert_eq!(config.stall_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.default_volume, 1.0);
        assert!(!config.auto_play);
    }

    #[test]
    fn test_stall_timeout_zero_disables() {
        let config = PlayerConfig {
            stall_timeout_ms: 0,
            ..PlayerConfig::default()
        };
        assert_eq!(config.stall_timeout(), None);
    }

    #[test]
    fn test_command_outcome() {
        assert!(CommandOutcome::Applied.is_applied());
        assert!(!CommandOutcome::Ignored(IgnoreReason::NotReady).is_applied());
    }
}
