//! Playback session state for Showreel
//!
//! This module holds the per-player transport data and the single
//! transition function that folds playback signals into a [`Phase`].

use crate::content::MediaSource;
use crate::player::{AudioLevel, Phase, PlaybackRate, PlaybackSignal, PlayerConfig, Volume};
use log::{debug, info};

/// Extra facts the transition function needs beyond the current phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionContext {
    /// Whether playback has been asked for and not since withdrawn
    pub play_requested: bool,

    /// Phase to fall back to when buffering ends without a play request
    pub resume_phase: Phase,
}

/// Compute the phase that follows `current` when `signal` arrives.
///
/// This is the whole playback state machine; it has no side effects.
pub fn next_phase(current: Phase, signal: &PlaybackSignal, ctx: &TransitionContext) -> Phase {
    use PlaybackSignal::*;

    match (current, signal) {
        (Phase::Idle | Phase::Loading, MetadataAvailable { .. }) => Phase::Ready,
        (_, MetadataAvailable { .. }) => current,

        (_, TimeAdvanced { .. }) => current,

        (Phase::Idle | Phase::Ended, BufferStarved) => current,
        (_, BufferStarved) => Phase::Buffering,

        (Phase::Buffering, BufferResumed) if ctx.play_requested => Phase::Playing,
        (Phase::Buffering, BufferResumed) => ctx.resume_phase,
        (_, BufferResumed) => current,

        (Phase::Idle, PlaybackStarted) => current,
        (_, PlaybackStarted) => Phase::Playing,

        (Phase::Idle | Phase::Ended, PlaybackPaused) => current,
        (_, PlaybackPaused) => Phase::Paused,

        (Phase::Idle, PlaybackEnded) => current,
        (_, PlaybackEnded) => Phase::Ended,
    }
}

/// Transport data for one mounted player
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    /// Source being played, if one has been supplied
    pub source: Option<MediaSource>,

    /// Current phase
    pub phase: Phase,

    /// Playhead in seconds
    pub current_time: f64,

    /// Duration in seconds once metadata has arrived
    pub duration: Option<f64>,

    /// Volume and mute
    pub audio: AudioLevel,

    /// Playback rate
    pub rate: PlaybackRate,

    /// Fullscreen flag as last requested or reported
    pub fullscreen: bool,

    /// Playback has been asked for and not withdrawn
    pub play_requested: bool,

    /// Where buffering returns to without a play request
    pub resume_phase: Phase,
}

impl PlaybackSession {
    /// Create an idle session with the configured starting volume
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            source: None,
            phase: Phase::Idle,
            current_time: 0.0,
            duration: None,
            audio: AudioLevel::new(Volume::new(config.default_volume), config.start_muted),
            rate: PlaybackRate::default(),
            fullscreen: false,
            play_requested: false,
            resume_phase: Phase::Idle,
        }
    }

    /// Whether commands that need the duration can run
    pub fn is_ready(&self) -> bool {
        self.duration.is_some()
    }

    /// Playhead as a fraction of the duration
    pub fn progress(&self) -> Option<f64> {
        self.duration.map(|d| (self.current_time / d).clamp(0.0, 1.0))
    }

    /// Clamp a time into `[0, duration]`, or `[0, inf)` while unknown
    pub fn clamp_time(&self, seconds: f64) -> f64 {
        let upper = self.duration.unwrap_or(f64::INFINITY);
        seconds.clamp(0.0, upper)
    }

    pub(crate) fn transition_context(&self) -> TransitionContext {
        TransitionContext {
            play_requested: self.play_requested,
            resume_phase: self.resume_phase,
        }
    }

    /// Move to `to`, remembering where buffering should return to.
    /// Returns the previous phase when it actually changed.
    pub(crate) fn enter(&mut self, to: Phase) -> Option<Phase> {
        let from = self.phase;
        if from == to {
            return None;
        }
        if to == Phase::Buffering {
            self.resume_phase = from;
        }
        self.phase = to;
        info!("Phase changed: {} -> {}", from, to);
        Some(from)
    }

    /// Apply the data carried by a signal, then its phase transition.
    /// Returns the previous phase when the phase changed.
    pub(crate) fn apply(&mut self, signal: &PlaybackSignal) -> Option<Phase> {
        match *signal {
            PlaybackSignal::MetadataAvailable { duration } => {
                if self.duration.is_some() {
                    debug!("Ignoring repeated metadata ({:.3}s)", duration);
                } else if duration.is_finite() && duration > 0.0 {
                    self.duration = Some(duration);
                    self.current_time = self.clamp_time(self.current_time);
                    if matches!(self.resume_phase, Phase::Idle | Phase::Loading) {
                        self.resume_phase = Phase::Ready;
                    }
                } else {
                    debug!("Metadata carried unusable duration {}", duration);
                }
            }
            PlaybackSignal::TimeAdvanced { current_time } => {
                if current_time.is_finite() {
                    self.current_time = self.clamp_time(current_time);
                }
            }
            PlaybackSignal::PlaybackStarted => self.play_requested = true,
            PlaybackSignal::PlaybackPaused | PlaybackSignal::PlaybackEnded => {
                self.play_requested = false;
            }
            PlaybackSignal::BufferStarved | PlaybackSignal::BufferResumed => {}
        }

        // Metadata with no usable duration must not open the transport.
        if matches!(signal, PlaybackSignal::MetadataAvailable { .. }) && !self.is_ready() {
            return None;
        }

        let to = next_phase(self.phase, signal, &self.transition_context());
        self.enter(to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PlaybackSignal::*;

    const ALL_PHASES: [Phase; 7] = [
        Phase::Idle,
        Phase::Loading,
        Phase::Ready,
        Phase::Playing,
        Phase::Paused,
        Phase::Buffering,
        Phase::Ended,
    ];

    fn ctx(play_requested: bool) -> TransitionContext {
        TransitionContext {
            play_requested,
            resume_phase: Phase::Paused,
        }
    }

    #[test]
    fn test_metadata_opens_transport() {
        let metadata = MetadataAvailable { duration: 3.0 };
        assert_eq!(next_phase(Phase::Idle, &metadata, &ctx(false)), Phase::Ready);
        assert_eq!(next_phase(Phase::Loading, &metadata, &ctx(false)), Phase::Ready);
        assert_eq!(next_phase(Phase::Playing, &metadata, &ctx(false)), Phase::Playing);
    }

    #[test]
    fn test_time_never_changes_phase() {
        for phase in ALL_PHASES {
            assert_eq!(next_phase(phase, &TimeAdvanced { current_time: 1.0 }, &ctx(true)), phase);
        }
    }

    #[test]
    fn test_buffering_overlays_playing_and_paused() {
        assert_eq!(next_phase(Phase::Playing, &BufferStarved, &ctx(true)), Phase::Buffering);
        assert_eq!(next_phase(Phase::Paused, &BufferStarved, &ctx(false)), Phase::Buffering);
        assert_eq!(next_phase(Phase::Ended, &BufferStarved, &ctx(false)), Phase::Ended);
        assert_eq!(next_phase(Phase::Idle, &BufferStarved, &ctx(false)), Phase::Idle);
    }

    #[test]
    fn test_buffer_resumed_requires_play_request() {
        assert_eq!(next_phase(Phase::Buffering, &BufferResumed, &ctx(true)), Phase::Playing);
        assert_eq!(next_phase(Phase::Buffering, &BufferResumed, &ctx(false)), Phase::Paused);
        assert_eq!(next_phase(Phase::Paused, &BufferResumed, &ctx(true)), Phase::Paused);
    }

    #[test]
    fn test_pause_does_not_override_ended() {
        assert_eq!(next_phase(Phase::Ended, &PlaybackPaused, &ctx(false)), Phase::Ended);
        assert_eq!(next_phase(Phase::Playing, &PlaybackPaused, &ctx(false)), Phase::Paused);
    }

    #[test]
    fn test_started_clears_ended() {
        assert_eq!(next_phase(Phase::Ended, &PlaybackStarted, &ctx(true)), Phase::Playing);
        assert_eq!(next_phase(Phase::Idle, &PlaybackStarted, &ctx(true)), Phase::Idle);
    }

    #[test]
    fn test_ended_from_any_loaded_phase() {
        for phase in ALL_PHASES.into_iter().filter(|p| *p != Phase::Idle) {
            assert_eq!(next_phase(phase, &PlaybackEnded, &ctx(false)), Phase::Ended);
        }
    }

    #[test]
    fn test_session_time_clamped_to_duration() {
        let mut session = PlaybackSession::new(&PlayerConfig::default());
        session.phase = Phase::Loading;
        session.apply(&MetadataAvailable { duration: 10.0 });
        session.apply(&TimeAdvanced { current_time: 12.0 });
        assert_eq!(session.current_time, 10.0);
        session.apply(&TimeAdvanced { current_time: -1.0 });
        assert_eq!(session.current_time, 0.0);
    }

    #[test]
    fn test_duration_immutable_once_known() {
        let mut session = PlaybackSession::new(&PlayerConfig::default());
        session.phase = Phase::Loading;
        session.apply(&MetadataAvailable { duration: 10.0 });
        session.apply(&MetadataAvailable { duration: 99.0 });
        assert_eq!(session.duration, Some(10.0));
    }

    #[test]
    fn test_unusable_duration_keeps_loading() {
        let mut session = PlaybackSession::new(&PlayerConfig::default());
        session.phase = Phase::Loading;
        assert_eq!(session.apply(&MetadataAvailable { duration: f64::NAN }), None);
        assert_eq!(session.phase, Phase::Loading);
        assert!(!session.is_ready());
    }

    #[test]
    fn test_buffering_returns_to_ready_without_request() {
        let mut session = PlaybackSession::new(&PlayerConfig::default());
        session.phase = Phase::Loading;
        session.apply(&BufferStarved);
        session.apply(&MetadataAvailable { duration: 5.0 });
        assert_eq!(session.phase, Phase::Buffering);
        session.apply(&BufferResumed);
        assert_eq!(session.phase, Phase::Ready);
    }

    #[test]
    fn test_progress() {
        let mut session = PlaybackSession::new(&PlayerConfig::default());
        assert_eq!(session.progress(), None);
        session.duration = Some(125.4);
        session.current_time = 62.7;
        assert!((session.progress().unwrap() - 0.5).abs() < 1e-12);
    }
}
