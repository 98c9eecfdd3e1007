//! Playback rate domain type.
//!
//! The transport offers a fixed ladder of rates and a single button that
//! steps through it, wrapping from the fastest back to the slowest.

/// Rates offered by the transport, slowest first.
pub const PLAYBACK_RATES: [f64; 6] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

const NORMAL_INDEX: usize = 2;

/// One of the [`PLAYBACK_RATES`], stored by position.
///
/// Holding the index rather than the float makes it impossible to end up
/// between rungs of the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackRate(usize);

impl PlaybackRate {
    /// Normal speed (1x)
    pub const NORMAL: Self = Self(NORMAL_INDEX);

    /// Returns the rate multiplier.
    #[must_use]
    pub fn value(self) -> f64 {
        PLAYBACK_RATES[self.0]
    }

    /// Next rung, wrapping from the last to the first.
    #[must_use]
    pub fn cycle(self) -> Self {
        Self((self.0 + 1) % PLAYBACK_RATES.len())
    }

    /// Label for the rate button, e.g. "1.25x".
    #[must_use]
    pub fn label(self) -> String {
        format!("{}x", self.value())
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        Self::NORMAL
    }
}
