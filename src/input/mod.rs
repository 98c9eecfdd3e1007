//! Pointer input for the transport overlay
//!
//! The host translates its raw pointer events into [`PointerEvent`]s; the
//! controller treats every one of them as activity and turns presses or
//! drags over a track into seek or volume changes.

pub mod scrubber;

pub use scrubber::scrub_fraction;

/// Bounding rectangle of a horizontal track, in page coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl TrackRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Which track a scrub gesture acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrubTarget {
    /// Progress bar: the fraction is multiplied by the duration
    Seek,

    /// Volume bar: the fraction is the volume
    Volume,
}

/// Pointer event over a player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer moved over the player
    Moved { x: f64, y: f64 },

    /// Press or drag over a track
    Scrub {
        target: ScrubTarget,
        track: TrackRect,
        x: f64,
    },
}
