//! Pointer-to-fraction conversion shared by the seek and volume tracks.

use super::TrackRect;

/// Fraction of `track` to the left of `pointer_x`, clamped to `[0, 1]`.
///
/// A degenerate track (zero, negative or non-finite width) and a
/// non-finite pointer both map to 0.
pub fn scrub_fraction(track: &TrackRect, pointer_x: f64) -> f64 {
    if !(track.width.is_finite() && track.width > 0.0) || !pointer_x.is_finite() {
        return 0.0;
    }
    ((pointer_x - track.left) / track.width).clamp(0.0, 1.0)
}
