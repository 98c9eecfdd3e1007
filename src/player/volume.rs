//! Volume and mute handling.
//!
//! Mute is a flag beside the stored volume, not a volume of zero: toggling
//! it never touches the level, so unmuting lands back where the user left
//! it. Dragging the level to zero is the one path that sets the flag.

/// Volume level, guaranteed to be within 0.0 to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume(f64);

impl Volume {
    pub const MAX: Self = Self(1.0);
    pub const SILENT: Self = Self(0.0);

    /// Creates a new volume level, clamping to the valid range.
    /// NaN is treated as silence.
    #[must_use]
    pub fn new(volume: f64) -> Self {
        if volume.is_nan() {
            return Self::SILENT;
        }
        Self(volume.clamp(0.0, 1.0))
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn is_silent(self) -> bool {
        self.0 == 0.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::MAX
    }
}

/// Stored volume plus the independent muted flag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioLevel {
    volume: Volume,
    muted: bool,
}

impl AudioLevel {
    pub fn new(volume: Volume, muted: bool) -> Self {
        Self { volume, muted }
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// What the listener actually hears.
    pub fn effective(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.volume.value()
        }
    }

    /// Store a new level. Zero mutes; any audible level clears a prior mute.
    pub fn set_volume(&mut self, fraction: f64) {
        self.volume = Volume::new(fraction);
        if self.volume.is_silent() {
            self.muted = true;
        } else if self.muted {
            self.muted = false;
        }
    }

    /// Flip the muted flag, leaving the stored level alone.
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }
}

impl Default for AudioLevel {
    fn default() -> Self {
        Self::new(Volume::default(), false)
    }
}
