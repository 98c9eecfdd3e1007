//! Auto-hiding overlay controls.
//!
//! Controls stay up in every phase except `Playing`. While playing they hide
//! once the hide delay passes without pointer activity or a command. The
//! countdown is a single optional deadline: arming it replaces any previous
//! one, so two timers can never be live for the same player.

use super::Phase;
use std::time::{Duration, Instant};

/// Effect produced by a visibility change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlsEffect {
    /// No effect.
    None,
    /// Visibility changed to the contained value.
    VisibilityChanged(bool),
}

/// Overlay visibility state for one player.
#[derive(Debug, Clone)]
pub struct ControlsVisibility {
    hide_delay: Duration,
    visible: bool,
    deadline: Option<Instant>,
}

impl ControlsVisibility {
    #[must_use]
    pub fn new(hide_delay: Duration) -> Self {
        Self {
            hide_delay,
            visible: true,
            deadline: None,
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// When the pending hide fires, if one is armed.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub fn hide_delay(&self) -> Duration {
        self.hide_delay
    }

    /// Pointer movement or a command invocation.
    pub fn on_activity(&mut self, phase: Phase, now: Instant) -> ControlsEffect {
        let effect = self.show();
        if phase.forces_controls() {
            self.deadline = None;
        } else {
            self.arm(now);
        }
        effect
    }

    /// The session moved to a new phase.
    pub fn on_phase(&mut self, phase: Phase, now: Instant) -> ControlsEffect {
        if phase.forces_controls() {
            self.deadline = None;
            self.show()
        } else {
            self.arm(now);
            ControlsEffect::None
        }
    }

    /// Show immediately and stop counting down.
    pub fn force_show(&mut self) -> ControlsEffect {
        self.deadline = None;
        self.show()
    }

    /// Fire the hide if its deadline has passed.
    pub fn poll(&mut self, phase: Phase, now: Instant) -> ControlsEffect {
        match self.deadline {
            Some(deadline) if now >= deadline && !phase.forces_controls() => {
                self.deadline = None;
                if self.visible {
                    self.visible = false;
                    ControlsEffect::VisibilityChanged(false)
                } else {
                    ControlsEffect::None
                }
            }
            _ => ControlsEffect::None,
        }
    }

    /// Drop the pending hide without changing visibility.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.hide_delay);
    }

    fn show(&mut self) -> ControlsEffect {
        if self.visible {
            ControlsEffect::None
        } else {
            self.visible = true;
            ControlsEffect::VisibilityChanged(true)
        }
    }
}
