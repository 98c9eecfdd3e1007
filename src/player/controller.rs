//! Playback controller implementation for Showreel
//!
//! This module provides the `PlaybackController` that owns one media handle
//! and its transport session. Commands go out to the handle as requests;
//! playback signals come back through `handle_signal` and are the only
//! thing that moves the phase, apart from `replay`.

use crate::content::MediaSource;
use crate::host::{Clock, MediaHandle};
use crate::input::{scrub_fraction, PointerEvent, ScrubTarget};
use crate::player::{
    CommandOutcome, ControlsEffect, ControlsVisibility, IgnoreReason, Phase, PlaybackSession,
    PlaybackSignal, PlayerConfig, PlayerEvent, PlayerEventHandler, StallWatch,
};
use crate::utils::error::Result;
use crate::utils::format_timestamp;

use log::{debug, info, trace, warn};
use std::sync::Arc;
use std::time::Instant;

/// Transport controller for one mounted player
pub struct PlaybackController<H: MediaHandle> {
    // Media handle, exclusively owned
    handle: H,
    bound: bool,

    // State management
    session: PlaybackSession,
    controls: ControlsVisibility,
    stall: StallWatch,
    config: PlayerConfig,
    clock: Arc<dyn Clock>,

    // Event handling
    event_handlers: Vec<Box<dyn PlayerEventHandler>>,
}

impl<H: MediaHandle> PlaybackController<H> {
    /// Create an idle controller with no source.
    pub fn new(handle: H, config: PlayerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            handle,
            bound: false,
            session: PlaybackSession::new(&config),
            controls: ControlsVisibility::new(config.controls_hide_delay()),
            stall: StallWatch::new(config.stall_timeout()),
            config,
            clock,
            event_handlers: Vec::new(),
        }
    }

    /// Create a controller and load `source` into it.
    ///
    /// If binding or loading fails the controller is dropped, which detaches
    /// anything already attached to the handle.
    pub fn mount(
        handle: H,
        source: MediaSource,
        config: PlayerConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let mut controller = Self::new(handle, config, clock);
        controller.set_source(source)?;
        Ok(controller)
    }

    /// Tear the current session down and start a new one for `source`.
    pub fn set_source(&mut self, source: MediaSource) -> Result<()> {
        self.teardown();
        self.session = PlaybackSession::new(&self.config);
        self.controls = ControlsVisibility::new(self.config.controls_hide_delay());
        self.stall = StallWatch::new(self.config.stall_timeout());

        info!("Mounting source '{}' ({})", source.title, source.media_url);

        self.handle.bind_signals()?;
        self.bound = true;

        if let Err(e) = self.push_source(&source) {
            warn!("Mounting '{}' failed: {}", source.title, e);
            self.teardown();
            return Err(e);
        }

        self.session.source = Some(source);
        if let Some(from) = self.session.enter(Phase::Loading) {
            self.on_phase_changed(from, Phase::Loading);
        }
        Ok(())
    }

    /// Hand the session's audio settings and the media URL to the handle.
    fn push_source(&mut self, source: &MediaSource) -> Result<()> {
        let audio = self.session.audio;
        self.handle.set_volume(audio.volume().value())?;
        self.handle.set_muted(audio.is_muted())?;
        self.handle.set_playback_rate(self.session.rate.value())?;
        self.handle.load(&source.media_url)
    }

    /// Request playback start.
    pub fn play(&mut self) -> CommandOutcome {
        let phase = self.session.phase;
        match phase {
            Phase::Idle => return self.ignored("play", IgnoreReason::InvalidPhase(phase)),
            Phase::Playing => return self.ignored("play", IgnoreReason::NoChange),
            Phase::Ended => return self.replay(),
            _ => {}
        }

        self.note_activity();
        if let Err(e) = self.handle.play() {
            warn!("Media handle refused play: {}", e);
            return CommandOutcome::Ignored(IgnoreReason::HandleRejected);
        }
        self.session.play_requested = true;
        debug!("Play requested from {}", phase);
        CommandOutcome::Applied
    }

    /// Request playback stop. Controls are shown at once.
    pub fn pause(&mut self) -> CommandOutcome {
        let effect = self.controls.force_show();
        self.emit_controls(effect);

        let phase = self.session.phase;
        match phase {
            Phase::Idle | Phase::Ended => {
                return self.ignored("pause", IgnoreReason::InvalidPhase(phase));
            }
            Phase::Ready | Phase::Paused if !self.session.play_requested => {
                return self.ignored("pause", IgnoreReason::NoChange);
            }
            _ => {}
        }

        if let Err(e) = self.handle.pause() {
            warn!("Media handle refused pause: {}", e);
            // Still playing: restart the countdown instead of pinning the controls.
            self.note_activity();
            return CommandOutcome::Ignored(IgnoreReason::HandleRejected);
        }
        self.session.play_requested = false;
        debug!("Pause requested from {}", phase);
        CommandOutcome::Applied
    }

    /// Play or pause depending on the phase; from `Ended` this replays.
    pub fn toggle_play(&mut self) -> CommandOutcome {
        match self.session.phase {
            Phase::Playing => self.pause(),
            Phase::Buffering if self.session.play_requested => self.pause(),
            Phase::Ended => self.replay(),
            _ => self.play(),
        }
    }

    /// Restart from the beginning. Only valid once playback has ended.
    pub fn replay(&mut self) -> CommandOutcome {
        let phase = self.session.phase;
        if phase != Phase::Ended {
            return self.ignored("replay", IgnoreReason::InvalidPhase(phase));
        }

        if let Err(e) = self.handle.set_current_time(0.0) {
            warn!("Media handle refused rewind: {}", e);
            return CommandOutcome::Ignored(IgnoreReason::HandleRejected);
        }
        self.session.current_time = 0.0;
        self.emit(PlayerEvent::PositionChanged { current_time: 0.0 });

        if let Err(e) = self.handle.play() {
            warn!("Media handle refused play on replay: {}", e);
            return CommandOutcome::Ignored(IgnoreReason::HandleRejected);
        }
        self.session.play_requested = true;

        if let Some(from) = self.session.enter(Phase::Playing) {
            self.on_phase_changed(from, Phase::Playing);
        }
        info!("Replaying from the start");
        CommandOutcome::Applied
    }

    /// Seek to `fraction` of the duration.
    pub fn seek_to(&mut self, fraction: f64) -> CommandOutcome {
        self.note_activity();
        if !fraction.is_finite() {
            return self.ignored("seek", IgnoreReason::InvalidValue);
        }
        let Some(duration) = self.session.duration else {
            return self.ignored("seek", IgnoreReason::NotReady);
        };
        self.seek_to_time(fraction.clamp(0.0, 1.0) * duration)
    }

    /// Seek relative to the current position, in seconds.
    pub fn seek_by(&mut self, delta_secs: f64) -> CommandOutcome {
        self.note_activity();
        if !delta_secs.is_finite() {
            return self.ignored("seek", IgnoreReason::InvalidValue);
        }
        if !self.session.is_ready() {
            return self.ignored("seek", IgnoreReason::NotReady);
        }
        self.seek_to_time(self.session.current_time + delta_secs)
    }

    fn seek_to_time(&mut self, seconds: f64) -> CommandOutcome {
        let target = self.session.clamp_time(seconds);
        if let Err(e) = self.handle.set_current_time(target) {
            warn!("Media handle refused seek to {:.3}s: {}", target, e);
            return CommandOutcome::Ignored(IgnoreReason::HandleRejected);
        }
        self.session.current_time = target;
        debug!("Seek to {:.3}s", target);
        self.emit(PlayerEvent::PositionChanged { current_time: target });
        CommandOutcome::Applied
    }

    /// Set the volume from a track fraction. Zero mutes, audible unmutes.
    pub fn set_volume(&mut self, fraction: f64) -> CommandOutcome {
        self.note_activity();
        let mut audio = self.session.audio;
        audio.set_volume(fraction);

        if let Err(e) = self
            .handle
            .set_volume(audio.volume().value())
            .and_then(|_| self.handle.set_muted(audio.is_muted()))
        {
            warn!("Media handle refused volume change: {}", e);
            return CommandOutcome::Ignored(IgnoreReason::HandleRejected);
        }
        self.session.audio = audio;
        self.emit_volume();
        CommandOutcome::Applied
    }

    /// Flip mute without touching the stored volume.
    pub fn toggle_mute(&mut self) -> CommandOutcome {
        self.note_activity();
        let mut audio = self.session.audio;
        audio.toggle_mute();

        if let Err(e) = self.handle.set_muted(audio.is_muted()) {
            warn!("Media handle refused mute change: {}", e);
            return CommandOutcome::Ignored(IgnoreReason::HandleRejected);
        }
        self.session.audio = audio;
        self.emit_volume();
        CommandOutcome::Applied
    }

    /// Step to the next playback rate, wrapping after the fastest.
    pub fn cycle_playback_rate(&mut self) -> CommandOutcome {
        self.note_activity();
        let rate = self.session.rate.cycle();

        if let Err(e) = self.handle.set_playback_rate(rate.value()) {
            warn!("Media handle refused rate {}: {}", rate.label(), e);
            return CommandOutcome::Ignored(IgnoreReason::HandleRejected);
        }
        self.session.rate = rate;
        info!("Playback rate set to {}", rate.label());
        self.emit(PlayerEvent::RateChanged { rate: rate.value() });
        CommandOutcome::Applied
    }

    /// Enter or leave fullscreen, flipping the flag optimistically.
    ///
    /// The host should report real changes through `on_fullscreen_changed`.
    pub fn toggle_fullscreen(&mut self) -> CommandOutcome {
        self.note_activity();
        if !self.handle.container_attached() {
            return self.ignored("fullscreen", IgnoreReason::ContainerDetached);
        }

        let target = !self.session.fullscreen;
        let result = if target {
            self.handle.request_fullscreen()
        } else {
            self.handle.exit_fullscreen()
        };
        if let Err(e) = result {
            warn!("Fullscreen request refused: {}", e);
            return CommandOutcome::Ignored(IgnoreReason::HandleRejected);
        }

        self.session.fullscreen = target;
        self.emit(PlayerEvent::FullscreenChanged { active: target });
        CommandOutcome::Applied
    }

    /// Authoritative fullscreen notification from the host.
    pub fn on_fullscreen_changed(&mut self, active: bool) {
        if self.session.fullscreen != active {
            info!("Fullscreen reconciled to {}", active);
            self.session.fullscreen = active;
            self.emit(PlayerEvent::FullscreenChanged { active });
        }
    }

    /// Pointer movement or a scrub gesture over the player.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> CommandOutcome {
        match event {
            PointerEvent::Moved { .. } => {
                self.note_activity();
                CommandOutcome::Applied
            }
            PointerEvent::Scrub { target, track, x } => {
                let fraction = scrub_fraction(&track, x);
                match target {
                    ScrubTarget::Seek => self.seek_to(fraction),
                    ScrubTarget::Volume => self.set_volume(fraction),
                }
            }
        }
    }

    /// Restart the controls countdown, showing the controls if hidden.
    pub fn note_activity(&mut self) {
        let now = self.clock.now();
        let effect = self.controls.on_activity(self.session.phase, now);
        self.emit_controls(effect);
    }

    /// Feed one playback signal from the handle.
    pub fn handle_signal(&mut self, signal: PlaybackSignal) {
        if !self.bound {
            trace!("Dropping {:?} on unbound controller", signal);
            return;
        }

        let had_duration = self.session.is_ready();
        let change = self.session.apply(&signal);

        match signal {
            PlaybackSignal::MetadataAvailable { .. } if !had_duration => {
                if let Some(duration) = self.session.duration {
                    info!("Metadata loaded: {}", format_timestamp(duration));
                    self.emit(PlayerEvent::MetadataLoaded { duration });
                }
            }
            PlaybackSignal::TimeAdvanced { .. } => {
                trace!("Time {:.3}s", self.session.current_time);
                self.emit(PlayerEvent::PositionChanged {
                    current_time: self.session.current_time,
                });
            }
            _ => {}
        }

        if let Some(from) = change {
            let to = self.session.phase;
            self.on_phase_changed(from, to);

            if to == Phase::Ready && self.config.auto_play {
                debug!("Auto-play on ready");
                self.play();
            }
        }
    }

    /// Host timer callback: fire whichever deadlines are due.
    pub fn tick(&mut self) {
        let now = self.clock.now();

        let effect = self.controls.poll(self.session.phase, now);
        self.emit_controls(effect);

        if let Some(waited) = self.stall.poll(now) {
            warn!(
                "Buffering stalled for {:.1}s at {}",
                waited.as_secs_f64(),
                format_timestamp(self.session.current_time)
            );
            self.emit(PlayerEvent::Stalled { waited });
        }
    }

    /// Earliest instant at which `tick` has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.controls.deadline(), self.stall.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Add event handler
    pub fn add_event_handler(&mut self, handler: Box<dyn PlayerEventHandler>) {
        self.event_handlers.push(handler);
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn current_time(&self) -> f64 {
        self.session.current_time
    }

    pub fn duration(&self) -> Option<f64> {
        self.session.duration
    }

    pub fn progress(&self) -> Option<f64> {
        self.session.progress()
    }

    pub fn volume(&self) -> f64 {
        self.session.audio.volume().value()
    }

    pub fn is_muted(&self) -> bool {
        self.session.audio.is_muted()
    }

    pub fn effective_volume(&self) -> f64 {
        self.session.audio.effective()
    }

    pub fn playback_rate(&self) -> f64 {
        self.session.rate.value()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.session.fullscreen
    }

    pub fn controls_visible(&self) -> bool {
        self.controls.is_visible()
    }

    pub fn is_stalled(&self) -> bool {
        self.stall.is_stalled()
    }

    pub fn source(&self) -> Option<&MediaSource> {
        self.session.source.as_ref()
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Read-only view of the handle; commands go through the controller.
    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// Transport time label, e.g. "01:02 / 02:05".
    pub fn time_label(&self) -> String {
        format!(
            "{} / {}",
            format_timestamp(self.session.current_time),
            format_timestamp(self.session.duration.unwrap_or(0.0))
        )
    }

    fn on_phase_changed(&mut self, from: Phase, to: Phase) {
        let now = self.clock.now();
        self.emit(PlayerEvent::PhaseChanged { from, to });

        let effect = self.controls.on_phase(to, now);
        self.emit_controls(effect);
        self.stall.on_phase(to, now);

        if to == Phase::Ended {
            self.emit(PlayerEvent::EndOfMedia);
        }
    }

    fn ignored(&self, command: &str, reason: IgnoreReason) -> CommandOutcome {
        debug!("Ignoring {} in {}: {:?}", command, self.session.phase, reason);
        CommandOutcome::Ignored(reason)
    }

    fn emit_volume(&mut self) {
        let audio = self.session.audio;
        debug!("Volume {:.2} (muted: {})", audio.volume().value(), audio.is_muted());
        self.emit(PlayerEvent::VolumeChanged {
            volume: audio.volume().value(),
            muted: audio.is_muted(),
        });
    }

    fn emit_controls(&mut self, effect: ControlsEffect) {
        if let ControlsEffect::VisibilityChanged(visible) = effect {
            debug!("Controls {}", if visible { "shown" } else { "hidden" });
            self.emit(PlayerEvent::ControlsVisibilityChanged { visible });
        }
    }

    /// Send event to handlers
    fn emit(&mut self, event: PlayerEvent) {
        for handler in self.event_handlers.iter_mut() {
            handler.handle_event(&event);
        }
    }

    /// Cancel timers, leave fullscreen and detach signal listeners.
    fn teardown(&mut self) {
        self.controls.cancel();
        self.stall.cancel();

        if self.session.fullscreen {
            if let Err(e) = self.handle.exit_fullscreen() {
                warn!("Could not leave fullscreen on teardown: {}", e);
            }
            self.session.fullscreen = false;
        }

        if self.bound {
            self.handle.unbind_signals();
            self.bound = false;
            debug!("Signal listeners detached");
        }
    }
}

impl<H: MediaHandle> Drop for PlaybackController<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
