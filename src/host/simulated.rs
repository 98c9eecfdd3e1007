//! In-memory media handle
//!
//! `SimulatedMediaHandle` behaves like a browser media element closely
//! enough to drive a controller headlessly: commands queue the signals a
//! real element would raise, and the paired `SimulatedFeed` plays the part
//! of the host, advancing media time and handing queued signals over.

use crate::host::MediaHandle;
use crate::player::PlaybackSignal;
use crate::utils::error::{Result, ShowreelError};
use log::trace;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Command received by a simulated handle, recorded in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum HandleCommand {
    Bind,
    Unbind,
    Load(String),
    Play,
    Pause,
    SetCurrentTime(f64),
    SetVolume(f64),
    SetMuted(bool),
    SetPlaybackRate(f64),
    SetLooping(bool),
    RequestFullscreen,
    ExitFullscreen,
}

#[derive(Debug)]
struct SimulatedMedia {
    duration: f64,
    current_time: f64,
    playing: bool,
    looping: bool,
    volume: f64,
    muted: bool,
    rate: f64,
    bound: bool,
    loaded_url: Option<String>,
    fullscreen: bool,
    container_attached: bool,
    fail_binding: bool,
    fail_load: bool,
    reject_play: bool,
    reject_pause: bool,
    commands: Vec<HandleCommand>,
    pending: VecDeque<PlaybackSignal>,
}

impl SimulatedMedia {
    fn emit(&mut self, signal: PlaybackSignal) {
        // Detached listeners never hear anything.
        if self.bound {
            self.pending.push_back(signal);
        }
    }
}

/// Controller side of the simulated media element
#[derive(Debug)]
pub struct SimulatedMediaHandle {
    media: Arc<Mutex<SimulatedMedia>>,
}

/// Host side of the simulated media element
#[derive(Debug, Clone)]
pub struct SimulatedFeed {
    media: Arc<Mutex<SimulatedMedia>>,
}

impl SimulatedMediaHandle {
    /// Create a handle for a file of the given duration, plus its feed
    pub fn new(duration: f64) -> (Self, SimulatedFeed) {
        let media = Arc::new(Mutex::new(SimulatedMedia {
            duration,
            current_time: 0.0,
            playing: false,
            looping: false,
            volume: 1.0,
            muted: false,
            rate: 1.0,
            bound: false,
            loaded_url: None,
            fullscreen: false,
            container_attached: true,
            fail_binding: false,
            fail_load: false,
            reject_play: false,
            reject_pause: false,
            commands: Vec::new(),
            pending: VecDeque::new(),
        }));

        (
            Self {
                media: Arc::clone(&media),
            },
            SimulatedFeed { media },
        )
    }
}

impl MediaHandle for SimulatedMediaHandle {
    fn bind_signals(&mut self) -> Result<()> {
        let mut media = self.media.lock();
        media.commands.push(HandleCommand::Bind);
        if media.fail_binding {
            return Err(ShowreelError::handle_error("listener binding refused"));
        }
        media.bound = true;
        Ok(())
    }

    fn unbind_signals(&mut self) {
        let mut media = self.media.lock();
        media.commands.push(HandleCommand::Unbind);
        media.bound = false;
        media.pending.clear();
    }

    fn load(&mut self, url: &str) -> Result<()> {
        let mut media = self.media.lock();
        media.commands.push(HandleCommand::Load(url.to_string()));
        if media.fail_load {
            return Err(ShowreelError::handle_error(format!("cannot load {}", url)));
        }
        media.loaded_url = Some(url.to_string());
        media.current_time = 0.0;
        media.playing = false;
        let duration = media.duration;
        media.emit(PlaybackSignal::MetadataAvailable { duration });
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        let mut media = self.media.lock();
        media.commands.push(HandleCommand::Play);
        if media.reject_play {
            return Err(ShowreelError::handle_error("play() rejected by autoplay policy"));
        }
        if !media.playing {
            media.playing = true;
            if media.current_time >= media.duration {
                media.current_time = 0.0;
            }
            media.emit(PlaybackSignal::PlaybackStarted);
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        let mut media = self.media.lock();
        media.commands.push(HandleCommand::Pause);
        if media.reject_pause {
            return Err(ShowreelError::handle_error("pause() rejected"));
        }
        if media.playing {
            media.playing = false;
            media.emit(PlaybackSignal::PlaybackPaused);
        }
        Ok(())
    }

    fn set_current_time(&mut self, seconds: f64) -> Result<()> {
        let mut media = self.media.lock();
        media.commands.push(HandleCommand::SetCurrentTime(seconds));
        media.current_time = seconds.clamp(0.0, media.duration);
        let current_time = media.current_time;
        media.emit(PlaybackSignal::TimeAdvanced { current_time });
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) -> Result<()> {
        let mut media = self.media.lock();
        media.commands.push(HandleCommand::SetVolume(volume));
        media.volume = volume;
        Ok(())
    }

    fn set_muted(&mut self, muted: bool) -> Result<()> {
        let mut media = self.media.lock();
        media.commands.push(HandleCommand::SetMuted(muted));
        media.muted = muted;
        Ok(())
    }

    fn set_playback_rate(&mut self, rate: f64) -> Result<()> {
        let mut media = self.media.lock();
        media.commands.push(HandleCommand::SetPlaybackRate(rate));
        media.rate = rate;
        Ok(())
    }

    fn set_looping(&mut self, looping: bool) -> Result<()> {
        let mut media = self.media.lock();
        media.commands.push(HandleCommand::SetLooping(looping));
        media.looping = looping;
        Ok(())
    }

    fn container_attached(&self) -> bool {
        self.media.lock().container_attached
    }

    fn request_fullscreen(&mut self) -> Result<()> {
        let mut media = self.media.lock();
        media.commands.push(HandleCommand::RequestFullscreen);
        media.fullscreen = true;
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<()> {
        let mut media = self.media.lock();
        media.commands.push(HandleCommand::ExitFullscreen);
        media.fullscreen = false;
        Ok(())
    }
}

impl SimulatedFeed {
    /// Advance media time by `seconds` of wall time, honouring the rate
    pub fn advance(&self, seconds: f64) {
        let mut media = self.media.lock();
        if !media.playing {
            return;
        }

        let mut next = media.current_time + seconds * media.rate;
        if next >= media.duration {
            if media.looping && media.duration > 0.0 {
                next %= media.duration;
            } else {
                let duration = media.duration;
                media.current_time = duration;
                media.playing = false;
                media.emit(PlaybackSignal::TimeAdvanced { current_time: duration });
                media.emit(PlaybackSignal::PlaybackPaused);
                media.emit(PlaybackSignal::PlaybackEnded);
                return;
            }
        }

        media.current_time = next;
        trace!("simulated time {:.3}", next);
        media.emit(PlaybackSignal::TimeAdvanced { current_time: next });
    }

    /// The network stopped delivering data
    pub fn starve(&self) {
        self.media.lock().emit(PlaybackSignal::BufferStarved);
    }

    /// Data is flowing again
    pub fn resume_buffer(&self) {
        self.media.lock().emit(PlaybackSignal::BufferResumed);
    }

    /// Take every signal raised since the last call
    pub fn drain(&self) -> Vec<PlaybackSignal> {
        self.media.lock().pending.drain(..).collect()
    }

    /// Recorded commands, oldest first
    pub fn commands(&self) -> Vec<HandleCommand> {
        self.media.lock().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.media.lock().commands.clear();
    }

    pub fn is_bound(&self) -> bool {
        self.media.lock().bound
    }

    pub fn is_playing(&self) -> bool {
        self.media.lock().playing
    }

    pub fn is_looping(&self) -> bool {
        self.media.lock().looping
    }

    pub fn current_time(&self) -> f64 {
        self.media.lock().current_time
    }

    pub fn volume(&self) -> f64 {
        self.media.lock().volume
    }

    pub fn is_muted(&self) -> bool {
        self.media.lock().muted
    }

    pub fn rate(&self) -> f64 {
        self.media.lock().rate
    }

    pub fn loaded_url(&self) -> Option<String> {
        self.media.lock().loaded_url.clone()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.media.lock().fullscreen
    }

    /// The user left fullscreen with a system gesture the player never saw
    pub fn exit_fullscreen_by_gesture(&self) {
        self.media.lock().fullscreen = false;
    }

    pub fn set_container_attached(&self, attached: bool) {
        self.media.lock().container_attached = attached;
    }

    /// Make the next `bind_signals` fail
    pub fn fail_binding(&self, fail: bool) {
        self.media.lock().fail_binding = fail;
    }

    /// Make the next `load` fail
    pub fn fail_load(&self, fail: bool) {
        self.media.lock().fail_load = fail;
    }

    /// Make `pause` fail
    pub fn reject_pause(&self, reject: bool) {
        self.media.lock().reject_pause = reject;
    }

    /// Make `play` fail, as an autoplay policy would
    pub fn reject_play(&self, reject: bool) {
        self.media.lock().reject_play = reject;
    }
}
