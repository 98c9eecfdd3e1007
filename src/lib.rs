//! Showreel - transport controller core for the studio site's media players
//!
//! The crate drives a single playable media handle through loading,
//! playback, seeking, volume, rate, fullscreen and auto-hiding controls.
//! The host environment supplies the handle and a clock; everything else
//! lives here.

pub mod content;
pub mod host;
pub mod input;
pub mod player;
pub mod preview;
pub mod utils;
