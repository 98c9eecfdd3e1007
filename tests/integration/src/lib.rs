//! Integration test utilities for Showreel
//!
//! This module provides common utilities for integration testing:
//! - A temporary content catalog on disk
//! - A player rig wiring a simulated handle, a manual clock and an event log

use anyhow::Result;
use parking_lot::Mutex;
use showreel::content::MediaSource;
use showreel::host::{ManualClock, SimulatedFeed, SimulatedMediaHandle};
use showreel::player::{PlaybackController, PlayerBuilder, PlayerConfig, PlayerEvent, PlayerEventHandler};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Test fixture for integration tests
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub catalog: PathBuf,
}

impl TestFixture {
    /// Create a fixture with a catalog holding a hero, a featured reel and
    /// two projects
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let catalog = temp_dir.path().join("catalog.json");
        std::fs::write(&catalog, Self::catalog_json().to_string())?;
        Ok(Self { temp_dir, catalog })
    }

    /// Write `contents` as a file in the fixture directory
    pub fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    /// Get the path to the temporary directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn catalog_json() -> serde_json::Value {
        serde_json::json!({
            "hero": {
                "mediaUrl": "https://cdn.example/hero.mp4",
                "posterUrl": "https://cdn.example/hero.jpg",
                "title": "Showreel 2024"
            },
            "featured": {
                "mediaUrl": "https://cdn.example/featured.mp4",
                "title": "Coastal wedding"
            },
            "projects": [
                { "mediaUrl": "https://cdn.example/p0.mp4", "title": "Brand spot" },
                { "mediaUrl": "", "title": "Unfinished cut" }
            ]
        })
    }
}

/// Shared log of every event a player emitted
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<PlayerEvent>>>);

impl EventLog {
    pub fn events(&self) -> Vec<PlayerEvent> {
        self.0.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&PlayerEvent) -> bool) -> usize {
        self.0.lock().iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

impl PlayerEventHandler for EventLog {
    fn handle_event(&mut self, event: &PlayerEvent) {
        self.0.lock().push(event.clone());
    }
}

/// A mounted player on a simulated handle, driven by a manual clock
pub struct PlayerRig {
    pub player: PlaybackController<SimulatedMediaHandle>,
    pub feed: SimulatedFeed,
    pub clock: ManualClock,
    pub log: EventLog,
}

impl PlayerRig {
    pub fn mount(duration: f64, source: MediaSource, config: PlayerConfig) -> Result<Self> {
        let (handle, feed) = SimulatedMediaHandle::new(duration);
        let clock = ManualClock::new();
        let log = EventLog::default();
        let player = PlayerBuilder::new()
            .with_config(config)
            .with_clock(Arc::new(clock.clone()))
            .with_event_handler(Box::new(log.clone()))
            .build(handle, source)?;
        Ok(Self {
            player,
            feed,
            clock,
            log,
        })
    }

    /// Deliver every signal the handle has raised
    pub fn pump(&mut self) {
        for signal in self.feed.drain() {
            self.player.handle_signal(signal);
        }
    }

    /// Let `ms` of wall time pass: media advances, timers fire
    pub fn run_ms(&mut self, ms: u64) {
        self.clock.advance_ms(ms);
        self.feed.advance(ms as f64 / 1000.0);
        self.pump();
        self.player.tick();
    }
}
