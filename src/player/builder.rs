//! Player construction and event fan-out for Showreel
//!
//! `PlayerBuilder` gathers configuration, clock and event handlers before a
//! controller is mounted. `EventDispatcher` lets any number of closures or
//! channels observe one player without owning it.

use crate::content::MediaSource;
use crate::host::{Clock, MediaHandle, SystemClock};
use crate::player::{PlaybackController, PlayerConfig, PlayerEvent, PlayerEventHandler};
use crate::utils::error::Result;

use crossbeam_channel::{Receiver, Sender};
use log::{debug, info};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Callback = Box<dyn Fn(&PlayerEvent) + Send + Sync>;
type Subscribers = Arc<RwLock<Vec<(usize, Callback)>>>;

/// Player builder for customized configuration
pub struct PlayerBuilder {
    config: PlayerConfig,
    clock: Arc<dyn Clock>,
    event_handlers: Vec<Box<dyn PlayerEventHandler>>,
}

impl PlayerBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            config: PlayerConfig::default(),
            clock: Arc::new(SystemClock),
            event_handlers: Vec::new(),
        }
    }

    /// Set player configuration
    pub fn with_config(mut self, config: PlayerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the time source for hide and stall deadlines
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Add an event handler
    pub fn with_event_handler(mut self, handler: Box<dyn PlayerEventHandler>) -> Self {
        self.event_handlers.push(handler);
        self
    }

    /// Route events through a shared dispatcher
    pub fn with_dispatcher(self, dispatcher: &EventDispatcher) -> Self {
        self.with_event_handler(Box::new(dispatcher.clone()))
    }

    /// Mount a controller on `handle` and load `source`
    pub fn build<H: MediaHandle>(
        self,
        handle: H,
        source: MediaSource,
    ) -> Result<PlaybackController<H>> {
        info!("Building player for '{}'", source.title);

        let mut controller = PlaybackController::new(handle, self.config, self.clock);
        for handler in self.event_handlers {
            controller.add_event_handler(handler);
        }
        controller.set_source(source)?;
        Ok(controller)
    }
}

impl Default for PlayerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Fan-out of player events to subscribed callbacks
#[derive(Clone, Default)]
pub struct EventDispatcher {
    subscribers: Subscribers,
    next_id: Arc<AtomicUsize>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a callback; it stays registered until the returned
    /// subscription is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, callback: F) -> EventSubscription
    where
        F: Fn(&PlayerEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.write().push((id, Box::new(callback)));
        debug!("Event subscriber {} added", id);

        EventSubscription {
            id,
            subscribers: Arc::clone(&self.subscribers),
        }
    }

    /// Subscribe through an unbounded channel
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe_channel(&self) -> (Receiver<PlayerEvent>, EventSubscription) {
        let (tx, rx): (Sender<PlayerEvent>, Receiver<PlayerEvent>) =
            crossbeam_channel::unbounded();
        let subscription = self.subscribe(move |event| {
            // Receiver gone: the subscription is about to be dropped too.
            let _ = tx.send(event.clone());
        });
        (rx, subscription)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    fn dispatch(&self, event: &PlayerEvent) {
        let subs = self.subscribers.read();
        for (_, callback) in subs.iter() {
            callback(event);
        }
    }
}

impl PlayerEventHandler for EventDispatcher {
    fn handle_event(&mut self, event: &PlayerEvent) {
        self.dispatch(event);
    }
}

/// Event subscription handle
pub struct EventSubscription {
    id: usize,
    subscribers: Subscribers,
}

impl EventSubscription {
    pub fn id(&self) -> usize {
        self.id
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.subscribers.write().retain(|(id, _)| *id != self.id);
        debug!("Event subscriber {} removed", self.id);
    }
}
