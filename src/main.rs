use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use showreel::content::{resolve_source, ContentSource, JsonCatalogSource, Slot};
use showreel::host::{ManualClock, SimulatedFeed, SimulatedMediaHandle};
use showreel::input::{PointerEvent, ScrubTarget, TrackRect};
use showreel::player::{
    EventDispatcher, Phase, PlaybackController, PlayerBuilder, PlayerEvent, PlayerEventHandler,
};
use showreel::utils::{format_timestamp, load_config};

/// Showreel - headless walkthrough of the site's media player
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON content catalog (overrides the configured one)
    #[arg(short, long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Player to mount: hero, featured or project:N
    #[arg(short, long, default_value = "hero")]
    slot: Slot,

    /// Length of the simulated media, in seconds
    #[arg(long, value_name = "SECS", default_value = "30")]
    duration: f64,

    /// Set initial volume (0-100)
    #[arg(short, long, value_name = "VOLUME")]
    volume: Option<u8>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

/// Wall-clock seconds per simulated step
const STEP_SECS: f64 = 0.5;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config().context("loading configuration")?;

    let log_level = if args.debug {
        "debug"
    } else {
        config.general.log_level.as_str()
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("Starting Showreel v{}", env!("CARGO_PKG_VERSION"));

    let placeholder = config.content.placeholder.clone();
    let catalog = args.catalog.clone().or_else(|| config.content.catalog_path.clone());
    let fetched = match catalog {
        Some(path) => JsonCatalogSource::new(path).fetch_source(args.slot).await,
        None => Ok(None),
    };
    let source = resolve_source(fetched, &placeholder);

    let mut player_config = config.player.clone();
    if let Some(volume) = args.volume {
        player_config.default_volume = f64::from(volume.min(100)) / 100.0;
    }

    let clock = ManualClock::new();
    let dispatcher = EventDispatcher::new();
    let _ended = dispatcher.subscribe(|event| {
        if let PlayerEvent::EndOfMedia = event {
            info!("End of media reached");
        }
    });

    let (handle, feed) = SimulatedMediaHandle::new(args.duration);
    let mut player = PlayerBuilder::new()
        .with_config(player_config)
        .with_clock(Arc::new(clock.clone()))
        .with_event_handler(Box::new(LoggingEventHandler))
        .with_dispatcher(&dispatcher)
        .build(handle, source)
        .context("mounting player")?;

    run_session(&mut player, &feed, &clock);

    info!("Session finished at {}", player.time_label());
    Ok(())
}

/// Scripted walkthrough: play, scrub, change rate, run to the end, replay.
fn run_session(
    player: &mut PlaybackController<SimulatedMediaHandle>,
    feed: &SimulatedFeed,
    clock: &ManualClock,
) {
    pump(player, feed);
    if !player.session().is_ready() {
        warn!("Media never became ready; nothing to play");
        return;
    }

    info!("Play: {:?}", player.play());
    pump(player, feed);
    run_for(player, feed, clock, 4.0);

    let track = TrackRect::new(0.0, 0.0, 640.0, 6.0);
    player.handle_pointer(PointerEvent::Moved { x: 320.0, y: 200.0 });
    player.handle_pointer(PointerEvent::Scrub {
        target: ScrubTarget::Seek,
        track,
        x: 320.0,
    });
    pump(player, feed);
    info!("Scrubbed to {}", player.time_label());

    player.cycle_playback_rate();
    player.cycle_playback_rate();
    player.toggle_mute();
    player.toggle_mute();

    let remaining = player.duration().unwrap_or(0.0) - player.current_time();
    run_for(player, feed, clock, remaining + STEP_SECS);

    if player.phase() == Phase::Ended {
        info!("Replay: {:?}", player.replay());
        pump(player, feed);
        run_for(player, feed, clock, 2.0);
        player.pause();
        pump(player, feed);
    }
}

/// Advance media and wall time together in small steps.
fn run_for(
    player: &mut PlaybackController<SimulatedMediaHandle>,
    feed: &SimulatedFeed,
    clock: &ManualClock,
    seconds: f64,
) {
    let mut elapsed = 0.0;
    while elapsed < seconds && player.phase() != Phase::Ended {
        clock.advance_ms((STEP_SECS * 1000.0) as u64);
        feed.advance(STEP_SECS);
        pump(player, feed);
        player.tick();
        elapsed += STEP_SECS;
    }
}

fn pump(player: &mut PlaybackController<SimulatedMediaHandle>, feed: &SimulatedFeed) {
    for signal in feed.drain() {
        player.handle_signal(signal);
    }
}

/// Event handler that logs events
struct LoggingEventHandler;

impl PlayerEventHandler for LoggingEventHandler {
    fn handle_event(&mut self, event: &PlayerEvent) {
        match event {
            PlayerEvent::PositionChanged { current_time } => {
                // Position changes at debug level to avoid spam
                debug!("Position: {}", format_timestamp(*current_time));
            }
            PlayerEvent::PhaseChanged { from, to } => info!("Phase: {} -> {}", from, to),
            PlayerEvent::MetadataLoaded { duration } => {
                info!("Duration: {}", format_timestamp(*duration));
            }
            PlayerEvent::VolumeChanged { volume, muted } => {
                info!("Volume: {:.0}%{}", volume * 100.0, if *muted { " (muted)" } else { "" });
            }
            PlayerEvent::RateChanged { rate } => info!("Playback speed: {}x", rate),
            PlayerEvent::FullscreenChanged { active } => info!("Fullscreen: {}", active),
            PlayerEvent::ControlsVisibilityChanged { visible } => {
                debug!("Controls visible: {}", visible);
            }
            PlayerEvent::Stalled { waited } => {
                warn!("Stalled after {:.1}s of buffering", waited.as_secs_f64());
            }
            PlayerEvent::EndOfMedia => {}
        }
    }
}
