//! Integration tests for the Showreel player
//!
//! These tests drive complete sessions through the public API:
//! - Catalog loading and placeholder fallback
//! - Play, seek, rate and replay on a simulated handle
//! - Controls auto-hide against a manual clock
//! - Hover previews handing off to a modal player

use anyhow::Result;
use showreel::content::{
    resolve_source, ContentSource, JsonCatalogSource, MediaSource, Slot, PLACEHOLDER_SOURCE,
};
use showreel::host::{ManualClock, SimulatedMediaHandle};
use showreel::input::{PointerEvent, ScrubTarget, TrackRect};
use showreel::player::{
    CommandOutcome, EventDispatcher, IgnoreReason, Phase, PlayerBuilder, PlayerConfig, PlayerEvent,
};
use showreel::preview::PreviewGrid;
use showreel::utils::PreviewConfig;
use showreel_integration_tests::{PlayerRig, TestFixture};
use std::sync::Arc;

fn reel() -> MediaSource {
    MediaSource::new("https://cdn.example/reel.mp4", "https://cdn.example/reel.jpg", "Reel")
}

fn ready_rig(duration: f64) -> Result<PlayerRig> {
    let mut rig = PlayerRig::mount(duration, reel(), PlayerConfig::default())?;
    rig.pump();
    assert_eq!(rig.player.phase(), Phase::Ready);
    Ok(rig)
}

#[tokio::test]
async fn test_hero_source_from_catalog() -> Result<()> {
    let fixture = TestFixture::new()?;
    let source = JsonCatalogSource::new(&fixture.catalog);

    let hero = resolve_source(source.fetch_source(Slot::Hero).await, &PLACEHOLDER_SOURCE);
    assert_eq!(hero.title, "Showreel 2024");

    let mut rig = PlayerRig::mount(90.0, hero, PlayerConfig::default())?;
    rig.pump();
    assert_eq!(rig.feed.loaded_url().as_deref(), Some("https://cdn.example/hero.mp4"));
    assert_eq!(rig.player.duration(), Some(90.0));
    Ok(())
}

#[tokio::test]
async fn test_unusable_sources_fall_back_to_placeholder() -> Result<()> {
    let fixture = TestFixture::new()?;
    let source = JsonCatalogSource::new(&fixture.catalog);

    let blank = resolve_source(source.fetch_source(Slot::Project(1)).await, &PLACEHOLDER_SOURCE);
    assert_eq!(blank, *PLACEHOLDER_SOURCE);

    let missing = resolve_source(source.fetch_source(Slot::Project(7)).await, &PLACEHOLDER_SOURCE);
    assert_eq!(missing, *PLACEHOLDER_SOURCE);

    let broken = fixture.write("broken.json", "{ not json")?;
    let failed = JsonCatalogSource::new(broken).fetch_source(Slot::Hero).await;
    assert!(failed.is_err());
    assert_eq!(resolve_source(failed, &PLACEHOLDER_SOURCE), *PLACEHOLDER_SOURCE);

    let absent = JsonCatalogSource::new(fixture.path().join("nope.json"));
    let failed = absent.fetch_source(Slot::Featured).await;
    assert_eq!(resolve_source(failed, &PLACEHOLDER_SOURCE), *PLACEHOLDER_SOURCE);
    Ok(())
}

#[tokio::test]
async fn test_seek_half_way() -> Result<()> {
    let mut rig = ready_rig(125.4)?;
    assert_eq!(rig.player.seek_to(0.5), CommandOutcome::Applied);
    assert!((rig.player.current_time() - 62.7).abs() < 1e-9);

    rig.pump();
    assert!((rig.feed.current_time() - 62.7).abs() < 1e-9);
    assert!((rig.player.current_time() - 62.7).abs() < 1e-9);
    Ok(())
}

#[tokio::test]
async fn test_rate_cycle_sequence() -> Result<()> {
    let mut rig = ready_rig(60.0)?;
    let rates: Vec<f64> = (0..5)
        .map(|_| {
            rig.player.cycle_playback_rate();
            rig.player.playback_rate()
        })
        .collect();
    assert_eq!(rates, vec![1.25, 1.5, 2.0, 0.5, 0.75]);
    assert_eq!(rig.feed.rate(), 0.75);
    Ok(())
}

#[tokio::test]
async fn test_controls_idle_window_and_reset() -> Result<()> {
    let mut rig = ready_rig(120.0)?;
    rig.player.play();
    rig.pump();
    assert_eq!(rig.player.phase(), Phase::Playing);

    // Untouched: hidden once the full window has passed.
    rig.run_ms(2999);
    assert!(rig.player.controls_visible());
    rig.run_ms(1);
    assert!(!rig.player.controls_visible());

    // Any movement brings them back and restarts the window.
    rig.player.handle_pointer(PointerEvent::Moved { x: 10.0, y: 10.0 });
    assert!(rig.player.controls_visible());
    rig.run_ms(2999);
    rig.player.handle_pointer(PointerEvent::Moved { x: 12.0, y: 10.0 });
    rig.run_ms(2);
    assert!(rig.player.controls_visible());
    rig.run_ms(2998);
    assert!(!rig.player.controls_visible());
    Ok(())
}

#[tokio::test]
async fn test_run_to_end_and_replay() -> Result<()> {
    let mut rig = ready_rig(3.0)?;
    rig.player.play();
    rig.pump();

    for _ in 0..8 {
        rig.run_ms(500);
    }
    assert_eq!(rig.player.phase(), Phase::Ended);
    assert_eq!(rig.player.current_time(), 3.0);
    assert!(rig.player.controls_visible());
    assert_eq!(rig.log.count(|e| *e == PlayerEvent::EndOfMedia), 1);

    // Play from Ended restarts too.
    assert_eq!(rig.player.toggle_play(), CommandOutcome::Applied);
    assert_eq!(rig.player.current_time(), 0.0);
    assert_eq!(rig.player.phase(), Phase::Playing);
    assert!(rig.player.controls_visible());

    rig.pump();
    rig.clock.advance_ms(2999);
    rig.player.tick();
    assert!(rig.player.controls_visible());
    rig.clock.advance_ms(1);
    rig.player.tick();
    assert!(!rig.player.controls_visible());
    Ok(())
}

#[tokio::test]
async fn test_scrubbing_volume_track() -> Result<()> {
    let mut rig = ready_rig(30.0)?;
    let track = TrackRect::new(600.0, 40.0, 80.0, 4.0);

    let scrub = |x| PointerEvent::Scrub {
        target: ScrubTarget::Volume,
        track,
        x,
    };
    rig.player.handle_pointer(scrub(620.0));
    assert_eq!(rig.player.volume(), 0.25);
    assert!(!rig.player.is_muted());

    rig.player.handle_pointer(scrub(500.0));
    assert!(rig.player.is_muted());
    assert!(rig.feed.is_muted());

    rig.player.handle_pointer(scrub(700.0));
    assert_eq!(rig.player.volume(), 1.0);
    assert!(!rig.player.is_muted());
    Ok(())
}

#[tokio::test]
async fn test_buffering_stall_is_reported_once() -> Result<()> {
    let config = PlayerConfig {
        stall_timeout_ms: 5_000,
        ..PlayerConfig::default()
    };
    let mut rig = PlayerRig::mount(60.0, reel(), config)?;
    rig.pump();
    rig.player.play();
    rig.pump();

    rig.feed.starve();
    rig.pump();
    assert_eq!(rig.player.phase(), Phase::Buffering);

    for _ in 0..20 {
        rig.clock.advance_ms(1_000);
        rig.player.tick();
    }
    assert!(rig.player.is_stalled());
    assert_eq!(rig.player.phase(), Phase::Buffering);
    assert_eq!(rig.log.count(|e| matches!(e, PlayerEvent::Stalled { .. })), 1);

    rig.feed.resume_buffer();
    rig.pump();
    assert_eq!(rig.player.phase(), Phase::Playing);
    assert!(!rig.player.is_stalled());
    Ok(())
}

#[tokio::test]
async fn test_fullscreen_follows_host() -> Result<()> {
    let mut rig = ready_rig(30.0)?;
    rig.player.toggle_fullscreen();
    assert!(rig.player.is_fullscreen());

    rig.feed.exit_fullscreen_by_gesture();
    rig.player.on_fullscreen_changed(false);
    assert!(!rig.player.is_fullscreen());
    assert_eq!(
        rig.log.count(|e| matches!(e, PlayerEvent::FullscreenChanged { .. })),
        2
    );

    rig.feed.set_container_attached(false);
    assert_eq!(
        rig.player.toggle_fullscreen(),
        CommandOutcome::Ignored(IgnoreReason::ContainerDetached)
    );
    Ok(())
}

#[tokio::test]
async fn test_dispatcher_channel_observes_session() -> Result<()> {
    let dispatcher = EventDispatcher::new();
    let (events, _sub) = dispatcher.subscribe_channel();

    let (handle, feed) = SimulatedMediaHandle::new(8.0);
    let mut player = PlayerBuilder::new()
        .with_clock(Arc::new(ManualClock::new()))
        .with_dispatcher(&dispatcher)
        .build(handle, reel())?;
    for signal in feed.drain() {
        player.handle_signal(signal);
    }

    let received: Vec<PlayerEvent> = events.try_iter().collect();
    assert!(received.contains(&PlayerEvent::MetadataLoaded { duration: 8.0 }));
    assert!(received.contains(&PlayerEvent::PhaseChanged {
        from: Phase::Loading,
        to: Phase::Ready
    }));

    drop(player);
    assert!(!feed.is_bound());
    Ok(())
}

#[tokio::test]
async fn test_preview_tile_to_modal() -> Result<()> {
    let fixture = TestFixture::new()?;
    let catalog = JsonCatalogSource::new(&fixture.catalog).fetch_catalog().await?;

    let mut grid = PreviewGrid::new(PreviewConfig::default());
    let mut feeds = Vec::new();
    for project in &catalog.projects {
        let (handle, feed) = SimulatedMediaHandle::new(10.0);
        grid.add_tile(handle, project.clone())?;
        feeds.push(feed);
    }
    assert_eq!(grid.len(), 2);

    // Enter, play to 4s, leave: position is kept.
    grid.hover_enter(0)?;
    feeds[0].advance(4.0);
    grid.hover_leave(0)?;
    assert_eq!(feeds[0].current_time(), 4.0);
    assert!(!feeds[0].is_playing());

    // Re-enter: back to the start.
    grid.hover_enter(0)?;
    assert_eq!(feeds[0].current_time(), 0.0);
    assert!(feeds[0].is_playing());
    assert!(feeds[0].is_muted());

    let (handle, modal_feed) = SimulatedMediaHandle::new(10.0);
    let mut modal = grid.open_modal(0, handle, PlayerConfig::default(), Arc::new(ManualClock::new()))?;
    assert!(!feeds[0].is_playing());
    for signal in modal_feed.drain() {
        modal.handle_signal(signal);
    }
    assert_eq!(modal.phase(), Phase::Ready);
    assert_eq!(modal.source().map(|s| s.title.as_str()), Some("Brand spot"));
    Ok(())
}
