//! Hover previews for the project grid
//!
//! Each grid tile owns a muted, looping clip that plays only while the
//! pointer is over it. Hover-enter always rewinds to the start; hover-leave
//! only pauses, so the handle keeps whatever position playback reached.
//! Selecting a tile hands the same source to a full transport player.

use crate::content::MediaSource;
use crate::host::{Clock, MediaHandle};
use crate::player::{PlaybackController, PlayerConfig};
use crate::utils::config::PreviewConfig;
use crate::utils::error::{Result, ShowreelError};

use log::{debug, info, warn};
use std::sync::Arc;

/// Autoplay-on-hover driver for one grid tile
pub struct HoverPreviewController<H: MediaHandle> {
    handle: H,
    source: MediaSource,
    hovering: bool,
}

impl<H: MediaHandle> HoverPreviewController<H> {
    /// Load `source` into `handle` as a preview clip.
    pub fn new(mut handle: H, source: MediaSource, config: &PreviewConfig) -> Result<Self> {
        handle.set_muted(config.muted)?;
        handle.set_looping(config.loop_clips)?;
        handle.load(&source.media_url)?;
        debug!("Preview ready for '{}'", source.title);

        Ok(Self {
            handle,
            source,
            hovering: false,
        })
    }

    /// Rewind and start the clip. Playback refusals are logged and dropped.
    pub fn hover_enter(&mut self) {
        self.hovering = true;
        if let Err(e) = self.handle.set_current_time(0.0) {
            warn!("Preview '{}' refused rewind: {}", self.source.title, e);
        }
        if let Err(e) = self.handle.play() {
            warn!("Preview '{}' refused play: {}", self.source.title, e);
        }
    }

    /// Pause the clip where it is.
    pub fn hover_leave(&mut self) {
        if !self.hovering {
            return;
        }
        self.hovering = false;
        if let Err(e) = self.handle.pause() {
            warn!("Preview '{}' refused pause: {}", self.source.title, e);
        }
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    pub fn source(&self) -> &MediaSource {
        &self.source
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }
}

/// Preview tiles of the project grid, in catalog order
pub struct PreviewGrid<H: MediaHandle> {
    tiles: Vec<HoverPreviewController<H>>,
    config: PreviewConfig,
}

impl<H: MediaHandle> PreviewGrid<H> {
    pub fn new(config: PreviewConfig) -> Self {
        Self {
            tiles: Vec::new(),
            config,
        }
    }

    /// Add a tile and return its index.
    pub fn add_tile(&mut self, handle: H, source: MediaSource) -> Result<usize> {
        let tile = HoverPreviewController::new(handle, source, &self.config)?;
        self.tiles.push(tile);
        Ok(self.tiles.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tile(&self, index: usize) -> Option<&HoverPreviewController<H>> {
        self.tiles.get(index)
    }

    pub fn hover_enter(&mut self, index: usize) -> Result<()> {
        self.tile_mut(index)?.hover_enter();
        Ok(())
    }

    pub fn hover_leave(&mut self, index: usize) -> Result<()> {
        self.tile_mut(index)?.hover_leave();
        Ok(())
    }

    /// Pause the tile and mount a full player on `handle` with its source.
    pub fn open_modal<M: MediaHandle>(
        &mut self,
        index: usize,
        handle: M,
        config: PlayerConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<PlaybackController<M>> {
        let tile = self.tile_mut(index)?;
        tile.hover_leave();
        let source = tile.source().clone();

        info!("Opening project {} ('{}') in modal player", index, source.title);
        PlaybackController::mount(handle, source, config, clock)
    }

    fn tile_mut(&mut self, index: usize) -> Result<&mut HoverPreviewController<H>> {
        let count = self.tiles.len();
        self.tiles
            .get_mut(index)
            .ok_or_else(|| ShowreelError::NotFound(format!("preview tile {} of {}", index, count)))
    }
}
