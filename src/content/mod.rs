//! Content source boundary
//!
//! Players never talk to the content API themselves. A source is fetched
//! once, before the player is mounted, and handed over as an opaque
//! [`MediaSource`]. When the fetch fails or yields nothing, the player is
//! seeded with a placeholder instead of surfacing an error.

use crate::utils::error::{IntoShowreelError, Result, ShowreelError};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Placeholder used when no source could be obtained.
pub static PLACEHOLDER_SOURCE: Lazy<MediaSource> = Lazy::new(|| MediaSource {
    media_url: "/media/placeholder-reel.mp4".to_string(),
    poster_url: "/media/placeholder-poster.jpg".to_string(),
    title: "Showreel".to_string(),
});

/// A single progressive media file with its poster and display title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSource {
    /// URL of the progressive media file
    pub media_url: String,

    /// Poster frame shown before playback
    #[serde(default)]
    pub poster_url: String,

    /// Display title
    #[serde(default)]
    pub title: String,
}

impl MediaSource {
    pub fn new(media_url: impl Into<String>, poster_url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            media_url: media_url.into(),
            poster_url: poster_url.into(),
            title: title.into(),
        }
    }

    /// A source with an empty media URL cannot be loaded.
    pub fn is_playable(&self) -> bool {
        !self.media_url.trim().is_empty()
    }
}

impl Default for MediaSource {
    fn default() -> Self {
        PLACEHOLDER_SOURCE.clone()
    }
}

/// Which player on the page a source is destined for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Hero showcase player
    Hero,

    /// Featured portfolio player
    Featured,

    /// Tile in the project grid
    Project(usize),
}

impl std::str::FromStr for Slot {
    type Err = ShowreelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hero" => Ok(Slot::Hero),
            "featured" => Ok(Slot::Featured),
            other => {
                let index = other
                    .strip_prefix("project:")
                    .ok_or_else(|| ShowreelError::InvalidInput(format!("unknown slot '{}'", other)))?;
                index
                    .parse()
                    .map(Slot::Project)
                    .map_err(|_| ShowreelError::InvalidInput(format!("bad project index '{}'", index)))
            }
        }
    }
}

/// Media catalog as returned by the content API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCatalog {
    #[serde(default)]
    pub hero: Option<MediaSource>,

    #[serde(default)]
    pub featured: Option<MediaSource>,

    #[serde(default)]
    pub projects: Vec<MediaSource>,
}

impl ContentCatalog {
    /// Look up the source for a slot.
    pub fn get(&self, slot: Slot) -> Option<&MediaSource> {
        match slot {
            Slot::Hero => self.hero.as_ref(),
            Slot::Featured => self.featured.as_ref(),
            Slot::Project(index) => self.projects.get(index),
        }
    }
}

/// Asynchronous supplier of media sources
#[allow(async_fn_in_trait)]
pub trait ContentSource {
    /// Fetch the whole catalog.
    async fn fetch_catalog(&self) -> Result<ContentCatalog>;

    /// Fetch the source for one slot. `Ok(None)` means the API had nothing for it.
    async fn fetch_source(&self, slot: Slot) -> Result<Option<MediaSource>> {
        let catalog = self.fetch_catalog().await?;
        Ok(catalog.get(slot).cloned())
    }
}

/// Catalog read from a JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonCatalogSource {
    path: PathBuf,
}

impl JsonCatalogSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContentSource for JsonCatalogSource {
    async fn fetch_catalog(&self) -> Result<ContentCatalog> {
        debug!("Reading content catalog from {:?}", self.path);

        let data = tokio::fs::read_to_string(&self.path)
            .await
            .content_err(&format!("reading {}", self.path.display()))?;
        let catalog: ContentCatalog = serde_json::from_str(&data)?;

        info!(
            "Loaded catalog: hero={}, featured={}, projects={}",
            catalog.hero.is_some(),
            catalog.featured.is_some(),
            catalog.projects.len()
        );
        Ok(catalog)
    }
}

/// Turn a fetch outcome into the source a player is mounted with.
///
/// Failures and empty results fall back to `placeholder`; so does a source
/// whose media URL is blank.
pub fn resolve_source(result: Result<Option<MediaSource>>, placeholder: &MediaSource) -> MediaSource {
    match result {
        Ok(Some(source)) if source.is_playable() => source,
        Ok(Some(source)) => {
            warn!("Source '{}' has no media URL, using placeholder", source.title);
            placeholder.clone()
        }
        Ok(None) => {
            info!("No source supplied, using placeholder");
            placeholder.clone()
        }
        Err(e) => {
            warn!("Source fetch failed ({}), using placeholder", e);
            placeholder.clone()
        }
    }
}
