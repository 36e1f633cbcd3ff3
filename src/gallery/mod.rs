//! Hover-preview gallery: lazy thumbnails, debounced preview playback and
//! one mute switch shared by every item.

pub mod cache;
pub mod connection;
pub mod playback;
pub mod preload;
pub mod preview;
pub mod thumbnail;
pub mod visibility;

use serde::Serialize;
use tokio::time::Instant;

use crate::config::GalleryConfig;
use crate::domain::{Category, VideoId};
use crate::models::VideoRecord;

pub use cache::{CacheStats, CachedMedia, MediaCache, ReadyState};
pub use connection::ConnectionQuality;
pub use playback::{MediaElement, PlaybackError, PlaybackGuard};
pub use preload::{MediaLoader, MediaMetadata, PreloadReport, Preloader};
pub use preview::{Command, LoadStats, PreviewItem, PreviewPhase, PreviewState, PreviewTimings};
pub use thumbnail::{Thumbnail, preview_source, thumbnail_for};
pub use visibility::{Rect, intersection_ratio};

/// What the host needs to draw one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: VideoId,
    pub title: String,
    pub category: Category,
    pub thumbnail: Thumbnail,
    pub source: String,
    pub phase: PreviewPhase,
    pub show_video: bool,
    pub muted: bool,
    pub buffer_percentage: f64,
}

pub struct Gallery {
    items: Vec<GalleryEntry>,
    muted: bool,
    quality: ConnectionQuality,
    config: GalleryConfig,
    cache: MediaCache<CachedMedia>,
}

struct GalleryEntry {
    title: String,
    category: Category,
    preview: PreviewItem,
}

impl Gallery {
    #[must_use]
    pub fn new(config: GalleryConfig, quality: ConnectionQuality) -> Self {
        Self {
            items: Vec::new(),
            muted: true,
            quality,
            cache: MediaCache::new(config.cache_capacity),
            config,
        }
    }

    #[must_use]
    pub fn from_records(
        records: &[VideoRecord],
        config: GalleryConfig,
        quality: ConnectionQuality,
    ) -> Self {
        let mut gallery = Self::new(config, quality);
        for record in records {
            gallery.push(record);
        }
        gallery
    }

    pub fn push(&mut self, record: &VideoRecord) {
        let preview = PreviewItem::new(
            record.id.clone(),
            preview_source(&record.video_url, self.quality),
            thumbnail_for(&record.video_url, None),
            PreviewTimings::from(&self.config),
        );

        self.items.push(GalleryEntry {
            title: record.title.clone(),
            category: record.category,
            preview,
        });
    }

    /// Drops the item and its preview state. Returns the cached media for its
    /// source, if any, so the host can release the element.
    pub fn remove(&mut self, id: &VideoId) -> Option<CachedMedia> {
        let index = self.items.iter().position(|e| e.preview.id() == id)?;
        let entry = self.items.remove(index);
        self.cache.remove(entry.preview.source())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn quality(&self) -> ConnectionQuality {
        self.quality
    }

    #[must_use]
    pub const fn is_muted(&self) -> bool {
        self.muted
    }

    /// Flips the shared mute flag. Returns the new value.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn item(&self, id: &VideoId) -> Option<&PreviewItem> {
        self.items
            .iter()
            .find(|e| e.preview.id() == id)
            .map(|e| &e.preview)
    }

    pub fn item_mut(&mut self, id: &VideoId) -> Option<&mut PreviewItem> {
        self.items
            .iter_mut()
            .find(|e| e.preview.id() == id)
            .map(|e| &mut e.preview)
    }

    /// Load outcomes summed over every item.
    #[must_use]
    pub fn load_stats(&self) -> LoadStats {
        self.items.iter().fold(LoadStats::default(), |mut total, e| {
            total.merge(&e.preview.load_stats());
            total
        })
    }

    #[must_use]
    pub const fn cache(&self) -> &MediaCache<CachedMedia> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut MediaCache<CachedMedia> {
        &mut self.cache
    }

    /// Feeds each item's layout rectangle through the lazy-load check.
    pub fn update_visibility(
        &mut self,
        viewport: &Rect,
        layout: &[(VideoId, Rect)],
    ) -> Vec<(VideoId, Command)> {
        let margin = self.config.root_margin_px;
        let mut out = Vec::new();

        for (id, rect) in layout {
            let ratio = intersection_ratio(rect, viewport, margin);
            if let Some(item) = self.item_mut(id) {
                out.extend(item.observe_visibility(ratio).into_iter().map(|c| (id.clone(), c)));
            }
        }

        out
    }

    /// Fires every deadline that has passed.
    pub fn poll(&mut self, now: Instant) -> Vec<(VideoId, Command)> {
        self.items
            .iter_mut()
            .flat_map(|e| {
                let id = e.preview.id().clone();
                e.preview
                    .poll(now)
                    .into_iter()
                    .map(move |c| (id.clone(), c))
            })
            .collect()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.items
            .iter()
            .filter_map(|e| e.preview.next_deadline())
            .min()
    }

    /// Current view of every item. The mute flag is read here, so a toggle
    /// reaches all items on the next render.
    #[must_use]
    pub fn render(&self) -> Vec<ItemView> {
        self.items
            .iter()
            .map(|e| {
                let preview = &e.preview;
                ItemView {
                    id: preview.id().clone(),
                    title: e.title.clone(),
                    category: e.category,
                    thumbnail: preview.thumbnail().clone(),
                    source: preview.source().to_string(),
                    phase: preview.phase(),
                    show_video: preview.phase() == PreviewPhase::Playing,
                    muted: self.muted,
                    buffer_percentage: self.cache.buffer_percentage(preview.source()),
                }
            })
            .collect()
    }
}
