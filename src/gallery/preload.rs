//! Background metadata preloading for items that are likely to be hovered.

use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::GalleryConfig;

use super::cache::{CachedMedia, MediaCache, ReadyState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaMetadata {
    pub duration: f64,
    pub width: u32,
    pub height: u32,
}

/// Fetches enough of a media resource to learn its metadata.
#[async_trait]
pub trait MediaLoader: Send + Sync {
    async fn load_metadata(&self, url: &str) -> Result<MediaMetadata>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreloadReport {
    pub loaded: usize,
    pub failed: usize,
    pub evicted: usize,
}

pub struct Preloader<L> {
    loader: L,
    queue: VecDeque<String>,
    batch_size: usize,
    batch_delay: Duration,
}

impl<L: MediaLoader> Preloader<L> {
    pub fn new(loader: L, config: &GalleryConfig) -> Self {
        Self {
            loader,
            queue: VecDeque::new(),
            batch_size: config.preload_batch_size.max(1),
            batch_delay: Duration::from_millis(config.preload_batch_delay_ms),
        }
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queues every URL that is neither cached nor already queued.
    /// Returns how many were added.
    pub fn enqueue<I, S>(&mut self, urls: I, cache: &MediaCache<CachedMedia>) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.queue.len();
        for url in urls {
            let url = url.into();
            if !cache.contains(&url) && !self.queue.contains(&url) {
                self.queue.push_back(url);
            }
        }
        self.queue.len() - before
    }

    /// Drains the queue in batches, pausing between batches.
    pub async fn run(&mut self, cache: &mut MediaCache<CachedMedia>) -> PreloadReport {
        let mut report = PreloadReport::default();

        while !self.queue.is_empty() {
            let take = self.batch_size.min(self.queue.len());
            let batch: Vec<String> = self.queue.drain(..take).collect();

            let results = join_all(batch.iter().map(|url| self.loader.load_metadata(url))).await;

            for (url, result) in batch.into_iter().zip(results) {
                match result {
                    Ok(meta) => {
                        let media = CachedMedia {
                            ready_state: ReadyState::HaveMetadata,
                            duration: Some(meta.duration),
                            width: Some(meta.width),
                            height: Some(meta.height),
                            ..CachedMedia::new(url.clone())
                        };
                        if let Some((evicted, _)) = cache.insert(url, media) {
                            debug!(url = %evicted, "Evicted cached media");
                            report.evicted += 1;
                        }
                        report.loaded += 1;
                    }
                    Err(e) => {
                        warn!(url = %url, error = %e, "Failed to preload media");
                        report.failed += 1;
                    }
                }
            }

            if !self.queue.is_empty() {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        debug!(
            loaded = report.loaded,
            failed = report.failed,
            "Preload finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    #[derive(Clone, Default)]
    struct RecordingLoader {
        calls: Arc<Mutex<Vec<(String, Instant)>>>,
    }

    #[async_trait]
    impl MediaLoader for RecordingLoader {
        async fn load_metadata(&self, url: &str) -> Result<MediaMetadata> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), Instant::now()));
            if url.contains("broken") {
                anyhow::bail!("404 Not Found");
            }
            Ok(MediaMetadata {
                duration: 12.5,
                width: 1920,
                height: 1080,
            })
        }
    }

    #[test]
    fn enqueue_skips_cached_and_duplicate_urls() {
        let mut cache = MediaCache::new(4);
        cache.insert("a", CachedMedia::new("a"));

        let mut preloader = Preloader::new(RecordingLoader::default(), &GalleryConfig::default());
        assert_eq!(preloader.enqueue(["a", "b", "b", "c"], &cache), 2);
        assert_eq!(preloader.enqueue(["c"], &cache), 0);
        assert_eq!(preloader.pending(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn loads_in_batches_with_delay() {
        let loader = RecordingLoader::default();
        let mut preloader = Preloader::new(loader.clone(), &GalleryConfig::default());
        let mut cache = MediaCache::new(10);

        preloader.enqueue(["a", "b", "c", "broken", "e"], &cache);
        let start = Instant::now();
        let report = preloader.run(&mut cache).await;

        assert_eq!(
            report,
            PreloadReport {
                loaded: 4,
                failed: 1,
                evicted: 0
            }
        );
        assert_eq!(preloader.pending(), 0);
        assert!(!cache.contains("broken"));
        assert_eq!(cache.get("a").and_then(|m| m.duration), Some(12.5));

        let offsets: Vec<u128> = loader
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, at)| (*at - start).as_millis())
            .collect();
        assert_eq!(offsets, vec![0, 0, 200, 200, 400]);
    }

    #[tokio::test(start_paused = true)]
    async fn preloading_respects_cache_capacity() {
        let mut preloader = Preloader::new(RecordingLoader::default(), &GalleryConfig::default());
        let mut cache = MediaCache::new(2);

        preloader.enqueue(["a", "b", "c"], &cache);
        let report = preloader.run(&mut cache).await;

        assert_eq!(report.evicted, 1);
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("a"));
    }
}
