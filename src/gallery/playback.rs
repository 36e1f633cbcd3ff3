//! Serialized play/pause for a single media element.
//!
//! Browsers reject a `pause()` issued while `play()` is still pending with an
//! abort error. The guard queues both operations behind one async mutex so a
//! pause always observes the outcome of the play before it.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlaybackError {
    /// The play request was superseded by a pause.
    #[error("Play request was interrupted")]
    Interrupted,

    #[error("Play request did not settle within {0:?}")]
    TimedOut(Duration),

    #[error("Media error: {0}")]
    Media(String),
}

impl PlaybackError {
    /// Interruptions are expected whenever the pointer leaves quickly.
    #[must_use]
    pub const fn is_benign(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

/// The host's handle to one video element.
#[async_trait]
pub trait MediaElement: Send + Sync {
    /// Resolves once playback has actually started.
    async fn play(&self) -> Result<(), PlaybackError>;

    fn pause(&self);

    fn is_paused(&self) -> bool;

    fn set_muted(&self, muted: bool);
}

pub struct PlaybackGuard<M> {
    media: M,
    queue: Mutex<()>,
    playing: AtomicBool,
    in_flight: AtomicBool,
    play_timeout: Duration,
}

impl<M: MediaElement> PlaybackGuard<M> {
    pub fn new(media: M, play_timeout: Duration) -> Self {
        Self {
            media,
            queue: Mutex::new(()),
            playing: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
            play_timeout,
        }
    }

    pub const fn media(&self) -> &M {
        &self.media
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn set_muted(&self, muted: bool) {
        self.media.set_muted(muted);
    }

    /// Starts playback unless it is already running.
    ///
    /// Interruptions are swallowed; timeouts and media errors are returned.
    pub async fn play(&self) -> Result<(), PlaybackError> {
        let _turn = self.queue.lock().await;

        if self.is_playing() && !self.media.is_paused() {
            return Ok(());
        }

        self.in_flight.store(true, Ordering::Release);
        let result = match tokio::time::timeout(self.play_timeout, self.media.play()).await {
            Ok(result) => result,
            Err(_) => Err(PlaybackError::TimedOut(self.play_timeout)),
        };
        self.in_flight.store(false, Ordering::Release);

        match result {
            Ok(()) => {
                self.playing.store(true, Ordering::Release);
                Ok(())
            }
            Err(e) if e.is_benign() => {
                debug!("Play interrupted by a later pause");
                self.playing.store(false, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                self.playing.store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Pauses after any queued play has settled.
    pub async fn pause(&self) {
        let _turn = self.queue.lock().await;

        if !self.media.is_paused() {
            self.media.pause();
        }
        self.playing.store(false, Ordering::Release);
    }
}
