//! Per-item hover preview state machine.
//!
//! The machine never reads a clock. Every event carries `now` and timers are
//! stored as deadlines that fire from [`PreviewItem::poll`], so a host can
//! drive it from a render loop and tests can drive it with fixed instants.

use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::GalleryConfig;
use crate::domain::VideoId;

use super::playback::PlaybackError;
use super::thumbnail::Thumbnail;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewPhase {
    Unseen,
    ThumbnailVisible,
    Loading,
    Playing,
    Unavailable,
}

/// Side effects the host performs after a transition, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ShowThumbnail(String),
    ShowPlaceholder,
    LoadVideo(String),
    Play,
    Pause,
    ShowUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreviewState {
    pub phase: PreviewPhase,
    pub intersected: bool,
    pub hovered: bool,
    pub thumbnail_failed: bool,
    pub video_ready: bool,
    /// A `Play` was issued and has not settled yet
    pub in_flight: bool,
    pub retries: u32,
}

impl Default for PreviewState {
    fn default() -> Self {
        Self {
            phase: PreviewPhase::Unseen,
            intersected: false,
            hovered: false,
            thumbnail_failed: false,
            video_ready: false,
            in_flight: false,
            retries: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewTimings {
    pub hover_delay: Duration,
    pub leave_delay: Duration,
    pub retry_delay: Duration,
    pub retry_attempts: u32,
    pub load_timeout: Duration,
    pub lazy_threshold: f32,
}

impl Default for PreviewTimings {
    fn default() -> Self {
        Self::from(&GalleryConfig::default())
    }
}

impl From<&GalleryConfig> for PreviewTimings {
    fn from(config: &GalleryConfig) -> Self {
        Self {
            hover_delay: Duration::from_millis(config.hover_delay_ms),
            leave_delay: Duration::from_millis(config.leave_delay_ms),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            retry_attempts: config.retry_attempts,
            load_timeout: Duration::from_millis(config.load_timeout_ms),
            lazy_threshold: config.lazy_threshold,
        }
    }
}

/// Loads slower than this are logged as warnings.
pub const SLOW_LOAD: Duration = Duration::from_secs(3);

/// Video load outcomes, kept per item and summed by the gallery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub loaded: u32,
    pub failed: u32,
    pub slow: u32,
    pub total_load_time: Duration,
}

impl LoadStats {
    /// Share of finished loads that succeeded, `None` before the first one.
    #[must_use]
    pub fn success_rate(&self) -> Option<f64> {
        let total = self.loaded + self.failed;
        (total > 0).then(|| f64::from(self.loaded) / f64::from(total))
    }

    #[must_use]
    pub fn average_load_time(&self) -> Option<Duration> {
        (self.loaded > 0).then(|| self.total_load_time / self.loaded)
    }

    pub(crate) fn merge(&mut self, other: &Self) {
        self.loaded += other.loaded;
        self.failed += other.failed;
        self.slow += other.slow;
        self.total_load_time += other.total_load_time;
    }
}

/// Pointer debounce. At most one is armed at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Debounce {
    Enter,
    Leave,
}

/// Media timer, independent of the pointer so a leave/re-enter never drops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadTimer {
    Reload,
    Stalled,
}

#[derive(Debug, Clone, Copy)]
enum Timer {
    Debounce(Debounce),
    Load(LoadTimer),
}

#[derive(Debug, Clone)]
pub struct PreviewItem {
    id: VideoId,
    source: String,
    thumbnail: Thumbnail,
    timings: PreviewTimings,
    state: PreviewState,
    debounce: Option<(Debounce, Instant)>,
    load_timer: Option<(LoadTimer, Instant)>,
    loading_since: Option<Instant>,
    stats: LoadStats,
}

impl PreviewItem {
    #[must_use]
    pub fn new(id: VideoId, source: String, thumbnail: Thumbnail, timings: PreviewTimings) -> Self {
        Self {
            id,
            source,
            thumbnail,
            timings,
            state: PreviewState::default(),
            debounce: None,
            load_timer: None,
            loading_since: None,
            stats: LoadStats::default(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> &VideoId {
        &self.id
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub const fn thumbnail(&self) -> &Thumbnail {
        &self.thumbnail
    }

    #[must_use]
    pub const fn state(&self) -> PreviewState {
        self.state
    }

    #[must_use]
    pub const fn phase(&self) -> PreviewPhase {
        self.state.phase
    }

    #[must_use]
    pub const fn load_stats(&self) -> LoadStats {
        self.stats
    }

    /// Earliest instant at which [`poll`](Self::poll) has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        let debounce = self.debounce.map(|(_, at)| at);
        let load = self.load_timer.map(|(_, at)| at);
        debounce.into_iter().chain(load).min()
    }

    pub fn observe_visibility(&mut self, ratio: f32) -> Vec<Command> {
        if self.state.phase != PreviewPhase::Unseen
            || ratio <= 0.0
            || ratio < self.timings.lazy_threshold
        {
            return Vec::new();
        }

        self.state.intersected = true;
        self.transition(PreviewPhase::ThumbnailVisible);
        vec![self.thumbnail_command()]
    }

    pub fn pointer_enter(&mut self, now: Instant) -> Vec<Command> {
        self.state.hovered = true;

        match (self.state.phase, self.debounce) {
            (PreviewPhase::ThumbnailVisible, None) => {
                self.debounce = Some((Debounce::Enter, now + self.timings.hover_delay));
            }
            (PreviewPhase::Loading | PreviewPhase::Playing, Some((Debounce::Leave, _))) => {
                debug!(video_id = %self.id, "Pointer returned, pending leave cancelled");
                self.debounce = None;
                // Buffered while the pointer was away
                if self.state.phase == PreviewPhase::Loading && self.state.video_ready {
                    return self.start_playing();
                }
            }
            _ => {}
        }

        Vec::new()
    }

    pub fn pointer_leave(&mut self, now: Instant) -> Vec<Command> {
        self.state.hovered = false;

        match self.state.phase {
            PreviewPhase::ThumbnailVisible => {
                if matches!(self.debounce, Some((Debounce::Enter, _))) {
                    self.debounce = None;
                }
            }
            PreviewPhase::Loading | PreviewPhase::Playing => {
                if !matches!(self.debounce, Some((Debounce::Leave, _))) {
                    self.debounce = Some((Debounce::Leave, now + self.timings.leave_delay));
                }
            }
            PreviewPhase::Unseen | PreviewPhase::Unavailable => {}
        }

        Vec::new()
    }

    /// Enough data is buffered to play through.
    pub fn media_ready(&mut self, now: Instant) -> Vec<Command> {
        // No element exists before the item has been seen
        if self.state.phase == PreviewPhase::Unseen {
            return Vec::new();
        }
        self.state.video_ready = true;

        if self.state.phase != PreviewPhase::Loading {
            return Vec::new();
        }

        self.load_timer = None;
        self.record_load(now);

        // Without the pointer the pending leave decides
        if !self.state.hovered {
            return Vec::new();
        }
        self.start_playing()
    }

    /// A media error, or a load that stalled past `load_timeout`.
    ///
    /// Every failure spends the retry budget, whether or not the pointer is
    /// still over the item.
    pub fn media_failed(&mut self, now: Instant) -> Vec<Command> {
        self.state.video_ready = false;
        self.state.in_flight = false;

        let was_playing = self.state.phase == PreviewPhase::Playing;
        if !matches!(self.state.phase, PreviewPhase::Loading | PreviewPhase::Playing) {
            return Vec::new();
        }

        self.record_failure();

        let mut commands = Vec::new();
        if was_playing {
            commands.push(Command::Pause);
        }

        if self.state.retries < self.timings.retry_attempts {
            let backoff = self
                .timings
                .retry_delay
                .saturating_mul(2u32.saturating_pow(self.state.retries));
            self.state.retries += 1;
            debug!(
                video_id = %self.id,
                attempt = self.state.retries,
                backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                "Media failed, scheduling reload"
            );
            self.transition(PreviewPhase::Loading);
            self.load_timer = Some((LoadTimer::Reload, now + backoff));
        } else {
            self.debounce = None;
            self.load_timer = None;
            self.transition(PreviewPhase::Unavailable);
            commands.push(Command::ShowUnavailable);
        }

        commands
    }

    pub fn thumbnail_failed(&mut self) -> Vec<Command> {
        if self.state.thumbnail_failed {
            return Vec::new();
        }
        self.state.thumbnail_failed = true;
        metrics::counter!("gallery_thumbnail_failures_total").increment(1);

        if self.state.phase == PreviewPhase::ThumbnailVisible {
            vec![Command::ShowPlaceholder]
        } else {
            Vec::new()
        }
    }

    /// Manual retry from the unavailable fallback.
    pub fn retry(&mut self, now: Instant) -> Vec<Command> {
        if self.state.phase != PreviewPhase::Unavailable {
            return Vec::new();
        }

        self.state.retries = 0;
        self.state.video_ready = false;

        if self.state.hovered {
            vec![self.begin_load(now)]
        } else {
            self.transition(PreviewPhase::ThumbnailVisible);
            vec![self.thumbnail_command()]
        }
    }

    /// Reports how the last `Play` ended.
    pub fn playback_settled(
        &mut self,
        outcome: Result<(), &PlaybackError>,
        now: Instant,
    ) -> Vec<Command> {
        self.state.in_flight = false;

        match outcome {
            Err(e) if !e.is_benign() => self.media_failed(now),
            _ => Vec::new(),
        }
    }

    /// Fires every deadline that has passed, earliest first.
    pub fn poll(&mut self, now: Instant) -> Vec<Command> {
        let mut commands = Vec::new();
        while let Some(timer) = self.take_due(now) {
            commands.extend(self.fire(timer, now));
        }
        commands
    }

    fn take_due(&mut self, now: Instant) -> Option<Timer> {
        let debounce = self.debounce.filter(|&(_, at)| at <= now);
        let load = self.load_timer.filter(|&(_, at)| at <= now);

        match (debounce, load) {
            (Some((d, at)), Some((_, load_at))) if at <= load_at => {
                self.debounce = None;
                Some(Timer::Debounce(d))
            }
            (_, Some((l, _))) => {
                self.load_timer = None;
                Some(Timer::Load(l))
            }
            (Some((d, _)), None) => {
                self.debounce = None;
                Some(Timer::Debounce(d))
            }
            (None, None) => None,
        }
    }

    fn fire(&mut self, timer: Timer, now: Instant) -> Vec<Command> {
        match (timer, self.state.phase) {
            (Timer::Debounce(Debounce::Enter), PreviewPhase::ThumbnailVisible) => {
                let mut commands = vec![self.begin_load(now)];
                // Element kept from an earlier hover is already buffered
                if self.state.video_ready {
                    self.load_timer = None;
                    self.loading_since = None;
                    commands.extend(self.start_playing());
                }
                commands
            }
            (
                Timer::Debounce(Debounce::Leave),
                PreviewPhase::Loading | PreviewPhase::Playing,
            ) => {
                let mut commands = Vec::new();
                if self.state.phase == PreviewPhase::Playing || self.state.in_flight {
                    commands.push(Command::Pause);
                }
                self.load_timer = None;
                self.loading_since = None;
                self.state.retries = 0;
                self.transition(PreviewPhase::ThumbnailVisible);
                commands.push(self.thumbnail_command());
                commands
            }
            (Timer::Load(LoadTimer::Reload), PreviewPhase::Loading) => {
                vec![self.begin_load(now)]
            }
            (Timer::Load(LoadTimer::Stalled), PreviewPhase::Loading) => {
                debug!(video_id = %self.id, "No ready signal before the load timeout");
                self.media_failed(now)
            }
            _ => Vec::new(),
        }
    }

    /// Enters Loading and arms the stall timer.
    fn begin_load(&mut self, now: Instant) -> Command {
        self.transition(PreviewPhase::Loading);
        self.loading_since = Some(now);
        self.load_timer = Some((LoadTimer::Stalled, now + self.timings.load_timeout));
        Command::LoadVideo(self.source.clone())
    }

    fn record_load(&mut self, now: Instant) {
        let Some(since) = self.loading_since.take() else {
            return;
        };
        let elapsed = now.saturating_duration_since(since);

        self.stats.loaded += 1;
        self.stats.total_load_time += elapsed;
        metrics::histogram!("gallery_video_load_duration_seconds").record(elapsed.as_secs_f64());

        if elapsed > SLOW_LOAD {
            self.stats.slow += 1;
            warn!(
                video_id = %self.id,
                load_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                "Slow video load"
            );
        }
    }

    fn record_failure(&mut self) {
        self.loading_since = None;
        self.stats.failed += 1;
        metrics::counter!("gallery_video_load_failures_total").increment(1);
    }

    fn start_playing(&mut self) -> Vec<Command> {
        self.transition(PreviewPhase::Playing);
        self.state.in_flight = true;
        vec![Command::Play]
    }

    fn thumbnail_command(&self) -> Command {
        match (&self.thumbnail, self.state.thumbnail_failed) {
            (Thumbnail::Explicit(url) | Thumbnail::Derived(url), false) => {
                Command::ShowThumbnail(url.clone())
            }
            _ => Command::ShowPlaceholder,
        }
    }

    fn transition(&mut self, to: PreviewPhase) {
        if self.state.phase != to {
            debug!(video_id = %self.id, from = ?self.state.phase, to = ?to, "Preview transition");
            self.state.phase = to;
        }
    }
}
