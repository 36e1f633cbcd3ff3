//! Bounded cache of instantiated media elements.
//!
//! Entries live in a fixed arena of slots. The slot index of an evicted entry
//! goes on a free list and is handed to the next insert, so the backing
//! storage never grows past the configured capacity.

use serde::Serialize;
use std::collections::{HashMap, VecDeque};

/// Mirrors `HTMLMediaElement.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyState {
    #[default]
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CachedMedia {
    pub url: String,
    pub ready_state: ReadyState,
    /// Seconds; `None` until metadata has loaded
    pub duration: Option<f64>,
    /// End of the last buffered range, in seconds
    pub buffered_end: f64,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl CachedMedia {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready_state >= ReadyState::HaveFutureData
    }

    /// Share of the media already buffered, `0.0` when the duration is unknown.
    #[must_use]
    pub fn buffer_percentage(&self) -> f64 {
        match self.duration {
            Some(duration) if duration > 0.0 && duration.is_finite() => {
                (self.buffered_end / duration * 100.0).clamp(0.0, 100.0)
            }
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub len: usize,
    pub capacity: usize,
    pub ready: usize,
}

#[derive(Debug)]
struct Slot<T> {
    key: String,
    value: T,
}

#[derive(Debug)]
pub struct MediaCache<T = CachedMedia> {
    capacity: usize,
    slots: Vec<Option<Slot<T>>>,
    index: HashMap<String, usize>,
    /// Slot indices, oldest insert first
    order: VecDeque<usize>,
    free: Vec<usize>,
}

impl<T> MediaCache<T> {
    /// A zero capacity is bumped to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            slots: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&T> {
        let slot = *self.index.get(key)?;
        self.slots[slot].as_ref().map(|s| &s.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        let slot = *self.index.get(key)?;
        self.slots[slot].as_mut().map(|s| &mut s.value)
    }

    /// Inserts or replaces `key`. Returns the entry evicted to make room.
    ///
    /// Replacing an existing key keeps its original insertion position.
    pub fn insert(&mut self, key: impl Into<String>, value: T) -> Option<(String, T)> {
        let key = key.into();

        if let Some(&slot) = self.index.get(&key) {
            if let Some(existing) = self.slots[slot].as_mut() {
                existing.value = value;
            }
            return None;
        }

        let evicted = if self.index.len() >= self.capacity {
            self.evict_oldest()
        } else {
            None
        };

        let slot = if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(Slot {
                key: key.clone(),
                value,
            });
            slot
        } else {
            self.slots.push(Some(Slot {
                key: key.clone(),
                value,
            }));
            self.slots.len() - 1
        };

        self.index.insert(key, slot);
        self.order.push_back(slot);
        evicted
    }

    pub fn remove(&mut self, key: &str) -> Option<T> {
        let slot = self.index.remove(key)?;
        self.order.retain(|&s| s != slot);
        self.free.push(slot);
        self.slots[slot].take().map(|s| s.value)
    }

    /// Empties the cache and hands back every entry, oldest first.
    pub fn clear(&mut self) -> Vec<(String, T)> {
        let mut drained = Vec::with_capacity(self.index.len());
        while let Some(entry) = self.evict_oldest() {
            drained.push(entry);
        }
        self.slots.clear();
        self.free.clear();
        drained
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .filter_map(|&slot| self.slots[slot].as_ref().map(|s| s.key.as_str()))
    }

    fn evict_oldest(&mut self) -> Option<(String, T)> {
        let slot = self.order.pop_front()?;
        let entry = self.slots[slot].take()?;
        self.index.remove(&entry.key);
        self.free.push(slot);
        Some((entry.key, entry.value))
    }
}

impl MediaCache<CachedMedia> {
    #[must_use]
    pub fn is_ready(&self, url: &str) -> bool {
        self.get(url).is_some_and(CachedMedia::is_ready)
    }

    #[must_use]
    pub fn buffer_percentage(&self, url: &str) -> f64 {
        self.get(url).map_or(0.0, CachedMedia::buffer_percentage)
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            len: self.len(),
            capacity: self.capacity,
            ready: self
                .order
                .iter()
                .filter_map(|&slot| self.slots[slot].as_ref())
                .filter(|s| s.value.is_ready())
                .count(),
        }
    }
}
