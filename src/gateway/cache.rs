/*!
 * Result caching for accepted translations.
 *
 * A bounded, TTL-bounded, read-mostly map keyed by a digest of
 * (source text, source language, target language). A fresh hit returns the
 * accepted text byte-identical with zero engine dispatches. Entries live
 * only for the process lifetime.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};

use crate::language::Lang;

/// Digest key over (text, source, target).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey([u8; 32]);

impl CacheKey {
    fn new(text: &str, source: Lang, target: Lang) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hasher.update([0]);
        hasher.update(source.code().as_bytes());
        hasher.update([0]);
        hasher.update(target.code().as_bytes());
        Self(hasher.finalize().into())
    }
}

/// One cached result.
#[derive(Debug, Clone)]
struct CacheEntry {
    text: String,
    inserted_at: Instant,
}

/// Bounded TTL cache for accepted translations.
pub struct ResultCache {
    /// Internal cache storage
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,

    /// Cache hit counter
    hits: Arc<RwLock<usize>>,

    /// Cache miss counter
    misses: Arc<RwLock<usize>>,

    /// Entry time-to-live
    ttl: Duration,

    /// Maximum number of entries kept
    max_entries: usize,
}

impl ResultCache {
    /// Create a new cache. `max_entries == 0` disables caching entirely.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            hits: Arc::new(RwLock::new(0)),
            misses: Arc::new(RwLock::new(0)),
            ttl,
            max_entries,
        }
    }

    /// Look up a fresh entry. Expired entries count as misses and are
    /// removed lazily.
    pub fn get(&self, text: &str, source: Lang, target: Lang) -> Option<String> {
        if self.max_entries == 0 {
            return None;
        }

        let key = CacheKey::new(text, source, target);
        let found = {
            let entries = self.entries.read();
            entries.get(&key).cloned()
        };

        match found {
            Some(entry) if entry.inserted_at.elapsed() <= self.ttl => {
                *self.hits.write() += 1;
                debug!("cache hit ({} -> {})", source, target);
                Some(entry.text)
            }
            Some(_) => {
                // Expired: drop it and report a miss
                self.entries.write().remove(&key);
                *self.misses.write() += 1;
                None
            }
            None => {
                *self.misses.write() += 1;
                None
            }
        }
    }

    /// Store an accepted translation.
    pub fn store(&self, text: &str, source: Lang, target: Lang, translation: &str) {
        if self.max_entries == 0 {
            return;
        }

        let key = CacheKey::new(text, source, target);
        let mut entries = self.entries.write();

        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            self.evict_one(&mut entries);
        }

        entries.insert(
            key,
            CacheEntry {
                text: translation.to_string(),
                inserted_at: Instant::now(),
            },
        );
        debug!("cached translation ({} -> {})", source, target);
    }

    /// Drop one entry to make room: an expired one if any exists, else the
    /// oldest.
    fn evict_one(&self, entries: &mut HashMap<CacheKey, CacheEntry>) {
        let victim = entries
            .iter()
            .find(|(_, e)| e.inserted_at.elapsed() > self.ttl)
            .or_else(|| entries.iter().min_by_key(|(_, e)| e.inserted_at))
            .map(|(k, _)| *k);
        if let Some(key) = victim {
            entries.remove(&key);
        }
    }

    /// Get cache statistics: (hits, misses, hit rate).
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = *self.hits.read();
        let misses = *self.misses.read();
        let total = hits + misses;
        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };
        (hits, misses, hit_rate)
    }

    /// Number of entries currently held (including expired, until evicted).
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Clear all entries and counters.
    pub fn clear(&self) {
        self.entries.write().clear();
        *self.hits.write() = 0;
        *self.misses.write() = 0;
    }
}

impl Clone for ResultCache {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            hits: self.hits.clone(),
            misses: self.misses.clone(),
            ttl: self.ttl,
            max_entries: self.max_entries,
        }
    }
}
