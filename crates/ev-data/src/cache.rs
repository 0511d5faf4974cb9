use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use ev_types::{EvResult, Front};
use parking_lot::RwLock;

use crate::fronts::read_front;

/// Cached reference front with access metadata
#[derive(Debug, Clone)]
struct CacheEntry {
    front: Arc<Front>,
    loaded_at: DateTime<Utc>,
    last_accessed: DateTime<Utc>,
    access_count: u64,
}

impl CacheEntry {
    fn new(front: Front) -> Self {
        let now = Utc::now();
        Self {
            front: Arc::new(front),
            loaded_at: now,
            last_accessed: now,
            access_count: 0,
        }
    }

    fn access(&mut self) -> Arc<Front> {
        self.last_accessed = Utc::now();
        self.access_count += 1;
        Arc::clone(&self.front)
    }
}

/// Read-only reference fronts shared by every evaluation of a run.
#[derive(Debug, Default)]
pub struct ReferenceFrontCache {
    cache: DashMap<PathBuf, RwLock<CacheEntry>>,
    stats: RwLock<CacheStats>,
}

impl ReferenceFrontCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached front for `path`, reading the file on first use.
    pub fn get_or_load<P: AsRef<Path>>(&self, path: P) -> EvResult<Arc<Front>> {
        let key = path.as_ref().to_path_buf();

        if let Some(entry_lock) = self.cache.get(&key) {
            let front = entry_lock.write().access();
            self.stats.write().hits += 1;
            return Ok(front);
        }

        self.stats.write().misses += 1;
        let front = read_front(&key)?;
        let points = front.len() as u64;
        let entry = self
            .cache
            .entry(key)
            .or_insert_with(|| RwLock::new(CacheEntry::new(front)));
        let shared = entry.write().access();

        {
            let mut stats = self.stats.write();
            stats.loads += 1;
            stats.total_points_cached += points;
        }
        Ok(shared)
    }

    pub fn insert<P: AsRef<Path>>(&self, path: P, front: Front) -> Arc<Front> {
        let entry = CacheEntry::new(front);
        let shared = Arc::clone(&entry.front);
        self.stats.write().total_points_cached += shared.len() as u64;
        self.cache
            .insert(path.as_ref().to_path_buf(), RwLock::new(entry));
        shared
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&self) {
        self.cache.clear();
        *self.stats.write() = CacheStats::default();
    }

    pub fn get_stats(&self) -> CacheStats {
        self.stats.read().clone()
    }

    /// Oldest load time among cached fronts.
    pub fn oldest_load(&self) -> Option<DateTime<Utc>> {
        self.cache
            .iter()
            .map(|entry| entry.value().read().loaded_at)
            .min()
    }

    pub fn access_count<P: AsRef<Path>>(&self, path: P) -> u64 {
        self.cache
            .get(path.as_ref())
            .map(|entry| entry.read().access_count)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub loads: u64,
    pub total_points_cached: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}
