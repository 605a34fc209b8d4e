//! Tile caches.
//!
//! [`CachedTileFetcher`] wraps another fetcher with two optional layers:
//! an in-memory LRU of encoded tiles and a directory on disk laid out as
//! `{z}/{x}/{y}.png`. Disk writes are best effort; a failed write is logged
//! and the fetched tile is still returned.

use std::fs;
use std::io::ErrorKind;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use bytes::Bytes;
use lru::LruCache;
use tracing::{debug, warn};
use xmap_common::TileCoord;

use crate::{TileError, TileFetcher, TileResult};

/// Hit/miss counters for a cached fetcher.
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Hits in the in-memory LRU
    pub memory_hits: AtomicU64,
    /// Hits in the disk cache
    pub disk_hits: AtomicU64,
    /// Tiles fetched from the wrapped fetcher
    pub misses: AtomicU64,
}

impl CacheStats {
    pub fn memory_hits(&self) -> u64 {
        self.memory_hits.load(Ordering::Relaxed)
    }

    pub fn disk_hits(&self) -> u64 {
        self.disk_hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Cache hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.memory_hits() + self.disk_hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

/// A tile fetcher with memory and disk caching in front of another fetcher.
pub struct CachedTileFetcher<F> {
    inner: F,
    memory: Option<Mutex<LruCache<TileCoord, Bytes>>>,
    disk_dir: Option<PathBuf>,
    stats: CacheStats,
}

impl<F: TileFetcher> CachedTileFetcher<F> {
    /// Wrap `inner` with an LRU holding up to `memory_tiles` tiles (0 disables it).
    pub fn new(inner: F, memory_tiles: usize) -> Self {
        Self {
            inner,
            memory: NonZeroUsize::new(memory_tiles).map(|cap| Mutex::new(LruCache::new(cap))),
            disk_dir: None,
            stats: CacheStats::default(),
        }
    }

    /// Also persist tiles below `dir`.
    pub fn with_disk_cache(mut self, dir: impl Into<PathBuf>) -> Self {
        self.disk_dir = Some(dir.into());
        self
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Location of a tile in the disk cache.
    pub fn disk_path(dir: &Path, coord: &TileCoord) -> PathBuf {
        dir.join(coord.z.to_string())
            .join(coord.x.to_string())
            .join(format!("{}.png", coord.y))
    }

    fn memory_get(&self, coord: &TileCoord) -> Option<Bytes> {
        let memory = self.memory.as_ref()?;
        let mut lru = memory.lock().unwrap_or_else(|e| e.into_inner());
        lru.get(coord).cloned()
    }

    fn memory_put(&self, coord: TileCoord, bytes: &Bytes) {
        if let Some(memory) = &self.memory {
            let mut lru = memory.lock().unwrap_or_else(|e| e.into_inner());
            lru.put(coord, bytes.clone());
        }
    }

    fn disk_get(&self, dir: &Path, coord: &TileCoord) -> TileResult<Option<Bytes>> {
        let path = Self::disk_path(dir, coord);
        match fs::read(&path) {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(TileError::Cache { path, source }),
        }
    }

    fn disk_put(&self, dir: &Path, coord: &TileCoord, bytes: &Bytes) -> std::io::Result<()> {
        let path = Self::disk_path(dir, coord);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to a temporary file first so readers never see partial tiles
        let temp_path = path.with_extension("partial");
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)
    }
}

impl<F: TileFetcher> TileFetcher for CachedTileFetcher<F> {
    fn fetch_tile(&self, coord: TileCoord) -> TileResult<Bytes> {
        if let Some(bytes) = self.memory_get(&coord) {
            self.stats.memory_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(bytes);
        }

        if let Some(dir) = &self.disk_dir {
            if let Some(bytes) = self.disk_get(dir, &coord)? {
                debug!(tile = %coord, "Disk cache hit");
                self.stats.disk_hits.fetch_add(1, Ordering::Relaxed);
                self.memory_put(coord, &bytes);
                return Ok(bytes);
            }
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        let bytes = self.inner.fetch_tile(coord)?;

        if let Some(dir) = &self.disk_dir {
            if let Err(e) = self.disk_put(dir, &coord, &bytes) {
                warn!(tile = %coord, error = %e, "Failed to write tile to disk cache");
            }
        }
        self.memory_put(coord, &bytes);

        Ok(bytes)
    }

    fn invalidate(&self, coord: TileCoord) {
        if let Some(memory) = &self.memory {
            let mut lru = memory.lock().unwrap_or_else(|e| e.into_inner());
            lru.pop(&coord);
        }

        if let Some(dir) = &self.disk_dir {
            let path = Self::disk_path(dir, &coord);
            match fs::remove_file(&path) {
                Ok(()) => debug!(tile = %coord, "Removed tile from disk cache"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(tile = %coord, error = %e, "Failed to remove tile from disk cache"),
            }
        }

        self.inner.invalidate(coord);
    }
}
