//! Frame-gated cache slot.
//!
//! Holds one value and the frame it was built for. A read for any other
//! frame rebuilds the value first; reads within the same frame reuse it.
//! There is no explicit invalidation: staleness is purely a frame comparison.

use std::time::{Duration, Instant};

/// Build and hit counters for a cache slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of times the build closure ran.
    pub builds: u64,
    /// Number of reads served without rebuilding.
    pub hits: u64,
    /// Wall time of the most recent build.
    pub last_build_time: Duration,
    /// Wall time of all builds so far.
    pub total_build_time: Duration,
}

impl CacheStats {
    pub fn avg_build_time(&self) -> Duration {
        if self.builds == 0 {
            Duration::ZERO
        } else {
            self.total_build_time / self.builds as u32
        }
    }
}

/// A single value valid for exactly one frame.
#[derive(Debug, Clone)]
pub struct FrameCache<T> {
    built_for: Option<u64>,
    data: Option<T>,
    stats: CacheStats,
}

impl<T> Default for FrameCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FrameCache<T> {
    pub fn new() -> Self {
        Self {
            built_for: None,
            data: None,
            stats: CacheStats::default(),
        }
    }

    /// Whether a read for `frame` would be served from cache.
    pub fn is_valid_for(&self, frame: u64) -> bool {
        self.data.is_some() && self.built_for == Some(frame)
    }

    /// Return the value for `frame`, running `build` first if it is stale.
    pub fn get_or_build<F>(&mut self, frame: u64, build: F) -> &T
    where
        F: FnOnce() -> T,
    {
        if self.is_valid_for(frame) {
            self.stats.hits += 1;
        } else {
            let start = Instant::now();
            let value = build();
            let elapsed = start.elapsed();

            self.stats.builds += 1;
            self.stats.last_build_time = elapsed;
            self.stats.total_build_time += elapsed;
            self.built_for = Some(frame);
            self.data = Some(value);
        }
        // Populated by the branch above.
        match &self.data {
            Some(value) => value,
            None => unreachable!("frame cache empty after build"),
        }
    }

    /// Number of times the build closure ran.
    pub fn build_count(&self) -> u64 {
        self.stats.builds
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
