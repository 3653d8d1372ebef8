//! Memoization of priority extraction, keyed by matrix contents.
//!
//! The engine itself never consults a cache; callers that re-evaluate the same
//! judgments repeatedly (an interactive front end re-rendering, a sweep over
//! criteria weights) can route extraction through [`priority_vector_cached`].
//! Keys hash the exact bit pattern of every entry, so any changed judgment
//! produces a new key and stale entries are simply never hit again.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::Serialize;
use tracing::warn;

use crate::consistency::{self, ConsistencyReport};
use crate::error::AhpError;
use crate::matrix::ComparisonMatrix;
use crate::priority::{self, AhpConfig, PriorityVector};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriorityCacheKey {
    pub size: usize,
    pub key_hash: String,
}

impl PriorityCacheKey {
    /// Hash the matrix size, its entries in row-major order, and the
    /// extraction tolerance (which decides whether extraction succeeds at all).
    pub fn new(matrix: &ComparisonMatrix, config: &AhpConfig) -> Self {
        let size = matrix.size();
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(size as u64).to_le_bytes());
        for row in 0..size {
            for col in 0..size {
                hasher.update(&matrix.get(row, col).to_bits().to_le_bytes());
            }
        }
        hasher.update(b"|");
        hasher.update(&config.imaginary_tolerance.to_bits().to_le_bytes());
        Self {
            size,
            key_hash: hasher.finalize().to_hex().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedPriority {
    pub weights: PriorityVector,
    pub report: ConsistencyReport,
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache lock poisoned")]
    Poisoned,
}

pub trait PriorityCache: Send + Sync {
    fn get(&self, key: &PriorityCacheKey) -> Result<Option<CachedPriority>, CacheError>;
    fn put(&self, key: &PriorityCacheKey, value: &CachedPriority) -> Result<(), CacheError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Process-local cache with no eviction; drop it or call [`clear`](Self::clear)
/// to release entries.
#[derive(Debug, Default)]
pub struct MemoryPriorityCache {
    entries: Mutex<HashMap<String, CachedPriority>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryPriorityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> Result<CacheStats, CacheError> {
        let entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?.len();
        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries,
        })
    }

    pub fn clear(&self) -> Result<(), CacheError> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Poisoned)?
            .clear();
        Ok(())
    }
}

impl PriorityCache for MemoryPriorityCache {
    fn get(&self, key: &PriorityCacheKey) -> Result<Option<CachedPriority>, CacheError> {
        let guard = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        let entry = guard.get(&key.key_hash).cloned();
        if entry.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        Ok(entry)
    }

    fn put(&self, key: &PriorityCacheKey, value: &CachedPriority) -> Result<(), CacheError> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Poisoned)?
            .insert(key.key_hash.clone(), value.clone());
        Ok(())
    }
}

/// [`priority::priority_vector`] through a cache.
///
/// Hits are relabeled for the caller and re-judged against the caller's
/// threshold. Cache failures are logged and fall back to direct computation.
pub fn priority_vector_cached(
    cache: &dyn PriorityCache,
    matrix: &ComparisonMatrix,
    label: &str,
    config: &AhpConfig,
) -> Result<(PriorityVector, ConsistencyReport), AhpError> {
    config.validate()?;
    let key = PriorityCacheKey::new(matrix, config);

    match cache.get(&key) {
        Ok(Some(hit)) => {
            let report =
                consistency::validate(hit.report.relabeled(label), config.consistency_threshold);
            return Ok((hit.weights, report));
        }
        Ok(None) => {}
        Err(err) => {
            warn!(error = %err, "Priority cache read failed; computing directly");
        }
    }

    let (weights, report) = priority::priority_vector(matrix, label, config)?;
    let entry = CachedPriority {
        weights: weights.clone(),
        report: report.clone(),
    };
    if let Err(err) = cache.put(&key, &entry) {
        warn!(error = %err, "Priority cache write failed");
    }
    Ok((weights, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::MatrixBuilder;

    fn sample(ratio: f64) -> ComparisonMatrix {
        MatrixBuilder::new(3)
            .judge(0, 1, ratio)
            .judge(0, 2, 5.0)
            .judge(1, 2, 2.0)
            .build()
            .unwrap()
    }

    #[test]
    fn key_is_stable_and_content_sensitive() {
        let cfg = AhpConfig::default();
        assert_eq!(
            PriorityCacheKey::new(&sample(3.0), &cfg),
            PriorityCacheKey::new(&sample(3.0), &cfg)
        );
        assert_ne!(
            PriorityCacheKey::new(&sample(3.0), &cfg).key_hash,
            PriorityCacheKey::new(&sample(3.0000001), &cfg).key_hash
        );
        let loose = AhpConfig {
            imaginary_tolerance: 1e-3,
            ..AhpConfig::default()
        };
        assert_ne!(
            PriorityCacheKey::new(&sample(3.0), &cfg).key_hash,
            PriorityCacheKey::new(&sample(3.0), &loose).key_hash
        );
    }

    #[test]
    fn key_ignores_consistency_threshold() {
        let strict = AhpConfig {
            consistency_threshold: 0.01,
            ..AhpConfig::default()
        };
        assert_eq!(
            PriorityCacheKey::new(&sample(3.0), &AhpConfig::default()),
            PriorityCacheKey::new(&sample(3.0), &strict)
        );
    }

    #[test]
    fn cached_result_matches_direct_and_counts_hits() {
        let cache = MemoryPriorityCache::new();
        let cfg = AhpConfig::default();
        let m = sample(3.0);

        let direct = priority::priority_vector(&m, "first", &cfg).unwrap();
        let miss = priority_vector_cached(&cache, &m, "first", &cfg).unwrap();
        let hit = priority_vector_cached(&cache, &m, "second", &cfg).unwrap();

        assert_eq!(direct, miss);
        assert_eq!(hit.0, direct.0);
        assert_eq!(hit.1.label, "second");
        assert_eq!(hit.1.consistency_ratio, direct.1.consistency_ratio);

        let stats = cache.stats().unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);

        cache.clear().unwrap();
        assert_eq!(cache.stats().unwrap().entries, 0);
    }

    #[test]
    fn hit_is_rejudged_against_callers_threshold() {
        let cache = MemoryPriorityCache::new();
        let m = sample(3.0);
        let (_, lenient) = priority_vector_cached(&cache, &m, "t", &AhpConfig::default()).unwrap();
        let strict = AhpConfig {
            consistency_threshold: 1e-6,
            ..AhpConfig::default()
        };
        let (_, judged) = priority_vector_cached(&cache, &m, "t", &strict).unwrap();
        assert!(lenient.passed);
        assert!(!judged.passed);
        assert_eq!(cache.stats().unwrap().hits, 1);
    }
}
