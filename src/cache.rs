use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matching::JobCandidateMatch;

const DEFAULT_TTL_SECS: u64 = 1800;

/// Hit/miss counters for a match-score cache. `expired` counts reads
/// that found an entry past its TTL (each also counts as a miss).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub expired: u64,
}

/// Capability interface over the match-score cache, keyed by
/// `(user_id, job_id)`.
///
/// Injected at construction so deployments can swap the in-memory
/// implementation for a shared key-value store without touching callers.
/// The cache never errors: a miss is simply absent. Writes to the same
/// key are last-write-wins, no merge.
pub trait MatchCache: Send + Sync {
    fn get(&self, user_id: i64, job_id: i64) -> Option<JobCandidateMatch>;

    /// Exactly one present-or-absent answer per requested job id.
    fn get_many(&self, user_id: i64, job_ids: &[i64]) -> HashMap<i64, Option<JobCandidateMatch>>;

    fn set(&self, user_id: i64, job_id: i64, entry: JobCandidateMatch);

    /// Bulk write-through; entries are keyed by their own `job_id`.
    fn set_many(&self, user_id: i64, entries: Vec<JobCandidateMatch>);

    /// Drop one cached pair, e.g. after a profile or embedding change.
    fn invalidate(&self, user_id: i64, job_id: i64);

    /// Drop every cached score for a user.
    fn invalidate_user(&self, user_id: i64);

    fn stats(&self) -> CacheStats;
}

struct CacheEntry {
    value: JobCandidateMatch,
    expires_at: Instant,
}

/// Process-local TTL cache. Unbounded except for TTL eviction; no
/// cross-process coherence — horizontal deployments inject a shared
/// [`MatchCache`] implementation instead.
pub struct InMemoryMatchCache {
    ttl: Duration,
    entries: RwLock<HashMap<(i64, i64), CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
}

impl InMemoryMatchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expired: AtomicU64::new(0),
        }
    }

    /// TTL from `TM_MATCH_CACHE_TTL_SECS`, default 1800 seconds.
    pub fn from_env() -> Self {
        let ttl_secs = std::env::var("TM_MATCH_CACHE_TTL_SECS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_TTL_SECS);
        Self::new(Duration::from_secs(ttl_secs))
    }
}

impl Default for InMemoryMatchCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TTL_SECS))
    }
}

impl MatchCache for InMemoryMatchCache {
    fn get(&self, user_id: i64, job_id: i64) -> Option<JobCandidateMatch> {
        let key = (user_id, job_id);
        let now = Instant::now();

        let expired_hit = {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(&key) {
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    return None;
                }
                Some(entry) if entry.expires_at > now => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(entry.value.clone());
                }
                Some(_) => true,
            }
        };

        // Expired: remove so the entry is never resurrected. Re-check
        // under the write lock in case a concurrent set refreshed it.
        if expired_hit {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            if entries
                .get(&key)
                .is_some_and(|entry| entry.expires_at <= now)
            {
                entries.remove(&key);
                self.expired.fetch_add(1, Ordering::Relaxed);
                debug!(user_id, job_id, "cache entry expired");
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn get_many(&self, user_id: i64, job_ids: &[i64]) -> HashMap<i64, Option<JobCandidateMatch>> {
        job_ids
            .iter()
            .map(|&job_id| (job_id, self.get(user_id, job_id)))
            .collect()
    }

    fn set(&self, user_id: i64, job_id: i64, entry: JobCandidateMatch) {
        let expires_at = Instant::now() + self.ttl;
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                (user_id, job_id),
                CacheEntry {
                    value: entry,
                    expires_at,
                },
            );
    }

    fn set_many(&self, user_id: i64, entries: Vec<JobCandidateMatch>) {
        let expires_at = Instant::now() + self.ttl;
        let mut map = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for entry in entries {
            map.insert(
                (user_id, entry.job_id),
                CacheEntry {
                    value: entry,
                    expires_at,
                },
            );
        }
    }

    fn invalidate(&self, user_id: i64, job_id: i64) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(user_id, job_id));
    }

    fn invalidate_user(&self, user_id: i64) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(cached_user, _), _| *cached_user != user_id);
    }

    fn stats(&self) -> CacheStats {
        let size = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        CacheStats {
            size,
            hits,
            misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64
            },
            expired: self.expired.load(Ordering::Relaxed),
        }
    }
}
