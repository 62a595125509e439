use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Smoothing factor for the exponential moving averages. Higher reacts
// faster; 0.2 keeps a dashboard-friendly window of roughly the last
// dozen calls.
const EMA_ALPHA: f64 = 0.2;

/// Running counters over successful engine calls. Approximate under
/// concurrency (last-write-wins); used for observability, never scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
    pub count: u64,
    pub avg_latency_ms: f64,
    pub avg_score: f64,
    pub max_score: u8,
    pub last_calculated_at: Option<DateTime<Utc>>,
}

pub(crate) struct StatsRecorder {
    inner: RwLock<EngineStats>,
}

impl StatsRecorder {
    pub(crate) fn new() -> Self {
        Self {
            inner: RwLock::new(EngineStats::default()),
        }
    }

    pub(crate) fn record(&self, latency_ms: f64, overall: u8) {
        let mut stats = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        stats.count += 1;
        if stats.count == 1 {
            stats.avg_latency_ms = latency_ms;
            stats.avg_score = overall as f64;
        } else {
            stats.avg_latency_ms = EMA_ALPHA * latency_ms + (1.0 - EMA_ALPHA) * stats.avg_latency_ms;
            stats.avg_score = EMA_ALPHA * overall as f64 + (1.0 - EMA_ALPHA) * stats.avg_score;
        }
        stats.max_score = stats.max_score.max(overall);
        stats.last_calculated_at = Some(Utc::now());
    }

    pub(crate) fn snapshot(&self) -> EngineStats {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn reset(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = EngineStats::default();
    }
}
