use serde::{Deserialize, Serialize};
use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<FeedMetrics>,
}

/// Running counters for one feed session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedMetrics {
    pub scored: usize,
    pub skipped: usize,
    pub out_of_bounds: usize,
    pub transport_errors: usize,
}

impl FeedMetrics {
    /// Scored points that landed on the target.
    pub fn hits(&self) -> usize {
        self.scored.saturating_sub(self.out_of_bounds)
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(FeedMetrics::default()),
        }
    }

    pub fn record_scored(&self, in_bounds: bool) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.scored += 1;
            if !in_bounds {
                metrics.out_of_bounds += 1;
            }
        }
    }

    pub fn record_skipped(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.skipped += 1;
        }
    }

    pub fn record_transport_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.transport_errors += 1;
        }
    }

    pub fn snapshot(&self) -> FeedMetrics {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
