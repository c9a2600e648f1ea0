use crate::workflow::config::SessionConfig;
use anyhow::Context;
use lasercore::display::DisplaySnapshot;
use lasercore::feed::{FeedEvent, FeedSession};
use lasercore::math::StatsHelper;
use lasercore::target::{ProximitySignal, ScoreResult};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Totals for one replayed batch of tracker messages.
#[derive(Debug, Clone)]
pub struct ReplaySummary {
    pub messages: usize,
    pub scored: usize,
    pub skipped: usize,
    pub out_of_bounds: usize,
    pub center_hits: usize,
    pub mean_score: f64,
    pub best_score: Option<u32>,
    pub snapshot: DisplaySnapshot,
}

#[derive(Clone)]
pub struct Runner {
    config: SessionConfig,
}

impl Runner {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    pub fn session(&self) -> anyhow::Result<FeedSession> {
        FeedSession::with_warning_lifetime(self.config.geometry, self.config.warning_lifetime())
            .context("building feed session")
    }

    /// Feeds raw messages through a fresh session, in order.
    pub fn replay<I>(&self, messages: I) -> anyhow::Result<ReplaySummary>
    where
        I: IntoIterator<Item = String>,
    {
        let mut session = self.session()?;
        let results: Arc<Mutex<Vec<ScoreResult>>> = Arc::default();
        let sink = results.clone();
        session.subscribe(move |event: &FeedEvent| {
            if let FeedEvent::Scored(result) = event {
                if let Ok(mut results) = sink.lock() {
                    results.push(*result);
                }
            }
        });

        let mut count = 0;
        for raw in messages {
            session.handle_text(&raw, Instant::now());
            count += 1;
        }

        let results = results
            .lock()
            .map_err(|_| anyhow::anyhow!("replay results lock poisoned"))?;
        let scores: Vec<f64> = results
            .iter()
            .filter_map(|result| result.score.map(f64::from))
            .collect();
        let metrics = session.metrics();

        Ok(ReplaySummary {
            messages: count,
            scored: metrics.scored,
            skipped: metrics.skipped,
            out_of_bounds: metrics.out_of_bounds,
            center_hits: results
                .iter()
                .filter(|result| result.proximity_signal == ProximitySignal::CenterHit)
                .count(),
            mean_score: StatsHelper::mean(&scores),
            best_score: results.iter().filter_map(|result| result.score).max(),
            snapshot: session.snapshot(Instant::now()),
        })
    }
}
