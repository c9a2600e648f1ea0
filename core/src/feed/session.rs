use crate::display::{DisplaySnapshot, DisplayState};
use crate::feed::driver::FeedFrame;
use crate::feed::message::decode;
use crate::prelude::{FeedObserver, TargetResult};
use crate::target::{score, ScoreResult, TargetGeometry};
use crate::telemetry::{FeedMetrics, LogManager, MetricsRecorder};
use std::time::{Duration, Instant};

/// What a single frame did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Scored(ScoreResult),
    Skipped,
    Connected,
    Disconnected,
    TransportFailed(String),
}

/// Applies tracker frames to the scorer and the display state, one at a time.
pub struct FeedSession {
    geometry: TargetGeometry,
    display: DisplayState,
    metrics: MetricsRecorder,
    logger: LogManager,
    observers: Vec<Box<dyn FeedObserver + Send>>,
}

impl FeedSession {
    pub fn new(geometry: TargetGeometry) -> TargetResult<Self> {
        Self::with_display(geometry, DisplayState::default())
    }

    pub fn with_warning_lifetime(
        geometry: TargetGeometry,
        warning_lifetime: Duration,
    ) -> TargetResult<Self> {
        Self::with_display(geometry, DisplayState::new(warning_lifetime))
    }

    fn with_display(geometry: TargetGeometry, display: DisplayState) -> TargetResult<Self> {
        geometry.validate()?;
        Ok(Self {
            geometry,
            display,
            metrics: MetricsRecorder::new(),
            logger: LogManager::new("feed"),
            observers: Vec::new(),
        })
    }

    pub fn subscribe(&mut self, observer: impl FeedObserver + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn geometry(&self) -> &TargetGeometry {
        &self.geometry
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn metrics(&self) -> FeedMetrics {
        self.metrics.snapshot()
    }

    pub fn snapshot(&self, now: Instant) -> DisplaySnapshot {
        self.display.snapshot(now, self.metrics.snapshot())
    }

    pub fn handle(&mut self, frame: FeedFrame, now: Instant) -> FeedEvent {
        match frame {
            FeedFrame::Opened => self.handle_connected(),
            FeedFrame::Text(raw) => self.handle_text(&raw, now),
            FeedFrame::Ignored => self.skip("non-text frame"),
            FeedFrame::Closed => self.handle_disconnected(),
            FeedFrame::Failed(reason) => self.handle_transport_error(reason),
        }
    }

    /// Scores one raw message. Anything without a usable position is skipped.
    pub fn handle_text(&mut self, raw: &str, now: Instant) -> FeedEvent {
        let Some(point) = decode(raw) else {
            return self.skip("no laser position");
        };

        let result = score(point, &self.geometry);
        self.display.apply(result, now);
        self.metrics.record_scored(result.in_bounds);
        match result.score {
            Some(value) => self.logger.detail(&format!(
                "({:.1}, {:.1}) distance {:.2} -> {} {:?}",
                point.x, point.y, result.distance, value, result.proximity_signal
            )),
            None => self.logger.warn(&format!(
                "laser outside target bounds at ({:.1}, {:.1}), distance {:.2}",
                point.x, point.y, result.distance
            )),
        }
        self.emit(FeedEvent::Scored(result))
    }

    pub fn handle_connected(&mut self) -> FeedEvent {
        self.display.mark_connected();
        self.logger.record("tracker connected");
        self.emit(FeedEvent::Connected)
    }

    pub fn handle_disconnected(&mut self) -> FeedEvent {
        self.display.mark_disconnected();
        self.logger.record("tracker disconnected");
        self.emit(FeedEvent::Disconnected)
    }

    pub fn handle_transport_error(&mut self, reason: impl Into<String>) -> FeedEvent {
        let reason = reason.into();
        self.display.mark_failed(reason.clone());
        self.metrics.record_transport_error();
        self.logger.warn(&format!("tracker transport failed: {reason}"));
        self.emit(FeedEvent::TransportFailed(reason))
    }

    fn skip(&mut self, why: &str) -> FeedEvent {
        self.metrics.record_skipped();
        self.logger.detail(&format!("frame skipped: {why}"));
        self.emit(FeedEvent::Skipped)
    }

    fn emit(&mut self, event: FeedEvent) -> FeedEvent {
        for observer in self.observers.iter_mut() {
            observer.on_event(&event);
        }
        event
    }
}
