use crate::display::leds::IndicatorLeds;
use crate::target::{PointObservation, ProximitySignal, ScoreResult};
use crate::telemetry::FeedMetrics;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const OUT_OF_BOUNDS_WARNING: &str = "Laser outside target bounds";
pub const DEFAULT_WARNING_LIFETIME: Duration = Duration::from_secs(3);

/// Health of the tracker connection, kept apart from scoring output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Waiting,
    Connected,
    Disconnected,
    Failed {
        reason: String,
    },
}

impl ConnectionStatus {
    pub fn describe(&self) -> String {
        match self {
            ConnectionStatus::Waiting => "Waiting for tracker".into(),
            ConnectionStatus::Connected => "Tracker connected".into(),
            ConnectionStatus::Disconnected => "Tracker disconnected".into(),
            ConnectionStatus::Failed { reason } => {
                format!("Error connecting to tracking server: {reason}")
            }
        }
    }
}

#[derive(Debug, Clone)]
struct TransientWarning {
    message: &'static str,
    raised_at: Instant,
}

/// Last-known display state, owned and updated by the feed's caller.
#[derive(Debug, Clone)]
pub struct DisplayState {
    warning_lifetime: Duration,
    last_result: Option<ScoreResult>,
    last_score: Option<u32>,
    leds: IndicatorLeds,
    warning: Option<TransientWarning>,
    laser_detected: bool,
    connection: ConnectionStatus,
    open_trackers: usize,
}

/// Serializable view of [`DisplayState`] at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub score: Option<u32>,
    pub proximity_signal: Option<ProximitySignal>,
    pub in_bounds: Option<bool>,
    pub distance: Option<f64>,
    pub last_point: Option<PointObservation>,
    pub leds: IndicatorLeds,
    pub laser_detected: bool,
    pub warning: Option<String>,
    pub connection: ConnectionStatus,
    /// Tracker connections currently open against the feed.
    #[serde(default)]
    pub open_trackers: usize,
    #[serde(default)]
    pub metrics: FeedMetrics,
}

impl DisplayState {
    pub fn new(warning_lifetime: Duration) -> Self {
        Self {
            warning_lifetime,
            last_result: None,
            last_score: None,
            leds: IndicatorLeds::off(),
            warning: None,
            laser_detected: false,
            connection: ConnectionStatus::Waiting,
            open_trackers: 0,
        }
    }

    /// Records a fresh result. A miss keeps the previous score on screen and
    /// raises the out-of-bounds warning instead.
    pub fn apply(&mut self, result: ScoreResult, now: Instant) {
        self.laser_detected = true;
        self.leds = IndicatorLeds::for_signal(result.proximity_signal);
        if result.in_bounds {
            self.last_score = result.score;
        } else {
            self.warning = Some(TransientWarning {
                message: OUT_OF_BOUNDS_WARNING,
                raised_at: now,
            });
        }
        self.last_result = Some(result);
    }

    pub fn mark_connected(&mut self) {
        self.open_trackers += 1;
        self.connection = ConnectionStatus::Connected;
    }

    /// One tracker went away; the status only drops once none is left open.
    pub fn mark_disconnected(&mut self) {
        self.open_trackers = self.open_trackers.saturating_sub(1);
        if self.open_trackers == 0 {
            self.connection = ConnectionStatus::Disconnected;
        }
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.open_trackers = self.open_trackers.saturating_sub(1);
        if self.open_trackers == 0 {
            self.connection = ConnectionStatus::Failed {
                reason: reason.into(),
            };
        }
    }

    pub fn open_trackers(&self) -> usize {
        self.open_trackers
    }

    pub fn connection(&self) -> &ConnectionStatus {
        &self.connection
    }

    pub fn last_result(&self) -> Option<&ScoreResult> {
        self.last_result.as_ref()
    }

    pub fn active_warning(&self, now: Instant) -> Option<&'static str> {
        self.warning
            .as_ref()
            .filter(|warning| now.saturating_duration_since(warning.raised_at) < self.warning_lifetime)
            .map(|warning| warning.message)
    }

    /// Instant at which the current warning stops being shown.
    pub fn warning_deadline(&self, now: Instant) -> Option<Instant> {
        self.active_warning(now)?;
        self.warning
            .as_ref()
            .map(|warning| warning.raised_at + self.warning_lifetime)
    }

    pub fn snapshot(&self, now: Instant, metrics: FeedMetrics) -> DisplaySnapshot {
        DisplaySnapshot {
            score: self.last_score,
            proximity_signal: self.last_result.map(|result| result.proximity_signal),
            in_bounds: self.last_result.map(|result| result.in_bounds),
            distance: self.last_result.map(|result| result.distance),
            last_point: self.last_result.map(|result| result.point),
            leds: self.leds,
            laser_detected: self.laser_detected,
            warning: self.active_warning(now).map(str::to_string),
            connection: self.connection.clone(),
            open_trackers: self.open_trackers,
            metrics,
        }
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new(DEFAULT_WARNING_LIFETIME)
    }
}
