use crate::math::stats::StatsHelper;
use crate::target::geometry::TargetGeometry;
use serde::{Deserialize, Serialize};

/// A single reported laser position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointObservation {
    pub x: f64,
    pub y: f64,
}

impl PointObservation {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Which indicator lights up for a scored point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProximitySignal {
    Outside,
    NearCenter,
    CenterHit,
}

/// Outcome of scoring one observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub point: PointObservation,
    pub distance: f64,
    pub in_bounds: bool,
    pub score: Option<u32>,
    pub proximity_signal: ProximitySignal,
}

/// Scores `point` against `geometry`.
///
/// Ring index 0 is the outermost ring. Points on the outer edge can land one
/// index past the last whole ring when the ring width does not divide the
/// radius; those are clamped up to a score of 1 instead of dropping to 0.
pub fn score(point: PointObservation, geometry: &TargetGeometry) -> ScoreResult {
    let distance = StatsHelper::distance(point.x, point.y, geometry.center_x, geometry.center_y);

    let in_bounds = distance <= geometry.target_radius;
    if !in_bounds {
        return ScoreResult {
            point,
            distance,
            in_bounds: false,
            score: None,
            proximity_signal: ProximitySignal::Outside,
        };
    }

    let ring_index = (distance / geometry.ring_width).floor() as i64;
    let raw_ring_score = i64::from(geometry.ring_count()) - ring_index;
    let score = raw_ring_score.max(1) as u32;

    let proximity_signal = if distance <= geometry.bull_radius {
        ProximitySignal::CenterHit
    } else {
        ProximitySignal::NearCenter
    };

    ScoreResult {
        point,
        distance,
        in_bounds,
        score: Some(score),
        proximity_signal,
    }
}
