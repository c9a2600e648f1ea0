pub mod geometry;
pub mod scoring;

pub use geometry::TargetGeometry;
pub use scoring::{score, PointObservation, ProximitySignal, ScoreResult};
