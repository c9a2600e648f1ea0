//! Scoring core and live feed ingest for the laser target trainer.
//!
//! A reported laser point is mapped onto concentric scoring rings by a pure
//! scorer; the feed modules decode tracker messages, apply them one at a time
//! and keep the explicitly-owned display state the front-end renders.

pub mod analysis;
pub mod display;
pub mod feed;
pub mod math;
pub mod prelude;
pub mod target;
pub mod telemetry;
pub mod vision;

pub use prelude::{FeedObserver, TargetError, TargetResult};
pub use target::{score, PointObservation, ProximitySignal, ScoreResult, TargetGeometry};
