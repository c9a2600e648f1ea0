use crate::generator::frame::render_frame;
use crate::generator::tracker::FrameTracker;
use anyhow::Context;
use lasercore::feed::FeedMessage;
use lasercore::target::TargetGeometry;
use lasercore::vision::{CameraCalibration, GrayFrame, LaserDetector};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Configuration for the synthetic tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotGeneratorConfig {
    pub frame_width: usize,
    pub frame_height: usize,
    /// Standard deviation of the aim point around the camera target centre, in pixels.
    pub spread: f64,
    /// Fraction of ticks rendered without a laser dot.
    pub idle_ratio: f64,
    pub background: u8,
    pub noise: u8,
    pub spot_radius: f64,
    pub mirrored: bool,
    pub seed: u64,
    pub interval_ms: u64,
    pub detector: LaserDetector,
}

impl Default for ShotGeneratorConfig {
    fn default() -> Self {
        Self {
            frame_width: 320,
            frame_height: 240,
            spread: 40.0,
            idle_ratio: 0.1,
            background: 40,
            noise: 12,
            spot_radius: 3.0,
            mirrored: false,
            seed: 0,
            interval_ms: 250,
            detector: LaserDetector::default(),
        }
    }
}

/// Renders camera frames, detects the dot and emits tracker messages.
pub struct ShotGenerator {
    config: ShotGeneratorConfig,
    tracker: FrameTracker,
    rng: StdRng,
}

impl ShotGeneratorConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.idle_ratio),
            "idle_ratio must lie in [0, 1], got {}",
            self.idle_ratio
        );
        anyhow::ensure!(
            self.spread.is_finite() && self.spread >= 0.0,
            "spread must be finite and non-negative, got {}",
            self.spread
        );
        anyhow::ensure!(
            self.spot_radius.is_finite() && self.spot_radius > 0.0,
            "spot_radius must be positive, got {}",
            self.spot_radius
        );
        anyhow::ensure!(self.interval_ms > 0, "interval_ms must be positive");
        self.calibration().map(|_| ())
    }

    fn calibration(&self) -> anyhow::Result<CameraCalibration> {
        Ok(CameraCalibration::for_frame(self.frame_width, self.frame_height)
            .with_context(|| {
                format!(
                    "deriving camera calibration for a {}x{} frame",
                    self.frame_width, self.frame_height
                )
            })?
            .mirrored(self.mirrored))
    }
}

impl ShotGenerator {
    pub fn new(config: ShotGeneratorConfig, geometry: TargetGeometry) -> anyhow::Result<Self> {
        config.validate()?;
        let tracker = FrameTracker::new(config.detector, config.calibration()?, geometry);
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            tracker,
            rng,
        })
    }

    pub fn interval_ms(&self) -> u64 {
        self.config.interval_ms
    }

    /// Renders the next frame and the true dot position, if any.
    pub fn next_frame(&mut self) -> (GrayFrame, Option<(f64, f64)>) {
        let spot = if self.rng.gen_bool(self.config.idle_ratio) {
            None
        } else {
            let (dx, dy) = self.gaussian_pair();
            let calibration = self.tracker.calibration();
            Some((
                calibration.center_x + dx * self.config.spread,
                calibration.center_y + dy * self.config.spread,
            ))
        };
        let frame = render_frame(
            &mut self.rng,
            self.config.frame_width,
            self.config.frame_height,
            self.config.background,
            self.config.noise,
            spot,
            self.config.spot_radius,
        );
        (frame, spot)
    }

    pub fn next_message(&mut self) -> anyhow::Result<FeedMessage> {
        let (frame, _) = self.next_frame();
        self.tracker
            .track(frame.view())
            .context("tracking synthetic frame")
    }

    pub fn messages(&mut self, count: usize) -> anyhow::Result<Vec<String>> {
        (0..count)
            .map(|_| self.next_message().map(|message| message.to_json()))
            .collect()
    }

    fn gaussian_pair(&mut self) -> (f64, f64) {
        // Box-Muller; keep u1 away from zero so ln stays finite.
        let u1: f64 = self.rng.gen_range(f64::EPSILON..1.0);
        let u2: f64 = self.rng.gen();
        let magnitude = (-2.0 * u1.ln()).sqrt();
        let angle = 2.0 * PI * u2;
        (magnitude * angle.cos(), magnitude * angle.sin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lasercore::feed::decode;

    #[test]
    fn generator_is_deterministic_for_seed() {
        let config = ShotGeneratorConfig {
            seed: 42,
            ..Default::default()
        };
        let geometry = TargetGeometry::reference();
        let first = ShotGenerator::new(config.clone(), geometry)
            .unwrap()
            .messages(12)
            .unwrap();
        let second = ShotGenerator::new(config, geometry)
            .unwrap()
            .messages(12)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn idle_ticks_carry_no_position() {
        let config = ShotGeneratorConfig {
            idle_ratio: 1.0,
            ..Default::default()
        };
        let mut generator = ShotGenerator::new(config, TargetGeometry::reference()).unwrap();
        for raw in generator.messages(5).unwrap() {
            assert_eq!(raw, "{}");
        }
    }

    #[test]
    fn centred_shots_land_near_bullseye() {
        let config = ShotGeneratorConfig {
            spread: 0.0,
            idle_ratio: 0.0,
            ..Default::default()
        };
        let geometry = TargetGeometry::reference();
        let mut generator = ShotGenerator::new(config, geometry).unwrap();
        let point = decode(&generator.next_message().unwrap().to_json()).unwrap();
        assert!((point.x - geometry.center_x).abs() < 1.0);
        assert!((point.y - geometry.center_y).abs() < 1.0);
    }

    #[test]
    fn rejects_invalid_idle_ratio() {
        let config = ShotGeneratorConfig {
            idle_ratio: 1.5,
            ..Default::default()
        };
        assert!(ShotGenerator::new(config, TargetGeometry::reference()).is_err());
    }

    #[test]
    fn validate_rejects_degenerate_settings() {
        assert!(ShotGeneratorConfig::default().validate().is_ok());
        let cases = [
            ShotGeneratorConfig {
                frame_width: 2,
                ..Default::default()
            },
            ShotGeneratorConfig {
                spread: f64::NAN,
                ..Default::default()
            },
            ShotGeneratorConfig {
                spot_radius: 0.0,
                ..Default::default()
            },
            ShotGeneratorConfig {
                interval_ms: 0,
                ..Default::default()
            },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }
}
