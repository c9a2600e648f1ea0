use crate::prelude::{TargetError, TargetResult};
use crate::target::{PointObservation, TargetGeometry};
use crate::vision::detector::LaserSpot;
use serde::{Deserialize, Serialize};

/// Circle in camera pixels that lines up with the physical target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraCalibration {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    /// Set when the camera image is flipped horizontally before detection.
    #[serde(default)]
    pub mirrored: bool,
    #[serde(default)]
    pub frame_width: f64,
}

impl CameraCalibration {
    pub fn new(center_x: f64, center_y: f64, radius: f64) -> TargetResult<Self> {
        let calibration = Self {
            center_x,
            center_y,
            radius,
            mirrored: false,
            frame_width: 0.0,
        };
        calibration.validate()?;
        Ok(calibration)
    }

    /// Target centred in the frame, spanning a third of the short side.
    pub fn for_frame(width: usize, height: usize) -> TargetResult<Self> {
        Self::new(
            (width / 2) as f64,
            (height / 2) as f64,
            (width.min(height) / 3) as f64,
        )
        .map(|calibration| Self {
            frame_width: width as f64,
            ..calibration
        })
    }

    pub fn mirrored(self, mirrored: bool) -> Self {
        Self { mirrored, ..self }
    }

    pub fn validate(&self) -> TargetResult<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(TargetError::InvalidCalibration(format!(
                "camera radius must be positive, got {}",
                self.radius
            )));
        }
        if !(self.center_x.is_finite() && self.center_y.is_finite()) {
            return Err(TargetError::InvalidCalibration(
                "camera center must be finite".into(),
            ));
        }
        if self.mirrored && self.frame_width <= 0.0 {
            return Err(TargetError::InvalidCalibration(
                "mirroring needs the frame width".into(),
            ));
        }
        Ok(())
    }

    /// Maps a camera pixel onto the target coordinate space.
    pub fn to_target(
        &self,
        frame_x: f64,
        frame_y: f64,
        geometry: &TargetGeometry,
    ) -> PointObservation {
        let frame_x = if self.mirrored {
            self.frame_width - 1.0 - frame_x
        } else {
            frame_x
        };
        let scale = geometry.target_radius / self.radius;
        PointObservation::new(
            geometry.center_x + (frame_x - self.center_x) * scale,
            geometry.center_y + (frame_y - self.center_y) * scale,
        )
    }

    pub fn spot_to_target(&self, spot: &LaserSpot, geometry: &TargetGeometry) -> PointObservation {
        self.to_target(spot.x, spot.y, geometry)
    }

    /// Inverse of [`CameraCalibration::to_target`].
    pub fn to_frame(&self, point: PointObservation, geometry: &TargetGeometry) -> (f64, f64) {
        let scale = self.radius / geometry.target_radius;
        let frame_x = self.center_x + (point.x - geometry.center_x) * scale;
        let frame_y = self.center_y + (point.y - geometry.center_y) * scale;
        let frame_x = if self.mirrored {
            self.frame_width - 1.0 - frame_x
        } else {
            frame_x
        };
        (frame_x, frame_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_default_uses_a_third_of_short_side() {
        let calibration = CameraCalibration::for_frame(640, 480).unwrap();
        assert_eq!(calibration.center_x, 320.0);
        assert_eq!(calibration.center_y, 240.0);
        assert_eq!(calibration.radius, 160.0);
    }

    #[test]
    fn camera_center_maps_to_bullseye() {
        let geometry = TargetGeometry::reference();
        let calibration = CameraCalibration::for_frame(640, 480).unwrap();
        let point = calibration.to_target(320.0, 240.0, &geometry);
        assert_eq!(point, PointObservation::new(512.0, 384.0));
    }

    #[test]
    fn camera_circle_edge_maps_to_target_edge() {
        let geometry = TargetGeometry::reference();
        let calibration = CameraCalibration::for_frame(640, 480).unwrap();
        let point = calibration.to_target(480.0, 240.0, &geometry);
        assert_eq!(point, PointObservation::new(712.0, 384.0));
    }

    #[test]
    fn mirrored_mapping_round_trips() {
        let geometry = TargetGeometry::reference();
        let calibration = CameraCalibration::for_frame(320, 240).unwrap().mirrored(true);
        let point = calibration.to_target(100.0, 60.0, &geometry);
        let (x, y) = calibration.to_frame(point, &geometry);
        assert!((x - 100.0).abs() < 1e-9);
        assert!((y - 60.0).abs() < 1e-9);
    }

    #[test]
    fn zero_radius_is_rejected() {
        assert!(CameraCalibration::new(10.0, 10.0, 0.0).is_err());
        assert!(CameraCalibration::for_frame(2, 2).is_err());
    }
}
