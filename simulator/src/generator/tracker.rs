use anyhow::Context;
use lasercore::feed::FeedMessage;
use lasercore::target::TargetGeometry;
use lasercore::vision::{CameraCalibration, LaserDetector};
use ndarray::ArrayView2;

/// Turns grayscale camera frames into tracker messages.
#[derive(Debug, Clone)]
pub struct FrameTracker {
    detector: LaserDetector,
    calibration: CameraCalibration,
    geometry: TargetGeometry,
}

impl FrameTracker {
    pub fn new(
        detector: LaserDetector,
        calibration: CameraCalibration,
        geometry: TargetGeometry,
    ) -> Self {
        Self {
            detector,
            calibration,
            geometry,
        }
    }

    pub fn calibration(&self) -> &CameraCalibration {
        &self.calibration
    }

    /// An empty message when no laser dot is visible.
    pub fn track(&self, frame: ArrayView2<u8>) -> anyhow::Result<FeedMessage> {
        let spot = self
            .detector
            .detect(frame)
            .context("detecting laser spot")?;
        Ok(match spot {
            Some(spot) => {
                let point = self.calibration.spot_to_target(&spot, &self.geometry);
                FeedMessage::with_position(point.x, point.y)
            }
            None => FeedMessage::empty(),
        })
    }
}
