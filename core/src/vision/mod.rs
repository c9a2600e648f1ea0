pub mod calibration;
pub mod detector;

pub use calibration::CameraCalibration;
pub use detector::{GrayFrame, LaserDetector, LaserSpot};
