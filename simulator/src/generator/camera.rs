use crate::generator::tracker::FrameTracker;
use anyhow::Result;
use lasercore::feed::FeedFrame;
use lasercore::target::TargetGeometry;
use lasercore::vision::{CameraCalibration, GrayFrame, LaserDetector};
use log::{info, warn};
use opencv::{
    core::Mat,
    imgproc,
    prelude::*,
    videoio::{VideoCapture, VideoCaptureAPIs},
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Live camera pointed at the physical target.
pub struct Camera {
    capture: VideoCapture,
}

impl Camera {
    pub fn new(device_id: i32) -> Result<Self> {
        let capture = VideoCapture::new(device_id, VideoCaptureAPIs::CAP_ANY as i32)?;

        if !capture.is_opened()? {
            anyhow::bail!("Failed to open camera {device_id}");
        }

        Ok(Self { capture })
    }

    pub fn read_frame(&mut self) -> Result<GrayFrame> {
        let mut frame = Mat::default();
        self.capture.read(&mut frame)?;

        if frame.empty() {
            anyhow::bail!("Empty frame");
        }

        gray_frame(&frame)
    }
}

/// Converts a BGR capture into the detector's grayscale frame.
pub fn gray_frame(frame: &Mat) -> Result<GrayFrame> {
    let mut gray = Mat::default();
    imgproc::cvt_color(frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;
    let rows = usize::try_from(gray.rows())?;
    let cols = usize::try_from(gray.cols())?;
    let pixels = gray.data_bytes()?.to_vec();
    Ok(GrayFrame::from_shape_vec((rows, cols), pixels)?)
}

/// Streams camera frames into the ingest loop until the loop goes away.
///
/// Capture blocks, so it runs on the blocking pool. The camera faces the
/// shooter, so the image is treated as mirrored.
pub fn spawn_camera(
    device_id: i32,
    detector: LaserDetector,
    geometry: TargetGeometry,
    frames: mpsc::Sender<FeedFrame>,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let mut camera = match Camera::new(device_id) {
            Ok(camera) => camera,
            Err(err) => {
                warn!("camera {device_id} unavailable: {err:#}");
                let _ = frames.blocking_send(FeedFrame::Failed(format!("{err:#}")));
                return;
            }
        };
        if frames.blocking_send(FeedFrame::Opened).is_err() {
            return;
        }
        let Some(mut frame) = capture_or_report(&mut camera, &frames) else {
            return;
        };
        let (height, width) = frame.dim();
        let calibration = match CameraCalibration::for_frame(width, height) {
            Ok(calibration) => calibration.mirrored(true),
            Err(err) => {
                let _ = frames.blocking_send(FeedFrame::Failed(err.to_string()));
                return;
            }
        };
        let tracker = FrameTracker::new(detector, calibration, geometry);
        info!("camera {device_id} tracking {width}x{height} frames");

        loop {
            let message = match tracker.track(frame.view()) {
                Ok(message) => FeedFrame::Text(message.to_json()),
                Err(err) => {
                    warn!("camera frame dropped: {err:#}");
                    FeedFrame::Ignored
                }
            };
            if frames.blocking_send(message).is_err() {
                break;
            }
            frame = match capture_or_report(&mut camera, &frames) {
                Some(frame) => frame,
                None => break,
            };
        }
    })
}

fn capture_or_report(camera: &mut Camera, frames: &mpsc::Sender<FeedFrame>) -> Option<GrayFrame> {
    match camera.read_frame() {
        Ok(frame) => Some(frame),
        Err(err) => {
            warn!("camera stopped: {err:#}");
            let _ = frames.blocking_send(FeedFrame::Failed(format!("{err:#}")));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC3};

    #[test]
    fn bgr_capture_becomes_gray_frame() {
        let frame =
            Mat::new_rows_cols_with_default(4, 6, CV_8UC3, Scalar::all(255.0)).unwrap();
        let gray = gray_frame(&frame).unwrap();
        assert_eq!(gray.dim(), (4, 6));
        assert!(gray.iter().all(|&value| value == 255));
    }
}
