use crate::target::PointObservation;
use serde::{Deserialize, Serialize};

/// Wire shape of one tracker message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laser_position: Option<LaserPosition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaserPosition {
    pub x: f64,
    pub y: f64,
}

impl FeedMessage {
    pub fn with_position(x: f64, y: f64) -> Self {
        Self {
            laser_position: Some(LaserPosition { x, y }),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".into())
    }
}

/// Extracts the laser point from a raw frame.
///
/// Returns `None` for anything that should not be scored: invalid JSON, a
/// missing or `null` position, or coordinates that are not finite numbers.
pub fn decode(raw: &str) -> Option<PointObservation> {
    let message: FeedMessage = serde_json::from_str(raw).ok()?;
    let position = message.laser_position?;
    let point = PointObservation::new(position.x, position.y);
    point.is_finite().then_some(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_laser_position() {
        let point = decode(r#"{"laser_position": {"x": 512, "y": 404.5}}"#).unwrap();
        assert_eq!(point, PointObservation::new(512.0, 404.5));
    }

    #[test]
    fn ignores_extra_fields() {
        let raw = r#"{"frame": 7, "laser_position": {"x": 1, "y": 2, "area": 9}}"#;
        assert_eq!(decode(raw), Some(PointObservation::new(1.0, 2.0)));
    }

    #[test]
    fn missing_or_null_position_is_not_scored() {
        assert_eq!(decode("{}"), None);
        assert_eq!(decode(r#"{"laser_position": null}"#), None);
    }

    #[test]
    fn malformed_frames_are_not_scored() {
        assert_eq!(decode("not json"), None);
        assert_eq!(decode(r#"{"laser_position": {"x": "left", "y": 2}}"#), None);
        assert_eq!(decode(r#"{"laser_position": {"x": 3}}"#), None);
        assert_eq!(decode("[1, 2]"), None);
    }

    #[test]
    fn empty_message_serializes_without_position() {
        assert_eq!(FeedMessage::empty().to_json(), "{}");
        assert_eq!(
            decode(&FeedMessage::with_position(10.0, 20.0).to_json()),
            Some(PointObservation::new(10.0, 20.0))
        );
    }
}
