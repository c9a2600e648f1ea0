use crate::prelude::{TargetError, TargetResult};
use serde::{Deserialize, Serialize};

/// Fixed target layout shared by the scorer and the display.
///
/// Coordinates are in the same space as the incoming laser points (the
/// virtual 1024×768 canvas for the reference layout). Values are validated on
/// construction; deserialised geometry must go through [`TargetGeometry::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetGeometry {
    pub center_x: f64,
    pub center_y: f64,
    pub bull_radius: f64,
    pub target_radius: f64,
    pub ring_width: f64,
}

impl TargetGeometry {
    pub const REFERENCE_WIDTH: f64 = 1024.0;
    pub const REFERENCE_HEIGHT: f64 = 768.0;
    /// Finest layout accepted; anything denser is not a usable target face.
    pub const MAX_RINGS: u32 = 100;

    pub fn new(
        center_x: f64,
        center_y: f64,
        bull_radius: f64,
        target_radius: f64,
        ring_width: f64,
    ) -> TargetResult<Self> {
        let geometry = Self {
            center_x,
            center_y,
            bull_radius,
            target_radius,
            ring_width,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Ten-ring layout centred on the reference canvas.
    pub fn reference() -> Self {
        Self {
            center_x: Self::REFERENCE_WIDTH / 2.0,
            center_y: Self::REFERENCE_HEIGHT / 2.0,
            bull_radius: 30.0,
            target_radius: 200.0,
            ring_width: 19.0,
        }
    }

    pub fn validate(&self) -> TargetResult<()> {
        let values = [
            self.center_x,
            self.center_y,
            self.bull_radius,
            self.target_radius,
            self.ring_width,
        ];
        if values.iter().any(|value| !value.is_finite()) {
            return Err(TargetError::InvalidGeometry(
                "all dimensions must be finite".into(),
            ));
        }
        if self.ring_width <= 0.0 {
            return Err(TargetError::InvalidGeometry(format!(
                "ring width must be positive, got {}",
                self.ring_width
            )));
        }
        if self.bull_radius < 0.0 || self.bull_radius >= self.target_radius {
            return Err(TargetError::InvalidGeometry(format!(
                "bull radius {} must lie in [0, {})",
                self.bull_radius, self.target_radius
            )));
        }
        if self.ring_width > self.target_radius {
            return Err(TargetError::InvalidGeometry(format!(
                "ring width {} leaves no ring inside radius {}",
                self.ring_width, self.target_radius
            )));
        }
        if self.target_radius / self.ring_width >= f64::from(Self::MAX_RINGS + 1) {
            return Err(TargetError::InvalidGeometry(format!(
                "ring width {} gives more than {} rings inside radius {}",
                self.ring_width,
                Self::MAX_RINGS,
                self.target_radius
            )));
        }
        Ok(())
    }

    /// Number of whole rings that fit inside the target radius.
    pub fn ring_count(&self) -> u32 {
        (self.target_radius / self.ring_width).floor() as u32
    }

    /// Outer radius of `ring`, counting 1 as the outermost ring.
    pub fn ring_radius(&self, ring: u32) -> f64 {
        self.target_radius - f64::from(ring.saturating_sub(1)) * self.ring_width
    }
}

impl Default for TargetGeometry {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_geometry_has_ten_rings() {
        let geometry = TargetGeometry::reference();
        assert!(geometry.validate().is_ok());
        assert_eq!(geometry.ring_count(), 10);
        assert_eq!((geometry.center_x, geometry.center_y), (512.0, 384.0));
    }

    #[test]
    fn ring_radius_steps_inward() {
        let geometry = TargetGeometry::reference();
        assert_eq!(geometry.ring_radius(1), 200.0);
        assert_eq!(geometry.ring_radius(10), 200.0 - 9.0 * 19.0);
    }

    #[test]
    fn non_positive_ring_width_is_rejected() {
        let err = TargetGeometry::new(0.0, 0.0, 10.0, 100.0, 0.0).unwrap_err();
        assert!(matches!(err, TargetError::InvalidGeometry(_)));
        assert!(TargetGeometry::new(0.0, 0.0, 10.0, 100.0, -5.0).is_err());
    }

    #[test]
    fn bull_must_sit_inside_target() {
        assert!(TargetGeometry::new(0.0, 0.0, 100.0, 100.0, 10.0).is_err());
        assert!(TargetGeometry::new(0.0, 0.0, -1.0, 100.0, 10.0).is_err());
    }

    #[test]
    fn ring_count_is_capped() {
        assert!(TargetGeometry::new(0.0, 0.0, 10.0, 100.0, 0.0001).is_err());
        let finest = TargetGeometry::new(0.0, 0.0, 0.5, 100.0, 1.0).unwrap();
        assert_eq!(finest.ring_count(), TargetGeometry::MAX_RINGS);
        assert!(TargetGeometry::new(0.0, 0.0, 0.5, 101.0, 1.0).is_err());
    }

    #[test]
    fn non_finite_dimensions_are_rejected() {
        assert!(TargetGeometry::new(f64::NAN, 0.0, 10.0, 100.0, 10.0).is_err());
        assert!(TargetGeometry::new(0.0, 0.0, 10.0, f64::INFINITY, 10.0).is_err());
    }
}
