use lasercore::vision::GrayFrame;
use rand::{rngs::StdRng, Rng};

/// Paints a noisy dark background with an optional saturated laser dot.
pub fn render_frame(
    rng: &mut StdRng,
    width: usize,
    height: usize,
    background: u8,
    noise: u8,
    spot: Option<(f64, f64)>,
    spot_radius: f64,
) -> GrayFrame {
    let mut frame = GrayFrame::from_shape_fn((height, width), |_| {
        background.saturating_add(rng.gen_range(0..=noise))
    });

    if let Some((spot_x, spot_y)) = spot {
        let reach = spot_radius.ceil() as i64;
        let (cx, cy) = (spot_x.round() as i64, spot_y.round() as i64);
        for row in (cy - reach)..=(cy + reach) {
            for col in (cx - reach)..=(cx + reach) {
                if row < 0 || col < 0 || row >= height as i64 || col >= width as i64 {
                    continue;
                }
                let dx = col as f64 - spot_x;
                let dy = row as f64 - spot_y;
                if dx * dx + dy * dy <= spot_radius * spot_radius {
                    frame[[row as usize, col as usize]] = 255;
                }
            }
        }
    }

    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn background_stays_below_detection_threshold() {
        let mut rng = StdRng::seed_from_u64(3);
        let frame = render_frame(&mut rng, 64, 48, 40, 12, None, 3.0);
        assert_eq!(frame.dim(), (48, 64));
        assert!(frame.iter().all(|&value| (40..=52).contains(&value)));
    }

    #[test]
    fn spot_is_saturated_disc() {
        let mut rng = StdRng::seed_from_u64(3);
        let frame = render_frame(&mut rng, 64, 48, 40, 12, Some((20.0, 10.0)), 3.0);
        assert_eq!(frame[[10, 20]], 255);
        assert_eq!(frame[[10, 23]], 255);
        assert_ne!(frame[[10, 24]], 255);
    }
}
