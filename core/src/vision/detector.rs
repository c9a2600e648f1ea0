use crate::prelude::{TargetError, TargetResult};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Grayscale camera frame indexed as `[row, column]`.
pub type GrayFrame = Array2<u8>;

/// Centroid of the detected laser blob, in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaserSpot {
    pub x: f64,
    pub y: f64,
    pub area: usize,
}

/// Finds the brightest sizeable blob in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserDetector {
    /// Pixels strictly brighter than this are laser candidates.
    pub threshold: u8,
    /// Blobs must cover more than this many pixels.
    pub min_area: usize,
}

impl Default for LaserDetector {
    fn default() -> Self {
        Self {
            threshold: 220,
            min_area: 5,
        }
    }
}

impl LaserDetector {
    pub fn new(threshold: u8, min_area: usize) -> Self {
        Self {
            threshold,
            min_area,
        }
    }

    /// Labels 8-connected bright regions and returns the centroid of the
    /// largest one that clears `min_area`.
    pub fn detect(&self, frame: ArrayView2<u8>) -> TargetResult<Option<LaserSpot>> {
        let (rows, cols) = frame.dim();
        if rows == 0 || cols == 0 {
            return Err(TargetError::InvalidFrame("frame has no pixels".into()));
        }

        let mut visited = Array2::<bool>::from_elem((rows, cols), false);
        let mut stack = Vec::new();
        let mut best: Option<LaserSpot> = None;

        for ((row, col), &value) in frame.indexed_iter() {
            if value <= self.threshold || visited[[row, col]] {
                continue;
            }

            visited[[row, col]] = true;
            stack.push((row, col));
            let (mut area, mut sum_x, mut sum_y) = (0usize, 0.0f64, 0.0f64);

            while let Some((r, c)) = stack.pop() {
                area += 1;
                sum_x += c as f64;
                sum_y += r as f64;

                for dr in -1i64..=1 {
                    for dc in -1i64..=1 {
                        if dr == 0 && dc == 0 {
                            continue;
                        }
                        let nr = r as i64 + dr;
                        let nc = c as i64 + dc;
                        if nr < 0 || nc < 0 || nr >= rows as i64 || nc >= cols as i64 {
                            continue;
                        }
                        let (nr, nc) = (nr as usize, nc as usize);
                        if !visited[[nr, nc]] && frame[[nr, nc]] > self.threshold {
                            visited[[nr, nc]] = true;
                            stack.push((nr, nc));
                        }
                    }
                }
            }

            let larger = best.map_or(true, |spot| area > spot.area);
            if area > self.min_area && larger {
                best = Some(LaserSpot {
                    x: sum_x / area as f64,
                    y: sum_y / area as f64,
                    area,
                });
            }
        }

        Ok(best)
    }
}
