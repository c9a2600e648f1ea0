pub struct StatsHelper;

impl StatsHelper {
    /// Euclidean distance between two points.
    pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
        (x2 - x1).hypot(y2 - y1)
    }

    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric() {
        assert_eq!(StatsHelper::distance(0.0, 0.0, 3.0, 4.0), 5.0);
        assert_eq!(StatsHelper::distance(3.0, 4.0, 0.0, 0.0), 5.0);
    }

    #[test]
    fn mean_of_empty_sequence_is_zero() {
        assert_eq!(StatsHelper::mean(&[]), 0.0);
        assert_eq!(StatsHelper::mean(&[2.0, 4.0]), 3.0);
    }
}
