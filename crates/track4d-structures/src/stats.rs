//! Summary statistics over per-sample errors or lengths.

use serde::{Deserialize, Serialize};

/// Summary of a list of non-negative magnitudes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorStats {
    /// Root mean square
    pub rmse: f32,

    /// Mean
    pub mean: f32,

    /// Standard deviation
    pub std: f32,

    /// Minimum
    pub min: f32,

    /// Maximum
    pub max: f32,

    /// Median
    pub median: f32,

    /// Number of samples
    pub count: usize,
}

impl ErrorStats {
    /// Compute statistics from a list of values.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_values(values: &[f32]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let count = values.len();
        let n = count as f32;

        let mean = values.iter().sum::<f32>() / n;
        let rmse = (values.iter().map(|e| e * e).sum::<f32>() / n).sqrt();
        let std = (values.iter().map(|e| (e - mean).powi(2)).sum::<f32>() / n).sqrt();

        let min = values.iter().copied().fold(f32::INFINITY, f32::min);
        let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        let mut sorted = values.to_vec();
        sorted.sort_by(f32::total_cmp);
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        Self {
            rmse,
            mean,
            std,
            min,
            max,
            median,
            count,
        }
    }

    /// Format as a single-line summary.
    pub fn summary(&self) -> String {
        format!(
            "rmse: {:.4}, mean: {:.4}, std: {:.4}, min: {:.4}, max: {:.4}, n: {}",
            self.rmse, self.mean, self.std, self.min, self.max, self.count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(ErrorStats::from_values(&[]), ErrorStats::default());
    }

    #[test]
    fn test_basic_stats() {
        let stats = ErrorStats::from_values(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(stats.count, 4);
        assert!((stats.mean - 2.5).abs() < 1e-6);
        assert!((stats.median - 2.5).abs() < 1e-6);
        assert!((stats.min - 1.0).abs() < 1e-6);
        assert!((stats.max - 4.0).abs() < 1e-6);
        assert!((stats.rmse - 7.5f32.sqrt()).abs() < 1e-5);
    }
}
