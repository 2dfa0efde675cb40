//! Statistics Calculator Module
//! Histogram binning and box-plot summaries.

use statrs::statistics::Statistics;

/// Whisker fence multiplier for box plots.
pub const IQR_FENCE: f64 = 1.5;

/// One histogram bucket. Covers `[lower, upper)`, except the last bucket,
/// which also includes `upper`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Box-plot summary of a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
    pub iqr: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    /// Most extreme values still inside the fences.
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

pub struct StatsCalculator;

impl StatsCalculator {
    /// Bin `values` into `bin_count` equal-width buckets over their observed
    /// range. Non-finite values are not counted. Returns no buckets when
    /// nothing finite remains or for a zero bin count.
    pub fn histogram(values: &[f64], bin_count: usize) -> Vec<HistogramBin> {
        let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if values.is_empty() || bin_count == 0 {
            return Vec::new();
        }

        let (mut lo, mut hi) = (values.as_slice().min(), values.as_slice().max());
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }
        // edges and offsets avoid `hi - lo`, which overflows for extreme ranges
        let n = bin_count as f64;
        let width = hi / n - lo / n;
        let edge = |i: usize| {
            let t = i as f64 / n;
            lo * (1.0 - t) + hi * t
        };

        let mut bins: Vec<HistogramBin> = (0..bin_count)
            .map(|i| HistogramBin {
                lower: edge(i),
                upper: if i + 1 == bin_count { hi } else { edge(i + 1) },
                count: 0,
            })
            .collect();

        for &v in &values {
            let offset = (v / width - lo / width).max(0.0);
            let idx = (offset.floor() as usize).min(bin_count - 1);
            // rounding can push a value sitting on an edge into a neighbour
            let idx = if idx > 0 && v < bins[idx].lower {
                idx - 1
            } else if idx + 1 < bin_count && v >= bins[idx].upper {
                idx + 1
            } else {
                idx
            };
            bins[idx].count += 1;
        }

        bins
    }

    /// Summary statistics with 1.5 x IQR fences. `None` for empty input.
    pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let q1 = Self::percentile(&sorted, 25.0);
        let median = Self::percentile(&sorted, 50.0);
        let q3 = Self::percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let lower_fence = q1 - IQR_FENCE * iqr;
        let upper_fence = q3 + IQR_FENCE * iqr;

        let whisker_low = sorted
            .iter()
            .copied()
            .find(|&v| v >= lower_fence)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= upper_fence)
            .unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < lower_fence || v > upper_fence)
            .collect();

        Some(BoxStats {
            count: sorted.len(),
            min: sorted[0],
            q1,
            median,
            q3,
            max: sorted[sorted.len() - 1],
            mean: values.mean(),
            iqr,
            lower_fence,
            upper_fence,
            whisker_low,
            whisker_high,
            outliers,
        })
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts_sum_to_len() {
        let values: Vec<f64> = (0..97).map(|i| (i as f64 * 0.37).sin() * 12.0).collect();
        for bins in [5, 7, 20, 50] {
            let hist = StatsCalculator::histogram(&values, bins);
            assert_eq!(hist.len(), bins);
            assert_eq!(hist.iter().map(|b| b.count).sum::<usize>(), values.len());
        }
    }

    #[test]
    fn test_histogram_edges_half_open_last_closed() {
        // range 0..4 in 4 buckets: [0,1) [1,2) [2,3) [3,4]
        let hist = StatsCalculator::histogram(&[0.0, 1.0, 2.0, 3.0, 4.0], 4);
        let counts: Vec<usize> = hist.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 1, 2]);
        assert_eq!(hist[0].lower, 0.0);
        assert_eq!(hist[3].upper, 4.0);
    }

    #[test]
    fn test_histogram_constant_column() {
        let hist = StatsCalculator::histogram(&[2.0, 2.0, 2.0], 5);
        assert_eq!(hist.iter().map(|b| b.count).sum::<usize>(), 3);
        assert_eq!(hist[2].count, 3);
        assert!((hist[0].lower - 1.5).abs() < 1e-12);
        assert!((hist[4].upper - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_skips_non_finite() {
        let hist = StatsCalculator::histogram(&[1.0, 2.0, f64::INFINITY, f64::NAN], 4);
        assert_eq!(hist.iter().map(|b| b.count).sum::<usize>(), 2);
        assert_eq!(hist[0].lower, 1.0);
        assert_eq!(hist[3].upper, 2.0);
        assert!(StatsCalculator::histogram(&[f64::NEG_INFINITY], 4).is_empty());
    }

    #[test]
    fn test_histogram_extreme_range_stays_finite() {
        let hist = StatsCalculator::histogram(&[-f64::MAX, 0.0, f64::MAX], 5);
        assert!(hist.iter().all(|b| b.lower.is_finite() && b.upper.is_finite()));
        assert_eq!(hist.iter().map(|b| b.count).sum::<usize>(), 3);
        assert_eq!(hist[0].count, 1);
        assert_eq!(hist[4].count, 1);
    }

    #[test]
    fn test_histogram_empty() {
        assert!(StatsCalculator::histogram(&[], 10).is_empty());
    }

    #[test]
    fn test_box_stats_one_to_five() {
        let stats = StatsCalculator::box_stats(&[5.0, 3.0, 1.0, 4.0, 2.0]).unwrap();
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.iqr, 2.0);
        assert_eq!(stats.lower_fence, -1.0);
        assert_eq!(stats.upper_fence, 7.0);
        assert!(stats.outliers.is_empty());
        assert_eq!(stats.mean, 3.0);
    }

    #[test]
    fn test_box_stats_outliers() {
        let stats = StatsCalculator::box_stats(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_eq!(stats.outliers, vec![100.0]);
        assert_eq!(stats.whisker_high, 5.0);
        assert_eq!(stats.whisker_low, 1.0);
    }

    #[test]
    fn test_median_between_quartiles() {
        let samples: [&[f64]; 4] = [
            &[7.0],
            &[3.0, -1.0],
            &[0.1, 9.0, 4.4, 4.4, -2.0],
            &[10.0, 1.0, 1.0, 1.0, 1.0, 50.0, 2.0],
        ];
        for values in samples {
            let stats = StatsCalculator::box_stats(values).unwrap();
            assert!(stats.q1 <= stats.median && stats.median <= stats.q3);
        }
    }

    #[test]
    fn test_box_stats_empty() {
        assert!(StatsCalculator::box_stats(&[]).is_none());
    }
}
