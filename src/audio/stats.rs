use serde::Serialize;

/// A standard deviation at or below this is reported as exactly zero. Constant
/// sequences leave rounding residue in the mean, and dividing by its powers
/// would turn that residue into huge skewness/kurtosis values.
const MIN_STDDEV: f64 = 1e-12;

/// Four-moment summary over a sequence of bucket RMS values.
///
/// `None` means the value is undefined for this input: everything but `count`
/// is unavailable for an empty sequence, variance/stddev need two values, and
/// skewness/kurtosis need a non-zero stddev.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    /// Sample variance (Bessel-corrected)
    pub variance: Option<f64>,
    pub stddev: Option<f64>,
    pub skewness: Option<f64>,
    /// Excess kurtosis (normal distribution = 0)
    pub kurtosis: Option<f64>,
}

impl SummaryStats {
    pub fn compute(values: &[f64]) -> Self {
        let Some((&first, rest)) = values.split_first() else {
            return Self::default();
        };

        let n = values.len();
        let (min, max) = rest
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let mean = values.iter().sum::<f64>() / n as f64;

        let mut m2 = 0.0f64;
        let mut m3 = 0.0f64;
        let mut m4 = 0.0f64;
        for &v in values {
            let d = v - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }

        let mut variance = (n >= 2).then(|| m2 / (n - 1) as f64);
        let mut stddev = variance.map(f64::sqrt);
        if stddev.is_some_and(|s| s <= MIN_STDDEV) {
            variance = Some(0.0);
            stddev = Some(0.0);
        }
        let spread = stddev.filter(|&s| s > 0.0);
        let skewness = spread.map(|s| m3 / (n as f64 * s.powi(3)));
        let kurtosis = spread.map(|s| m4 / (n as f64 * s.powi(4)) - 3.0);

        Self {
            count: n,
            min: Some(min),
            max: Some(max),
            mean: Some(mean),
            variance,
            stddev,
            skewness,
            kurtosis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: Option<f64>, expected: f64) -> bool {
        actual.is_some_and(|a| (a - expected).abs() < 1e-9)
    }

    #[test]
    fn symmetric_sequence() {
        let stats = SummaryStats::compute(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(stats.count, 5);
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(5.0));
        assert!(close(stats.mean, 3.0));
        assert!(close(stats.variance, 2.5));
        assert!(close(stats.stddev, 2.5f64.sqrt()));
        assert!(close(stats.skewness, 0.0));
        // 34 / (5 * 6.25) - 3
        assert!(close(stats.kurtosis, -1.912));
    }

    #[test]
    fn right_skewed_sequence() {
        let stats = SummaryStats::compute(&[1.0, 1.0, 1.0, 5.0]);
        assert!(close(stats.mean, 2.0));
        assert!(close(stats.variance, 4.0));
        assert!(close(stats.stddev, 2.0));
        assert!(close(stats.skewness, 0.75));
        assert!(close(stats.kurtosis, -1.6875));
    }

    #[test]
    fn empty_sequence_has_nothing_defined() {
        let stats = SummaryStats::compute(&[]);
        assert_eq!(stats, SummaryStats::default());
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_none());
        assert!(stats.min.is_none());
    }

    #[test]
    fn single_value_has_no_spread() {
        let stats = SummaryStats::compute(&[0.4]);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, Some(0.4));
        assert_eq!(stats.min, Some(0.4));
        assert_eq!(stats.max, Some(0.4));
        assert!(stats.variance.is_none());
        assert!(stats.stddev.is_none());
        assert!(stats.skewness.is_none());
        assert!(stats.kurtosis.is_none());
    }

    #[test]
    fn zero_spread_leaves_higher_moments_undefined() {
        let stats = SummaryStats::compute(&[0.0, 0.0]);
        assert_eq!(stats.variance, Some(0.0));
        assert_eq!(stats.stddev, Some(0.0));
        assert!(stats.skewness.is_none());
        assert!(stats.kurtosis.is_none());
    }

    #[test]
    fn constant_non_zero_sequence_is_zero_spread() {
        let stats = SummaryStats::compute(&[0.1; 7]);
        assert_eq!(stats.stddev, Some(0.0));
        assert_eq!(stats.variance, Some(0.0));
        assert!(stats.skewness.is_none());
        assert!(stats.kurtosis.is_none());
    }

    #[test]
    fn negligible_spread_reports_zero_stddev() {
        let stats = SummaryStats::compute(&[0.0, 0.0, 3e-13]);
        assert_eq!(stats.stddev, Some(0.0));
        assert_eq!(stats.variance, Some(0.0));
        assert!(stats.skewness.is_none());
        assert!(stats.kurtosis.is_none());
    }

    #[test]
    fn min_max_track_from_first_value() {
        let stats = SummaryStats::compute(&[250_000.0, 120_000.0, 400_000.0]);
        assert_eq!(stats.min, Some(120_000.0));
        assert_eq!(stats.max, Some(400_000.0));

        let stats = SummaryStats::compute(&[0.0, 0.0, 0.0]);
        assert_eq!(stats.max, Some(0.0));
    }
}
