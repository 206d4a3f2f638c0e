//! Frequency tests over equal-width intervals: chi-square and
//! Kolmogorov-Smirnov.
//!
//! Both tests share [`IntervalGrid`]: `k` intervals spanning the observed
//! `[min, max]`. The first interval is closed `[lo, hi]`, every later one is
//! half-open `(lo, hi]`, so a value on an inner boundary is counted in the
//! interval that boundary closes.

use serde::Serialize;

use crate::suite::{ParameterShape, RandomnessTest, TestParameters};
use crate::{
    Statistics, TestError, TestKind, TestVerdict, chi_square_quantile, ks_critical_value,
    validate_alpha, validate_intervals, validate_sample,
};

/// Interval count used when a config enables a frequency test without `k`.
pub const DEFAULT_INTERVALS: usize = 10;

// ═══════════════════════════════════════════════════════════════════════════════
// Interval grid
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct IntervalGrid {
    minimum: f64,
    maximum: f64,
    amplitude: f64,
    /// `k + 1` edges; the last is exactly `maximum`.
    edges: Vec<f64>,
}

impl IntervalGrid {
    /// `k >= 1` intervals of width `(maximum - minimum) / k`.
    pub fn new(minimum: f64, maximum: f64, k: usize) -> Result<Self, TestError> {
        if k == 0 {
            return Err(TestError::InvalidParameter {
                parameter: "k",
                reason: "an interval grid needs at least one interval".to_string(),
            });
        }
        if !(minimum.is_finite() && maximum.is_finite() && minimum <= maximum) {
            return Err(TestError::InvalidParameter {
                parameter: "range",
                reason: format!("[{minimum}, {maximum}] is not a finite interval"),
            });
        }
        let amplitude = (maximum - minimum) / k as f64;
        let mut edges: Vec<f64> = (0..k).map(|i| minimum + i as f64 * amplitude).collect();
        edges.push(maximum);
        Ok(Self {
            minimum,
            maximum,
            amplitude,
            edges,
        })
    }

    /// Grid over the range of `values`; empty input has no range and is rejected.
    pub fn spanning(values: &[f64], k: usize) -> Result<Self, TestError> {
        let (lo, hi) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        Self::new(lo, hi, k)
    }

    pub fn len(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// `(start, end)` of interval `i`.
    pub fn bounds(&self, i: usize) -> (f64, f64) {
        (self.edges[i], self.edges[i + 1])
    }

    /// Index of the interval containing `x`.
    pub fn locate(&self, x: f64) -> usize {
        let above = self.edges[1..].partition_point(|&edge| edge < x);
        above.min(self.len() - 1)
    }

    /// Observed count per interval.
    pub fn frequencies(&self, values: &[f64]) -> Vec<usize> {
        let mut counts = vec![0usize; self.len()];
        for &v in values {
            counts[self.locate(v)] += 1;
        }
        counts
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Chi-square test
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiSquareInterval {
    /// 1-based interval number.
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub observed: usize,
    pub expected: f64,
    /// `(O - E)² / E`.
    pub chi2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiSquareStatistics {
    pub intervals: usize,
    pub degrees_of_freedom: usize,
    pub minimum: f64,
    pub maximum: f64,
    pub chi2: f64,
    /// `χ²(1 - alpha, k - 1)`.
    pub critical_value: f64,
    pub table: Vec<ChiSquareInterval>,
}

/// Chi-square goodness of fit to a uniform distribution over `k` intervals.
///
/// Approved iff the statistic does not exceed `χ²(1-alpha, k-1)`.
pub fn chi_square_test(values: &[f64], k: usize, alpha: f64) -> Result<TestVerdict, TestError> {
    validate_alpha(alpha)?;
    validate_intervals(TestKind::ChiSquare, k)?;
    validate_sample(TestKind::ChiSquare, values, 1)?;

    let n = values.len();
    let grid = IntervalGrid::spanning(values, k)?;
    let observed = grid.frequencies(values);
    let expected = n as f64 / k as f64;

    let table: Vec<ChiSquareInterval> = observed
        .iter()
        .enumerate()
        .map(|(i, &o)| {
            let (start, end) = grid.bounds(i);
            let diff = o as f64 - expected;
            ChiSquareInterval {
                index: i + 1,
                start,
                end,
                observed: o,
                expected,
                chi2: diff * diff / expected,
            }
        })
        .collect();

    let chi2: f64 = table.iter().map(|row| row.chi2).sum();
    let critical_value = chi_square_quantile(1.0 - alpha, (k - 1) as f64)?;
    let stats = ChiSquareStatistics {
        intervals: k,
        degrees_of_freedom: k - 1,
        minimum: grid.minimum(),
        maximum: grid.maximum(),
        chi2,
        critical_value,
        table,
    };

    if expected <= 0.0 || !chi2.is_finite() {
        return Ok(TestVerdict::not_applicable(
            TestKind::ChiSquare,
            n,
            alpha,
            "an interval has zero expected frequency",
            Statistics::ChiSquare(stats),
        ));
    }

    Ok(TestVerdict::decided(
        TestKind::ChiSquare,
        n,
        alpha,
        chi2 <= critical_value,
        Statistics::ChiSquare(stats),
    ))
}

/// Chi-square uniformity test; the interval count comes from the config.
#[derive(Debug, Clone, Copy)]
pub struct ChiSquareTest;

impl RandomnessTest for ChiSquareTest {
    fn kind(&self) -> TestKind {
        TestKind::ChiSquare
    }

    fn parameter_shape(&self) -> ParameterShape {
        ParameterShape::IntervalCount {
            default: DEFAULT_INTERVALS,
        }
    }

    fn run(
        &self,
        values: &[f64],
        alpha: f64,
        params: TestParameters,
    ) -> Result<TestVerdict, TestError> {
        chi_square_test(values, params.intervals(DEFAULT_INTERVALS), alpha)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Kolmogorov-Smirnov test
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KsInterval {
    /// 1-based interval number.
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub observed: usize,
    pub cumulative_observed: usize,
    /// `cumulative_observed / n`.
    pub observed_probability: f64,
    /// `i * n / k`.
    pub cumulative_expected: f64,
    /// `i / k`.
    pub expected_probability: f64,
    /// `|observed_probability - expected_probability|`.
    pub difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KsStatistics {
    pub intervals: usize,
    pub minimum: f64,
    pub maximum: f64,
    pub amplitude: f64,
    /// `D = max |F_obs - F_exp|` over interval ends.
    pub max_difference: f64,
    pub critical_value: f64,
    pub table: Vec<KsInterval>,
}

/// Kolmogorov-Smirnov test on the interval-grouped empirical CDF.
///
/// Approved iff `D` does not exceed `c(alpha) / sqrt(n)`.
pub fn kolmogorov_smirnov_test(
    values: &[f64],
    k: usize,
    alpha: f64,
) -> Result<TestVerdict, TestError> {
    validate_alpha(alpha)?;
    validate_intervals(TestKind::Kolmogorov, k)?;
    validate_sample(TestKind::Kolmogorov, values, 1)?;

    let n = values.len();
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let grid = IntervalGrid::new(sorted[0], sorted[n - 1], k)?;
    let observed = grid.frequencies(&sorted);

    let mut cumulative = 0usize;
    let table: Vec<KsInterval> = observed
        .iter()
        .enumerate()
        .map(|(i, &o)| {
            cumulative += o;
            let (start, end) = grid.bounds(i);
            let observed_probability = cumulative as f64 / n as f64;
            let expected_probability = (i + 1) as f64 / k as f64;
            KsInterval {
                index: i + 1,
                start,
                end,
                observed: o,
                cumulative_observed: cumulative,
                observed_probability,
                cumulative_expected: (i + 1) as f64 * n as f64 / k as f64,
                expected_probability,
                difference: (observed_probability - expected_probability).abs(),
            }
        })
        .collect();

    let max_difference = table.iter().map(|row| row.difference).fold(0.0, f64::max);
    let critical_value = ks_critical_value(n, alpha);

    Ok(TestVerdict::decided(
        TestKind::Kolmogorov,
        n,
        alpha,
        max_difference <= critical_value,
        Statistics::Kolmogorov(KsStatistics {
            intervals: k,
            minimum: grid.minimum(),
            maximum: grid.maximum(),
            amplitude: grid.amplitude(),
            max_difference,
            critical_value,
            table,
        }),
    ))
}

/// Kolmogorov-Smirnov test; the interval count comes from the config.
#[derive(Debug, Clone, Copy)]
pub struct KolmogorovTest;

impl RandomnessTest for KolmogorovTest {
    fn kind(&self) -> TestKind {
        TestKind::Kolmogorov
    }

    fn parameter_shape(&self) -> ParameterShape {
        ParameterShape::IntervalCount {
            default: DEFAULT_INTERVALS,
        }
    }

    fn run(
        &self,
        values: &[f64],
        alpha: f64,
        params: TestParameters,
    ) -> Result<TestVerdict, TestError> {
        kolmogorov_smirnov_test(values, params.intervals(DEFAULT_INTERVALS), alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Outcome;
    use approx::assert_abs_diff_eq;

    fn grid(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 / n as f64).collect()
    }

    // -----------------------------------------------------------------------
    // IntervalGrid
    // -----------------------------------------------------------------------

    #[test]
    fn test_grid_last_edge_is_maximum() {
        let g = IntervalGrid::new(0.1, 0.7, 3).unwrap();
        assert_eq!(g.len(), 3);
        assert_eq!(g.bounds(2).1, 0.7);
        assert_eq!(g.bounds(0).0, 0.1);
    }

    #[test]
    fn test_grid_boundary_goes_to_interval_it_closes() {
        let g = IntervalGrid::new(0.0, 1.0, 2).unwrap();
        assert_eq!(g.locate(0.0), 0);
        assert_eq!(g.locate(0.25), 0);
        assert_eq!(g.locate(0.5), 0);
        assert_eq!(g.locate(0.75), 1);
        assert_eq!(g.locate(1.0), 1);
        assert_eq!(g.frequencies(&[0.0, 0.5, 1.0]), vec![2, 1]);
    }

    #[test]
    fn test_grid_constant_values_land_in_first_interval() {
        let g = IntervalGrid::spanning(&[0.3, 0.3, 0.3], 4).unwrap();
        assert_eq!(g.amplitude(), 0.0);
        assert_eq!(g.frequencies(&[0.3, 0.3, 0.3]), vec![3, 0, 0, 0]);
    }

    #[test]
    fn test_grid_rejects_zero_intervals_and_empty_range() {
        assert!(matches!(
            IntervalGrid::new(0.0, 1.0, 0),
            Err(TestError::InvalidParameter { parameter: "k", .. })
        ));
        assert!(matches!(
            IntervalGrid::spanning(&[], 4),
            Err(TestError::InvalidParameter { parameter: "range", .. })
        ));
        assert!(IntervalGrid::new(1.0, 0.0, 4).is_err());
        let single = IntervalGrid::new(0.0, 1.0, 1).unwrap();
        assert_eq!(single.locate(0.5), 0);
        assert_eq!(single.frequencies(&[0.0, 0.5, 1.0]), vec![3]);
    }

    #[test]
    fn test_grid_counts_sum_to_n() {
        let values = grid(997);
        let g = IntervalGrid::spanning(&values, 7).unwrap();
        assert_eq!(g.frequencies(&values).iter().sum::<usize>(), 997);
    }

    // -----------------------------------------------------------------------
    // Chi-square
    // -----------------------------------------------------------------------

    #[test]
    fn test_chi_square_even_spread_is_approved() {
        let values: Vec<f64> = (0..10_000).map(|i| i as f64 / 10_000.0).collect();
        let v = chi_square_test(&values, 10, 0.05).unwrap();
        assert!(v.approved);
        let Statistics::ChiSquare(s) = &v.statistics else {
            panic!("wrong statistics variant");
        };
        assert_eq!(s.degrees_of_freedom, 9);
        assert_eq!(s.table.len(), 10);
        assert_eq!(s.table.iter().map(|r| r.observed).sum::<usize>(), 10_000);
        assert!(s.chi2 < 0.01, "chi2 = {}", s.chi2);
        assert_abs_diff_eq!(s.critical_value, 16.919, epsilon = 1e-2);
    }

    #[test]
    fn test_chi_square_clustered_is_rejected() {
        let mut values = vec![0.05; 90];
        values.extend(grid(10));
        let v = chi_square_test(&values, 5, 0.05).unwrap();
        assert_eq!(v.outcome, Outcome::Rejected);
        assert_eq!(v.bounds().0, None);
    }

    #[test]
    fn test_chi_square_rejects_single_interval() {
        assert_eq!(
            chi_square_test(&grid(10), 1, 0.05),
            Err(TestError::InvalidIntervalCount {
                test: TestKind::ChiSquare,
                k: 1
            })
        );
    }

    #[test]
    fn test_chi_square_empty_input() {
        assert!(matches!(
            chi_square_test(&[], 10, 0.05),
            Err(TestError::InsufficientSample { got: 0, .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Kolmogorov-Smirnov
    // -----------------------------------------------------------------------

    #[test]
    fn test_ks_even_spread_is_approved() {
        let v = kolmogorov_smirnov_test(&grid(1000), 10, 0.05).unwrap();
        assert!(v.approved);
        let Statistics::Kolmogorov(s) = &v.statistics else {
            panic!("wrong statistics variant");
        };
        assert_abs_diff_eq!(s.critical_value, 1.358 / 1000f64.sqrt(), epsilon = 1e-12);
        assert!(s.max_difference < s.critical_value);
        let last = s.table.last().unwrap();
        assert_eq!(last.cumulative_observed, 1000);
        assert_abs_diff_eq!(last.observed_probability, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(last.difference, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ks_boundary_value_counts_once() {
        let v = kolmogorov_smirnov_test(&[0.0, 0.5, 1.0], 2, 0.05).unwrap();
        let Statistics::Kolmogorov(s) = &v.statistics else {
            panic!("wrong statistics variant");
        };
        let counts: Vec<usize> = s.table.iter().map(|r| r.observed).collect();
        assert_eq!(counts, vec![2, 1]);
        // |2/3 - 1/2|
        assert_abs_diff_eq!(s.max_difference, 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ks_rejects_single_interval() {
        assert_eq!(
            kolmogorov_smirnov_test(&grid(10), 1, 0.05),
            Err(TestError::InvalidIntervalCount {
                test: TestKind::Kolmogorov,
                k: 1
            })
        );
        assert!(matches!(
            kolmogorov_smirnov_test(&grid(10), 0, 0.05),
            Err(TestError::InvalidIntervalCount { k: 0, .. })
        ));
    }

    #[test]
    fn test_ks_skewed_is_rejected() {
        let values: Vec<f64> = grid(1000).iter().map(|x| x * x).collect();
        let v = kolmogorov_smirnov_test(&values, 10, 0.05).unwrap();
        assert!(!v.approved);
        assert!(v.statistic().unwrap() > 0.1);
    }

    #[test]
    fn test_ks_input_order_does_not_matter() {
        let forward = grid(200);
        let mut backward = forward.clone();
        backward.reverse();
        assert_eq!(
            kolmogorov_smirnov_test(&forward, 8, 0.05).unwrap(),
            kolmogorov_smirnov_test(&backward, 8, 0.05).unwrap()
        );
    }
}
