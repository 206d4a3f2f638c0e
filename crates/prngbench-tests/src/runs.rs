//! Runs test above and below a median.
//!
//! Each value is labelled `+` when it is at or above the theoretical median
//! and `-` otherwise; a run is a maximal block of equal labels. The number of
//! runs is compared with its expectation under independence using a normal
//! approximation.

use serde::Serialize;

use crate::suite::{RandomnessTest, TestParameters};
use crate::{
    Statistics, TestError, TestKind, TestVerdict, median, normal_quantile, validate_alpha,
    validate_sample,
};

/// Median of U(0, 1).
pub const THEORETICAL_MEDIAN: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunsStatistics {
    pub theoretical_median: f64,
    /// Informational only; labels use the theoretical median.
    pub sample_median: f64,
    /// Values at or above the median.
    pub positives: usize,
    pub negatives: usize,
    pub total: usize,
    pub runs: usize,
    /// `2ab/n + 1`; absent when one side is empty.
    pub expected_runs: Option<f64>,
    /// `2ab(2ab - n) / (n²(n - 1))`; absent when one side is empty.
    pub variance: Option<f64>,
    /// `(R - E) / sqrt(Var)`; absent when the test is not applicable.
    pub z: Option<f64>,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Number of maximal blocks of equal labels.
pub fn count_runs(labels: &[bool]) -> usize {
    if labels.is_empty() {
        return 0;
    }
    1 + labels.windows(2).filter(|w| w[0] != w[1]).count()
}

/// Runs test against `median`.
///
/// Not applicable when every value falls on one side of the median, or when
/// the runs variance is not positive.
pub fn runs_test(values: &[f64], alpha: f64, median_value: f64) -> Result<TestVerdict, TestError> {
    validate_alpha(alpha)?;
    validate_sample(TestKind::Runs, values, 1)?;
    if !median_value.is_finite() {
        return Err(TestError::InvalidParameter {
            parameter: "median",
            reason: format!("must be finite, got {median_value}"),
        });
    }

    let n = values.len();
    let labels: Vec<bool> = values.iter().map(|&v| v >= median_value).collect();
    let positives = labels.iter().filter(|&&above| above).count();
    let negatives = n - positives;
    let runs = count_runs(&labels);
    let z_crit = normal_quantile(1.0 - alpha / 2.0);

    let mut stats = RunsStatistics {
        theoretical_median: median_value,
        sample_median: median(values),
        positives,
        negatives,
        total: n,
        runs,
        expected_runs: None,
        variance: None,
        z: None,
        lower_bound: -z_crit,
        upper_bound: z_crit,
    };

    if positives == 0 || negatives == 0 {
        return Ok(TestVerdict::not_applicable(
            TestKind::Runs,
            n,
            alpha,
            "all values fall on one side of the median",
            Statistics::Runs(stats),
        ));
    }

    let (a, b, nf) = (positives as f64, negatives as f64, n as f64);
    let expected = 2.0 * a * b / nf + 1.0;
    let variance = 2.0 * a * b * (2.0 * a * b - nf) / (nf * nf * (nf - 1.0));
    stats.expected_runs = Some(expected);
    stats.variance = Some(variance);

    if !variance.is_finite() || variance <= 0.0 {
        return Ok(TestVerdict::not_applicable(
            TestKind::Runs,
            n,
            alpha,
            "the runs variance is not positive",
            Statistics::Runs(stats),
        ));
    }

    let z = (runs as f64 - expected) / variance.sqrt();
    stats.z = Some(z);
    let approved = -z_crit <= z && z <= z_crit;

    Ok(TestVerdict::decided(
        TestKind::Runs,
        n,
        alpha,
        approved,
        Statistics::Runs(stats),
    ))
}

/// Runs test against a fixed median.
#[derive(Debug, Clone, Copy)]
pub struct RunsTest {
    pub median: f64,
}

impl RandomnessTest for RunsTest {
    fn kind(&self) -> TestKind {
        TestKind::Runs
    }

    fn run(
        &self,
        values: &[f64],
        alpha: f64,
        _params: TestParameters,
    ) -> Result<TestVerdict, TestError> {
        runs_test(values, alpha, self.median)
    }
}
