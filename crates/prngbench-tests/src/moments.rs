//! Moment tests: does the sample mean and variance match U(0, 1)?

use serde::Serialize;

use crate::suite::{RandomnessTest, TestParameters};
use crate::{
    Statistics, TestError, TestKind, TestVerdict, chi_square_quantile, mean, normal_quantile,
    sample_variance, validate_alpha, validate_sample,
};

/// Mean of U(0, 1).
pub const EXPECTED_MEAN: f64 = 0.5;
/// Variance of U(0, 1).
pub const EXPECTED_VARIANCE: f64 = 1.0 / 12.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanStatistics {
    pub sample_mean: f64,
    pub expected_mean: f64,
    /// `z(1 - alpha/2)`.
    pub z: f64,
    /// Half-width of the acceptance interval, `z * sqrt(1 / 12n)`.
    pub error: f64,
    pub lower_limit: f64,
    pub upper_limit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceStatistics {
    pub sample_mean: f64,
    pub sample_variance: f64,
    pub expected_variance: f64,
    pub degrees_of_freedom: usize,
    /// `χ²(alpha/2, n-1)`.
    pub chi2_lower: f64,
    /// `χ²(1 - alpha/2, n-1)`.
    pub chi2_upper: f64,
    pub lower_limit: f64,
    pub upper_limit: f64,
    /// `(n-1) * s² / σ²`.
    pub chi2: f64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Means test
// ═══════════════════════════════════════════════════════════════════════════════

/// Two-sided z-test on the sample mean.
///
/// Approved iff the mean lies inside `expected_mean ± z(1-alpha/2)·sqrt(1/12n)`,
/// bounds included.
pub fn means_test(
    values: &[f64],
    alpha: f64,
    expected_mean: f64,
) -> Result<TestVerdict, TestError> {
    validate_alpha(alpha)?;
    validate_sample(TestKind::Means, values, 2)?;
    if !expected_mean.is_finite() {
        return Err(TestError::InvalidParameter {
            parameter: "expected_mean",
            reason: format!("must be finite, got {expected_mean}"),
        });
    }

    let n = values.len();
    let sample_mean = mean(values);
    let z = normal_quantile(1.0 - alpha / 2.0);
    let error = z * (1.0 / (12.0 * n as f64)).sqrt();
    let lower_limit = expected_mean - error;
    let upper_limit = expected_mean + error;
    let approved = lower_limit <= sample_mean && sample_mean <= upper_limit;

    Ok(TestVerdict::decided(
        TestKind::Means,
        n,
        alpha,
        approved,
        Statistics::Means(MeanStatistics {
            sample_mean,
            expected_mean,
            z,
            error,
            lower_limit,
            upper_limit,
        }),
    ))
}

/// Means test against a fixed expected mean.
#[derive(Debug, Clone, Copy)]
pub struct MeansTest {
    pub expected_mean: f64,
}

impl RandomnessTest for MeansTest {
    fn kind(&self) -> TestKind {
        TestKind::Means
    }

    fn min_sample_size(&self) -> usize {
        2
    }

    fn run(
        &self,
        values: &[f64],
        alpha: f64,
        _params: TestParameters,
    ) -> Result<TestVerdict, TestError> {
        means_test(values, alpha, self.expected_mean)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Variance test
// ═══════════════════════════════════════════════════════════════════════════════

/// Two-sided chi-square interval on the unbiased sample variance.
///
/// Limits are `χ²(alpha/2, n-1)·σ²/(n-1)` and `χ²(1-alpha/2, n-1)·σ²/(n-1)`.
pub fn variance_test(
    values: &[f64],
    alpha: f64,
    expected_variance: f64,
) -> Result<TestVerdict, TestError> {
    validate_alpha(alpha)?;
    validate_sample(TestKind::Variance, values, 2)?;
    if !expected_variance.is_finite() || expected_variance <= 0.0 {
        return Err(TestError::InvalidParameter {
            parameter: "expected_variance",
            reason: format!("must be positive and finite, got {expected_variance}"),
        });
    }

    let n = values.len();
    let df = n - 1;
    let sample_variance = sample_variance(values);
    let chi2_lower = chi_square_quantile(alpha / 2.0, df as f64)?;
    let chi2_upper = chi_square_quantile(1.0 - alpha / 2.0, df as f64)?;
    let lower_limit = chi2_lower * expected_variance / df as f64;
    let upper_limit = chi2_upper * expected_variance / df as f64;
    let approved = lower_limit <= sample_variance && sample_variance <= upper_limit;

    Ok(TestVerdict::decided(
        TestKind::Variance,
        n,
        alpha,
        approved,
        Statistics::Variance(VarianceStatistics {
            sample_mean: mean(values),
            sample_variance,
            expected_variance,
            degrees_of_freedom: df,
            chi2_lower,
            chi2_upper,
            lower_limit,
            upper_limit,
            chi2: df as f64 * sample_variance / expected_variance,
        }),
    ))
}

/// Variance test against a fixed expected variance.
#[derive(Debug, Clone, Copy)]
pub struct VarianceTest {
    pub expected_variance: f64,
}

impl RandomnessTest for VarianceTest {
    fn kind(&self) -> TestKind {
        TestKind::Variance
    }

    fn min_sample_size(&self) -> usize {
        2
    }

    fn run(
        &self,
        values: &[f64],
        alpha: f64,
        _params: TestParameters,
    ) -> Result<TestVerdict, TestError> {
        variance_test(values, alpha, self.expected_variance)
    }
}
