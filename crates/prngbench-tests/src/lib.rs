//! Statistical test battery for normalized pseudorandom sequences.
//!
//! Provides 6 hypothesis tests for deciding whether a sequence of values in
//! `[0, 1)` is random enough to use: means, variance, chi-square uniformity,
//! Kolmogorov-Smirnov, poker and runs. Each test returns a [`TestVerdict`]
//! with its statistic, critical value(s), an approved flag and a decision
//! string. [`run_suite`] runs a configurable subset of them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};
use thiserror::Error;

pub mod frequency;
pub mod moments;
pub mod poker;
pub mod runs;
pub mod suite;

pub use frequency::{
    ChiSquareInterval, ChiSquareStatistics, DEFAULT_INTERVALS, IntervalGrid, KsInterval,
    KsStatistics, chi_square_test, kolmogorov_smirnov_test,
};
pub use moments::{
    EXPECTED_MEAN, EXPECTED_VARIANCE, MeanStatistics, VarianceStatistics, means_test,
    variance_test,
};
pub use poker::{PokerHand, PokerRow, PokerStatistics, classify_hand, hand_digits, poker_test};
pub use runs::{RunsStatistics, THEORETICAL_MEDIAN, count_runs, runs_test};
pub use suite::{
    DEFAULT_ALPHA, ParameterShape, RandomnessTest, SettingsInput, SuiteResults, TestParameters,
    TestSettings, TestSuiteConfig, registry, run_suite, run_suite_parallel,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Core types
// ═══════════════════════════════════════════════════════════════════════════════

/// Identifier of one test in the battery.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TestKind {
    #[serde(rename = "means", alias = "medias", alias = "mean")]
    Means,
    #[serde(rename = "variance", alias = "varianza")]
    Variance,
    #[serde(rename = "chi", alias = "chi2", alias = "chi_square")]
    ChiSquare,
    #[serde(rename = "kolmogorov", alias = "ks")]
    Kolmogorov,
    #[serde(rename = "poker")]
    Poker,
    #[serde(rename = "runs", alias = "rachas")]
    Runs,
}

impl TestKind {
    pub const ALL: [TestKind; 6] = [
        Self::Means,
        Self::Variance,
        Self::ChiSquare,
        Self::Kolmogorov,
        Self::Poker,
        Self::Runs,
    ];

    /// Short identifier used in configs and result maps.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Means => "means",
            Self::Variance => "variance",
            Self::ChiSquare => "chi",
            Self::Kolmogorov => "kolmogorov",
            Self::Poker => "poker",
            Self::Runs => "runs",
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Means => "Means Test",
            Self::Variance => "Variance Test",
            Self::ChiSquare => "Chi-Square Test",
            Self::Kolmogorov => "Kolmogorov-Smirnov Test",
            Self::Poker => "Poker Test",
            Self::Runs => "Runs Test",
        }
    }

    /// Parse an identifier or one of its aliases (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "means" | "mean" | "medias" => Some(Self::Means),
            "variance" | "varianza" => Some(Self::Variance),
            "chi" | "chi2" | "chi_square" => Some(Self::ChiSquare),
            "kolmogorov" | "ks" | "kolmogorov_smirnov" => Some(Self::Kolmogorov),
            "poker" => Some(Self::Poker),
            "runs" | "rachas" => Some(Self::Runs),
            _ => None,
        }
    }
}

impl std::fmt::Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Errors raised before any statistic is computed.
///
/// Statistics that turn out undefined are not errors; they produce a verdict
/// with [`Outcome::NotApplicable`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TestError {
    #[error("significance level must be strictly between 0 and 1, got {0}")]
    InvalidAlpha(f64),

    #[error("{test} needs at least {needed} values, got {got}")]
    InsufficientSample {
        test: TestKind,
        needed: usize,
        got: usize,
    },

    #[error("{test} needs at least 2 intervals, got {k}")]
    InvalidIntervalCount { test: TestKind, k: usize },

    #[error("{test} does not take an interval count")]
    UnexpectedParameter { test: TestKind },

    #[error("invalid parameter `{parameter}`: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },

    #[error("value at position {index} is not finite ({value})")]
    NonFiniteValue { index: usize, value: f64 },

    #[error("unknown test '{0}'")]
    UnknownTest(String),

    #[error("distribution error: {0}")]
    Distribution(String),

    #[error("{test} panicked")]
    Panicked { test: TestKind },
}

/// Result of a hypothesis test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Approved,
    Rejected,
    /// The statistic is undefined for this input (e.g. zero variance).
    NotApplicable,
}

/// Test-specific statistics carried by a verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Statistics {
    Means(MeanStatistics),
    Variance(VarianceStatistics),
    ChiSquare(ChiSquareStatistics),
    Kolmogorov(KsStatistics),
    Poker(PokerStatistics),
    Runs(RunsStatistics),
}

/// Uniform output of every test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestVerdict {
    pub test: TestKind,
    pub test_name: &'static str,
    pub sample_size: usize,
    pub alpha: f64,
    pub outcome: Outcome,
    /// `true` iff `outcome == Outcome::Approved`.
    pub approved: bool,
    /// Human-readable decision, consistent with `approved`.
    pub decision: String,
    pub statistics: Statistics,
}

impl TestVerdict {
    /// Verdict for a computed statistic.
    pub(crate) fn decided(
        test: TestKind,
        sample_size: usize,
        alpha: f64,
        approved: bool,
        statistics: Statistics,
    ) -> Self {
        let (outcome, verb) = if approved {
            (Outcome::Approved, "Passes")
        } else {
            (Outcome::Rejected, "Fails")
        };
        Self {
            test,
            test_name: test.name(),
            sample_size,
            alpha,
            outcome,
            approved,
            decision: format!("{verb} the {}.", test.name().to_lowercase()),
            statistics,
        }
    }

    /// Verdict for an input on which the statistic is undefined.
    pub(crate) fn not_applicable(
        test: TestKind,
        sample_size: usize,
        alpha: f64,
        reason: &str,
        statistics: Statistics,
    ) -> Self {
        Self {
            test,
            test_name: test.name(),
            sample_size,
            alpha,
            outcome: Outcome::NotApplicable,
            approved: false,
            decision: format!("Not applicable: {reason}."),
            statistics,
        }
    }

    pub fn is_applicable(&self) -> bool {
        self.outcome != Outcome::NotApplicable
    }

    /// Primary test statistic; `None` when the test was not applicable.
    pub fn statistic(&self) -> Option<f64> {
        if !self.is_applicable() {
            return None;
        }
        match &self.statistics {
            Statistics::Means(s) => Some(s.sample_mean),
            Statistics::Variance(s) => Some(s.sample_variance),
            Statistics::ChiSquare(s) => Some(s.chi2),
            Statistics::Kolmogorov(s) => Some(s.max_difference),
            Statistics::Poker(s) => Some(s.chi2),
            Statistics::Runs(s) => s.z,
        }
    }

    /// Acceptance bounds `(lower, upper)`; one-sided tests have no lower bound.
    pub fn bounds(&self) -> (Option<f64>, Option<f64>) {
        match &self.statistics {
            Statistics::Means(s) => (Some(s.lower_limit), Some(s.upper_limit)),
            Statistics::Variance(s) => (Some(s.lower_limit), Some(s.upper_limit)),
            Statistics::ChiSquare(s) => (None, Some(s.critical_value)),
            Statistics::Kolmogorov(s) => (None, Some(s.critical_value)),
            Statistics::Poker(s) => (None, Some(s.critical_value)),
            Statistics::Runs(s) => (Some(s.lower_bound), Some(s.upper_bound)),
        }
    }

    /// Flatten into `field -> value` for display and export layers.
    ///
    /// Nested fields use dotted keys (`statistics.chi2`); interval tables stay
    /// arrays.
    pub fn to_record(&self) -> BTreeMap<String, serde_json::Value> {
        let mut record = BTreeMap::new();
        match serde_json::to_value(self) {
            Ok(value) => flatten_into("", value, &mut record),
            Err(e) => log::warn!("could not serialize {} verdict: {e}", self.test),
        }
        record
    }
}

fn flatten_into(
    prefix: &str,
    value: serde_json::Value,
    out: &mut BTreeMap<String, serde_json::Value>,
) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, inner) in map {
                let key = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(&key, inner, out);
            }
        }
        other => {
            out.insert(prefix.to_string(), other);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Reject alpha outside `(0, 1)`.
pub(crate) fn validate_alpha(alpha: f64) -> Result<(), TestError> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(TestError::InvalidAlpha(alpha))
    }
}

/// Reject non-finite values and samples smaller than `needed`.
pub(crate) fn validate_sample(
    test: TestKind,
    values: &[f64],
    needed: usize,
) -> Result<(), TestError> {
    ensure_finite(values)?;
    if values.len() < needed {
        return Err(TestError::InsufficientSample {
            test,
            needed,
            got: values.len(),
        });
    }
    Ok(())
}

pub(crate) fn ensure_finite(values: &[f64]) -> Result<(), TestError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(TestError::NonFiniteValue {
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

pub(crate) fn validate_intervals(test: TestKind, k: usize) -> Result<(), TestError> {
    if k < 2 {
        Err(TestError::InvalidIntervalCount { test, k })
    } else {
        Ok(())
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample variance (`n - 1` denominator). Needs `n >= 2`.
pub(crate) fn sample_variance(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (values.len() - 1) as f64
}

pub(crate) fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Critical values
// ═══════════════════════════════════════════════════════════════════════════════

/// Standard normal quantile `z(p)`.
pub fn normal_quantile(p: f64) -> f64 {
    Normal::standard().inverse_cdf(p)
}

/// Chi-square quantile `χ²(p, df)`.
pub fn chi_square_quantile(p: f64, df: f64) -> Result<f64, TestError> {
    let dist = ChiSquared::new(df).map_err(|e| TestError::Distribution(e.to_string()))?;
    Ok(dist.inverse_cdf(p))
}

/// Classical Kolmogorov-Smirnov table: `(alpha, c(alpha))`.
const KS_COEFFICIENTS: [(f64, f64); 8] = [
    (0.20, 1.073),
    (0.15, 1.138),
    (0.10, 1.224),
    (0.05, 1.358),
    (0.01, 1.628),
    (0.005, 1.731),
    (0.002, 1.855),
    (0.001, 1.950),
];

/// `c(alpha)` from the table, or `sqrt(-0.5 ln(alpha / 2))` off-table.
pub fn ks_coefficient(alpha: f64) -> f64 {
    KS_COEFFICIENTS
        .iter()
        .find(|(a, _)| (a - alpha).abs() < 1e-12)
        .map(|&(_, c)| c)
        .unwrap_or_else(|| (-0.5 * (alpha / 2.0).ln()).sqrt())
}

/// Finite-sample KS critical value `c(alpha) / sqrt(n)`.
pub fn ks_critical_value(n: usize, alpha: f64) -> f64 {
    ks_coefficient(alpha) / (n as f64).sqrt()
}
