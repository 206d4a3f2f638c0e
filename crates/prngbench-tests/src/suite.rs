//! Test suite configuration and dispatch.
//!
//! A [`TestSuiteConfig`] maps test identifiers to settings. [`run_suite`]
//! validates the whole configuration against the input before running
//! anything, then runs every enabled test and returns one verdict per test.
//! There is no overall pass/fail: each verdict stands on its own.
//!
//! Config JSON accepts a flag or a parameter object per test:
//!
//! ```json
//! { "means": true, "variance": false, "chi": { "k": 10 }, "ks": {} }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::frequency::{ChiSquareTest, KolmogorovTest};
use crate::moments::{EXPECTED_MEAN, EXPECTED_VARIANCE, MeansTest, VarianceTest};
use crate::poker::PokerTest;
use crate::runs::{RunsTest, THEORETICAL_MEDIAN};
use crate::{TestError, TestKind, TestVerdict, ensure_finite, validate_alpha};

/// Significance level used when the caller does not pick one.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Verdicts keyed by test.
pub type SuiteResults = BTreeMap<TestKind, TestVerdict>;

// ═══════════════════════════════════════════════════════════════════════════════
// Test interface
// ═══════════════════════════════════════════════════════════════════════════════

/// Parameters a test accepts from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterShape {
    None,
    IntervalCount { default: usize },
}

/// Parameters resolved for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestParameters {
    None,
    IntervalCount(usize),
}

impl TestParameters {
    /// Interval count, or `default` when none was resolved.
    pub fn intervals(&self, default: usize) -> usize {
        match self {
            Self::IntervalCount(k) => *k,
            Self::None => default,
        }
    }
}

/// One hypothesis test in the battery.
pub trait RandomnessTest: Send + Sync {
    fn kind(&self) -> TestKind;

    fn parameter_shape(&self) -> ParameterShape {
        ParameterShape::None
    }

    fn min_sample_size(&self) -> usize {
        1
    }

    fn run(
        &self,
        values: &[f64],
        alpha: f64,
        params: TestParameters,
    ) -> Result<TestVerdict, TestError>;

    /// Resolve config settings to run parameters; `None` when disabled.
    fn resolve(&self, settings: TestSettings) -> Result<Option<TestParameters>, TestError> {
        match (settings, self.parameter_shape()) {
            (TestSettings::Disabled, _) => Ok(None),
            (TestSettings::Enabled, ParameterShape::None) => Ok(Some(TestParameters::None)),
            (TestSettings::Enabled, ParameterShape::IntervalCount { default }) => {
                Ok(Some(TestParameters::IntervalCount(default)))
            }
            (TestSettings::WithIntervals { k }, ParameterShape::IntervalCount { .. }) => {
                if k < 2 {
                    Err(TestError::InvalidIntervalCount {
                        test: self.kind(),
                        k,
                    })
                } else {
                    Ok(Some(TestParameters::IntervalCount(k)))
                }
            }
            (TestSettings::WithIntervals { .. }, ParameterShape::None) => {
                Err(TestError::UnexpectedParameter { test: self.kind() })
            }
        }
    }
}

static MEANS: MeansTest = MeansTest {
    expected_mean: EXPECTED_MEAN,
};
static VARIANCE: VarianceTest = VarianceTest {
    expected_variance: EXPECTED_VARIANCE,
};
static CHI_SQUARE: ChiSquareTest = ChiSquareTest;
static KOLMOGOROV: KolmogorovTest = KolmogorovTest;
static POKER: PokerTest = PokerTest;
static RUNS: RunsTest = RunsTest {
    median: THEORETICAL_MEDIAN,
};

/// Every test in the battery, in [`TestKind::ALL`] order.
pub fn registry() -> [&'static dyn RandomnessTest; 6] {
    [&MEANS, &VARIANCE, &CHI_SQUARE, &KOLMOGOROV, &POKER, &RUNS]
}

/// The registered implementation of `kind`.
pub fn lookup(kind: TestKind) -> &'static dyn RandomnessTest {
    match kind {
        TestKind::Means => &MEANS,
        TestKind::Variance => &VARIANCE,
        TestKind::ChiSquare => &CHI_SQUARE,
        TestKind::Kolmogorov => &KOLMOGOROV,
        TestKind::Poker => &POKER,
        TestKind::Runs => &RUNS,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Configuration
// ═══════════════════════════════════════════════════════════════════════════════

/// Settings for one test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestSettings {
    Disabled,
    /// Enabled with default parameters.
    Enabled,
    WithIntervals { k: usize },
}

/// Settings as written in a config file: a flag or a parameter object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SettingsInput {
    Flag(bool),
    Params {
        #[serde(default)]
        k: Option<usize>,
    },
}

impl From<SettingsInput> for TestSettings {
    fn from(input: SettingsInput) -> Self {
        match input {
            SettingsInput::Flag(true) => Self::Enabled,
            SettingsInput::Flag(false) => Self::Disabled,
            SettingsInput::Params { k: Some(k) } => Self::WithIntervals { k },
            SettingsInput::Params { k: None } => Self::Enabled,
        }
    }
}

/// Which tests to run and with which parameters.
///
/// Tests absent from the map are not run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, SettingsInput>")]
pub struct TestSuiteConfig {
    entries: BTreeMap<TestKind, TestSettings>,
}

impl TestSuiteConfig {
    /// An empty config (nothing enabled).
    pub fn new() -> Self {
        Self::default()
    }

    /// Every test enabled with default parameters.
    pub fn all() -> Self {
        TestKind::ALL
            .into_iter()
            .fold(Self::new(), |config, kind| config.enable(kind))
    }

    pub fn enable(mut self, kind: TestKind) -> Self {
        self.entries.insert(kind, TestSettings::Enabled);
        self
    }

    pub fn with_intervals(mut self, kind: TestKind, k: usize) -> Self {
        self.entries.insert(kind, TestSettings::WithIntervals { k });
        self
    }

    pub fn disable(mut self, kind: TestKind) -> Self {
        self.entries.insert(kind, TestSettings::Disabled);
        self
    }

    pub fn settings(&self, kind: TestKind) -> TestSettings {
        self.entries
            .get(&kind)
            .copied()
            .unwrap_or(TestSettings::Disabled)
    }

    pub fn entries(&self) -> impl Iterator<Item = (TestKind, TestSettings)> + '_ {
        self.entries.iter().map(|(&kind, &settings)| (kind, settings))
    }

    /// Number of enabled tests.
    pub fn enabled_count(&self) -> usize {
        self.entries
            .values()
            .filter(|s| **s != TestSettings::Disabled)
            .count()
    }

    /// Parse a compact list such as `"means,chi:10,ks"`.
    ///
    /// `all` enables every test with defaults.
    pub fn parse_list(list: &str) -> Result<Self, TestError> {
        let mut config = Self::new();
        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if item.eq_ignore_ascii_case("all") {
                for kind in TestKind::ALL {
                    config.entries.entry(kind).or_insert(TestSettings::Enabled);
                }
                continue;
            }
            let (name, param) = match item.split_once(':') {
                Some((name, param)) => (name, Some(param.trim())),
                None => (item, None),
            };
            let kind =
                TestKind::parse(name).ok_or_else(|| TestError::UnknownTest(name.to_string()))?;
            config = match param {
                None => config.enable(kind),
                Some(p) => {
                    let k = p.parse::<usize>().map_err(|_| TestError::InvalidParameter {
                        parameter: "k",
                        reason: format!("'{p}' is not an interval count"),
                    })?;
                    config.with_intervals(kind, k)
                }
            };
        }
        Ok(config)
    }

    /// Parse a JSON config object.
    pub fn from_json_str(json: &str) -> Result<Self, TestError> {
        serde_json::from_str(json).map_err(|e| TestError::InvalidParameter {
            parameter: "tests",
            reason: e.to_string(),
        })
    }
}

impl TryFrom<BTreeMap<String, SettingsInput>> for TestSuiteConfig {
    type Error = TestError;

    fn try_from(raw: BTreeMap<String, SettingsInput>) -> Result<Self, Self::Error> {
        let mut entries = BTreeMap::new();
        for (name, input) in raw {
            let kind = TestKind::parse(&name).ok_or(TestError::UnknownTest(name))?;
            entries.insert(kind, TestSettings::from(input));
        }
        Ok(Self { entries })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Dispatch
// ═══════════════════════════════════════════════════════════════════════════════

type Plan = Vec<(&'static dyn RandomnessTest, TestParameters)>;

/// Validate everything up front so a bad config fails before any test runs.
fn plan(values: &[f64], config: &TestSuiteConfig, alpha: f64) -> Result<Plan, TestError> {
    validate_alpha(alpha)?;
    ensure_finite(values)?;

    let mut plan = Vec::new();
    for (kind, settings) in config.entries() {
        let test = lookup(kind);
        let Some(params) = test.resolve(settings)? else {
            continue;
        };
        if values.len() < test.min_sample_size() {
            return Err(TestError::InsufficientSample {
                test: kind,
                needed: test.min_sample_size(),
                got: values.len(),
            });
        }
        plan.push((test, params));
    }
    Ok(plan)
}

fn log_summary(results: &SuiteResults, n: usize) {
    let approved = results.values().filter(|v| v.approved).count();
    log::info!(
        "ran {} tests on {} values: {} approved",
        results.len(),
        n,
        approved
    );
}

/// Run every enabled test sequentially.
pub fn run_suite(
    values: &[f64],
    config: &TestSuiteConfig,
    alpha: f64,
) -> Result<SuiteResults, TestError> {
    let plan = plan(values, config, alpha)?;
    let mut results = SuiteResults::new();
    for (test, params) in plan {
        let verdict = test.run(values, alpha, params)?;
        log::debug!("{}: {:?}", test.kind(), verdict.outcome);
        results.insert(test.kind(), verdict);
    }
    log_summary(&results, values.len());
    Ok(results)
}

/// Run every enabled test on its own thread. Same results as [`run_suite`].
pub fn run_suite_parallel(
    values: &[f64],
    config: &TestSuiteConfig,
    alpha: f64,
) -> Result<SuiteResults, TestError> {
    let plan = plan(values, config, alpha)?;

    let outcomes: Vec<Result<TestVerdict, TestError>> = std::thread::scope(|s| {
        let handles: Vec<_> = plan
            .iter()
            .map(|&(test, params)| {
                let kind = test.kind();
                (kind, s.spawn(move || test.run(values, alpha, params)))
            })
            .collect();
        handles
            .into_iter()
            .map(|(kind, handle)| {
                handle
                    .join()
                    .unwrap_or(Err(TestError::Panicked { test: kind }))
            })
            .collect()
    });

    let mut results = SuiteResults::new();
    for verdict in outcomes {
        let verdict = verdict?;
        log::debug!("{}: {:?}", verdict.test, verdict.outcome);
        results.insert(verdict.test, verdict);
    }
    log_summary(&results, values.len());
    Ok(results)
}
