//! Integration tests: generator output through the full test battery.

use prngbench_core::{GeneratorParameters, generate};
use prngbench_tests::{
    DEFAULT_ALPHA, EXPECTED_MEAN, Outcome, Statistics, TestKind, TestSuiteConfig,
    chi_square_test, kolmogorov_smirnov_test, means_test, run_suite, run_suite_parallel,
};

fn lcg_values(count: usize) -> Vec<f64> {
    let params = GeneratorParameters::LinearCongruential {
        x0: 37,
        k: 6,
        c: 7,
        g: 12,
    };
    generate(&params, count).unwrap().values()
}

#[test]
fn full_period_lcg_passes_uniformity_tests() {
    // a = 13 and c odd give the full period: every state is visited once,
    // so the values are evenly spread over [0, 1).
    let values = lcg_values(4096);
    let config = TestSuiteConfig::new()
        .enable(TestKind::Means)
        .enable(TestKind::Variance)
        .enable(TestKind::ChiSquare)
        .enable(TestKind::Kolmogorov);
    let results = run_suite(&values, &config, DEFAULT_ALPHA).unwrap();
    assert_eq!(results.len(), 4);
    for (kind, verdict) in &results {
        assert!(verdict.approved, "{kind} rejected: {}", verdict.decision);
        assert_eq!(verdict.sample_size, 4096);
    }
}

#[test]
fn every_verdict_is_consistent() {
    let values = lcg_values(1000);
    let results = run_suite(&values, &TestSuiteConfig::all(), DEFAULT_ALPHA).unwrap();
    assert_eq!(results.len(), 6);
    for verdict in results.values() {
        assert_eq!(verdict.approved, verdict.outcome == Outcome::Approved);
        assert_eq!(verdict.alpha, DEFAULT_ALPHA);
        if verdict.approved {
            assert!(verdict.decision.starts_with("Passes"));
        }
        if verdict.is_applicable() {
            assert!(verdict.statistic().is_some());
        }
    }
}

#[test]
fn tests_are_idempotent() {
    let values = lcg_values(500);
    let config = TestSuiteConfig::all();
    let first = run_suite(&values, &config, DEFAULT_ALPHA).unwrap();
    let second = run_suite(&values, &config, DEFAULT_ALPHA).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        run_suite_parallel(&values, &config, DEFAULT_ALPHA).unwrap(),
        first
    );
}

#[test]
fn means_test_on_evenly_spaced_values() {
    let values: Vec<f64> = (0..1000).map(|i| i as f64 / 1000.0).collect();
    assert!(means_test(&values, 0.05, EXPECTED_MEAN).unwrap().approved);
}

#[test]
fn chi_square_on_evenly_spaced_values() {
    let values: Vec<f64> = (0..10_000).map(|i| i as f64 / 10_000.0).collect();
    let verdict = chi_square_test(&values, 10, 0.05).unwrap();
    assert!(verdict.approved);
    assert!(verdict.statistic().unwrap() < 0.01);
}

#[test]
fn ks_boundary_value_is_counted_once() {
    let verdict = kolmogorov_smirnov_test(&[0.0, 0.5, 1.0], 2, 0.05).unwrap();
    let Statistics::Kolmogorov(stats) = &verdict.statistics else {
        panic!("wrong statistics variant");
    };
    let total: usize = stats.table.iter().map(|r| r.observed).sum();
    assert_eq!(total, 3);
    assert_eq!(stats.table[0].observed, 2);
}

#[test]
fn stricter_alpha_widens_acceptance() {
    let values = lcg_values(800);
    let loose = means_test(&values, 0.10, EXPECTED_MEAN).unwrap();
    let strict = means_test(&values, 0.01, EXPECTED_MEAN).unwrap();
    let (lo_loose, hi_loose) = loose.bounds();
    let (lo_strict, hi_strict) = strict.bounds();
    assert!(lo_strict.unwrap() < lo_loose.unwrap());
    assert!(hi_strict.unwrap() > hi_loose.unwrap());
}

#[test]
fn verdict_record_flattens_statistics() {
    let values = lcg_values(200);
    let results = run_suite(
        &values,
        &TestSuiteConfig::parse_list("means,chi:5").unwrap(),
        DEFAULT_ALPHA,
    )
    .unwrap();

    let means = results[&TestKind::Means].to_record();
    assert_eq!(means["test"], "means");
    assert!(means.contains_key("statistics.sample_mean"));
    assert!(means.contains_key("statistics.upper_limit"));

    let chi = results[&TestKind::ChiSquare].to_record();
    assert_eq!(chi["statistics.intervals"], 5);
    assert_eq!(chi["statistics.table"].as_array().map(Vec::len), Some(5));
}

#[test]
fn json_config_drives_the_suite() {
    let config = TestSuiteConfig::from_json_str(
        r#"{"means": true, "poker": true, "runs": false, "kolmogorov": {"k": 4}}"#,
    )
    .unwrap();
    let results = run_suite(&lcg_values(300), &config, DEFAULT_ALPHA).unwrap();
    let kinds: Vec<TestKind> = results.keys().copied().collect();
    assert_eq!(
        kinds,
        vec![TestKind::Means, TestKind::Kolmogorov, TestKind::Poker]
    );
}

#[test]
fn verdicts_serialize_with_test_ids() {
    let results = run_suite(&lcg_values(100), &TestSuiteConfig::all(), DEFAULT_ALPHA).unwrap();
    let json = serde_json::to_value(&results).unwrap();
    for id in ["means", "variance", "chi", "kolmogorov", "poker", "runs"] {
        assert!(json.get(id).is_some(), "missing {id}");
        assert!(json[id]["approved"].is_boolean());
    }
}
