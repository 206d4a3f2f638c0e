//! Integration tests for prngbench-core.
//!
//! These tests check the generator invariants end to end:
//! parameters → generator → sequence → normalized values.

use prngbench_core::{
    Degeneracy, GeneratorKind, GeneratorParameters, ScaleRange, SequenceGenerator, generate,
};
use proptest::prelude::*;

#[test]
fn every_method_builds_from_parameters() {
    let cases = [
        GeneratorParameters::MiddleSquare {
            seed: 5735,
            range: Some(ScaleRange::default()),
        },
        GeneratorParameters::LinearCongruential {
            x0: 6,
            k: 3,
            c: 7,
            g: 8,
        },
        GeneratorParameters::MultiplicativeCongruential { x0: 17, t: 5, g: 10 },
    ];
    for params in cases {
        let generator = params.build().unwrap();
        assert_eq!(generator.kind(), params.kind());
        let seq = generator.generate(5);
        assert!(!seq.is_empty());
        assert_eq!(seq.method, params.kind());
        assert_eq!(seq.records[0].index, 1);
    }
}

#[test]
fn middle_square_seed_zero_is_rejected() {
    let params = GeneratorParameters::MiddleSquare {
        seed: 0,
        range: None,
    };
    assert!(generate(&params, 10).is_err());
}

#[test]
fn middle_square_short_sequence_is_flagged() {
    // 100^2 = 10000 -> first three digits "100": a fixed point.
    let params = GeneratorParameters::MiddleSquare {
        seed: 100,
        range: None,
    };
    let seq = generate(&params, 50).unwrap();
    assert!(!seq.is_complete());
    assert_eq!(
        seq.degeneracy,
        Some(Degeneracy::FixedPoint {
            step: 1,
            state: 100
        })
    );
}

#[test]
fn sequence_serializes_with_degeneracy() {
    let params = GeneratorParameters::MiddleSquare {
        seed: 100,
        range: None,
    };
    let seq = generate(&params, 5).unwrap();
    let json = serde_json::to_value(&seq).unwrap();
    assert_eq!(json["method"], "middle_square");
    assert_eq!(json["degeneracy"]["kind"], "fixed_point");
    assert_eq!(json["records"][0]["trace"]["square"], 10000);
}

#[test]
fn congruential_records_omit_trace() {
    let params = GeneratorParameters::LinearCongruential {
        x0: 1,
        k: 1,
        c: 1,
        g: 4,
    };
    let seq = generate(&params, 1).unwrap();
    let json = serde_json::to_value(&seq).unwrap();
    assert!(json["records"][0].get("trace").is_none());
    assert!(json.get("degeneracy").is_none());
    assert_eq!(seq.method, GeneratorKind::LinearCongruential);
}

proptest! {
    #[test]
    fn lcg_states_stay_below_modulus_and_repeat_with_period_dividing_m(
        x0 in 0u64..1_000_000,
        k in 0u64..1_000,
        c in 0u64..1_000,
        g in 1u32..=8,
    ) {
        let m = 1usize << g;
        let params = GeneratorParameters::LinearCongruential { x0, k, c, g };
        let seq = generate(&params, 2 * m).unwrap();
        prop_assert_eq!(seq.len(), 2 * m);
        for r in &seq.records {
            prop_assert!((r.xi as usize) < m);
            prop_assert!((0.0..1.0).contains(&r.ri));
        }
        for i in 0..m {
            prop_assert_eq!(seq.records[i].xi, seq.records[i + m].xi);
        }
    }

    #[test]
    fn mcg_values_stay_in_unit_interval(
        x0 in 1u64..1_000_000,
        t in 0u64..1_000,
        g in 2u32..=20,
    ) {
        let m = 1u64 << g;
        prop_assume!(x0 % m != 0);
        let params = GeneratorParameters::MultiplicativeCongruential { x0, t, g };
        let seq = generate(&params, 200).unwrap();
        prop_assert_eq!(seq.is_degenerate(), x0 % m == m / 2);
        prop_assert_eq!(seq.is_complete(), !seq.is_degenerate());
        for r in &seq.records {
            prop_assert!(r.ri >= 0.0);
            prop_assert!(r.ri < 1.0);
            prop_assert!(r.xi != 0);
        }
    }

    #[test]
    fn middle_square_values_stay_in_unit_interval(seed in 1u64..1_000_000) {
        let params = GeneratorParameters::MiddleSquare { seed, range: None };
        let seq = generate(&params, 100).unwrap();
        prop_assert!(seq.len() <= 100);
        if seq.len() < 100 {
            prop_assert!(seq.is_degenerate());
        }
        for r in &seq.records {
            prop_assert!((0.0..1.0).contains(&r.ri));
        }
    }

    #[test]
    fn identical_parameters_reproduce_identical_sequences(
        x0 in 0u64..10_000,
        k in 0u64..100,
        c in 0u64..100,
        g in 1u32..=32,
    ) {
        let params = GeneratorParameters::LinearCongruential { x0, k, c, g };
        prop_assert_eq!(generate(&params, 64).unwrap(), generate(&params, 64).unwrap());
    }
}
