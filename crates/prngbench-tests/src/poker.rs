//! Poker test: classify the first five decimal digits of each value as a
//! poker hand and compare hand frequencies to their theoretical probabilities.
//!
//! Expected counts, per-hand terms and the statistic are truncated to
//! 5 decimals, matching the generators' precision rule.

use serde::Serialize;

use prngbench_core::precision::truncate5;

use crate::suite::{RandomnessTest, TestParameters};
use crate::{
    Statistics, TestError, TestKind, TestVerdict, chi_square_quantile, validate_alpha,
    validate_sample,
};

/// Degrees of freedom: seven hand categories minus one.
const DEGREES_OF_FREEDOM: usize = 6;

/// Digits per hand.
const HAND_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PokerHand {
    /// All digits different.
    #[serde(rename = "D")]
    AllDifferent,
    #[serde(rename = "O")]
    OnePair,
    #[serde(rename = "T")]
    TwoPairs,
    #[serde(rename = "K")]
    ThreeOfAKind,
    #[serde(rename = "F")]
    FullHouse,
    #[serde(rename = "P")]
    FourOfAKind,
    #[serde(rename = "Q")]
    FiveOfAKind,
}

impl PokerHand {
    pub const ALL: [PokerHand; 7] = [
        Self::AllDifferent,
        Self::OnePair,
        Self::TwoPairs,
        Self::ThreeOfAKind,
        Self::FullHouse,
        Self::FourOfAKind,
        Self::FiveOfAKind,
    ];

    /// Single-letter category code.
    pub fn code(&self) -> char {
        match self {
            Self::AllDifferent => 'D',
            Self::OnePair => 'O',
            Self::TwoPairs => 'T',
            Self::ThreeOfAKind => 'K',
            Self::FullHouse => 'F',
            Self::FourOfAKind => 'P',
            Self::FiveOfAKind => 'Q',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::AllDifferent => "All different",
            Self::OnePair => "One pair",
            Self::TwoPairs => "Two pairs",
            Self::ThreeOfAKind => "Three of a kind",
            Self::FullHouse => "Full house",
            Self::FourOfAKind => "Four of a kind",
            Self::FiveOfAKind => "Five of a kind",
        }
    }

    /// Probability of the hand for five independent uniform digits.
    pub fn probability(&self) -> f64 {
        match self {
            Self::AllDifferent => 0.3024,
            Self::OnePair => 0.504,
            Self::TwoPairs => 0.108,
            Self::ThreeOfAKind => 0.072,
            Self::FullHouse => 0.009,
            Self::FourOfAKind => 0.0045,
            Self::FiveOfAKind => 0.0001,
        }
    }
}

impl std::fmt::Display for PokerHand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The first five decimal digits of `value`, right-padded with zeros.
///
/// Digits come from the shortest decimal representation of the value, so
/// `0.12` yields `1, 2, 0, 0, 0`.
pub fn hand_digits(value: f64) -> [u8; HAND_SIZE] {
    let text = format!("{value}");
    let fraction = text.split_once('.').map(|(_, frac)| frac).unwrap_or("");
    let mut digits = [0u8; HAND_SIZE];
    for (slot, byte) in digits.iter_mut().zip(fraction.bytes()) {
        *slot = byte.wrapping_sub(b'0').min(9);
    }
    digits
}

/// Classify the hand formed by the first five decimal digits of `value`.
pub fn classify_hand(value: f64) -> PokerHand {
    let mut counts = [0u8; 10];
    for d in hand_digits(value) {
        counts[d as usize] += 1;
    }
    let mut shape: Vec<u8> = counts.into_iter().filter(|&c| c > 0).collect();
    shape.sort_unstable_by(|a, b| b.cmp(a));

    match shape.as_slice() {
        [5] => PokerHand::FiveOfAKind,
        [4, 1] => PokerHand::FourOfAKind,
        [3, 2] => PokerHand::FullHouse,
        [3, 1, 1] => PokerHand::ThreeOfAKind,
        [2, 2, 1] => PokerHand::TwoPairs,
        [2, 1, 1, 1] => PokerHand::OnePair,
        _ => PokerHand::AllDifferent,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PokerRow {
    pub hand: PokerHand,
    pub probability: f64,
    pub observed: usize,
    /// `truncate5(n * probability)`.
    pub expected: f64,
    /// `truncate5((O - E)² / E)`.
    pub chi2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PokerStatistics {
    pub degrees_of_freedom: usize,
    pub chi2: f64,
    /// `χ²(1 - alpha, 6)`.
    pub critical_value: f64,
    pub table: Vec<PokerRow>,
}

/// Chi-square test on poker-hand frequencies.
///
/// Approved iff the truncated statistic does not exceed `χ²(1-alpha, 6)`.
pub fn poker_test(values: &[f64], alpha: f64) -> Result<TestVerdict, TestError> {
    validate_alpha(alpha)?;
    validate_sample(TestKind::Poker, values, 1)?;

    let n = values.len();
    let mut observed = [0usize; 7];
    for &v in values {
        let hand = classify_hand(v);
        if let Some(slot) = PokerHand::ALL.iter().position(|h| *h == hand) {
            observed[slot] += 1;
        }
    }

    let table: Vec<PokerRow> = PokerHand::ALL
        .iter()
        .zip(observed)
        .map(|(&hand, o)| {
            let expected = truncate5(n as f64 * hand.probability());
            let chi2 = if expected > 0.0 {
                let diff = o as f64 - expected;
                truncate5(diff * diff / expected)
            } else {
                0.0
            };
            PokerRow {
                hand,
                probability: hand.probability(),
                observed: o,
                expected,
                chi2,
            }
        })
        .collect();

    let chi2 = truncate5(table.iter().map(|row| row.chi2).sum());
    let critical_value = chi_square_quantile(1.0 - alpha, DEGREES_OF_FREEDOM as f64)?;

    Ok(TestVerdict::decided(
        TestKind::Poker,
        n,
        alpha,
        chi2 <= critical_value,
        Statistics::Poker(PokerStatistics {
            degrees_of_freedom: DEGREES_OF_FREEDOM,
            chi2,
            critical_value,
            table,
        }),
    ))
}

#[derive(Debug, Clone, Copy)]
pub struct PokerTest;

impl RandomnessTest for PokerTest {
    fn kind(&self) -> TestKind {
        TestKind::Poker
    }

    fn run(
        &self,
        values: &[f64],
        alpha: f64,
        _params: TestParameters,
    ) -> Result<TestVerdict, TestError> {
        poker_test(values, alpha)
    }
}
