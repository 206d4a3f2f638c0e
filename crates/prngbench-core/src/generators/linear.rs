//! Linear congruential generator: `Xi = (a·Xi-1 + c) mod m`.
//!
//! `a = 1 + 2k` is always odd and `m = 2^g`. The recurrence is a bijection on
//! `Z/m`, so the sequence is purely periodic with a period dividing `m`.
//! Short periods from poor `(a, c)` choices are not detected.

use crate::error::GeneratorError;
use crate::precision::{truncate_ratio, PRECISION};
use crate::sequence::{Sequence, SequenceRecord};

use super::{power_of_two_modulus, GeneratorKind, SequenceGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearCongruential {
    x0: u64,
    multiplier: u128,
    increment: u128,
    modulus: u64,
}

impl LinearCongruential {
    /// `a = 1 + 2k`, `m = 2^g` with `g` in `1..=63`.
    pub fn new(x0: u64, k: u64, c: u64, g: u32) -> Result<Self, GeneratorError> {
        let modulus = power_of_two_modulus(g, 1)?;
        let m = u128::from(modulus);
        Ok(Self {
            x0,
            // Reducing a and c keeps a·x + c inside u128 for every g <= 63.
            multiplier: (1 + 2 * u128::from(k)) % m,
            increment: u128::from(c) % m,
            modulus,
        })
    }

    /// Multiplier reduced modulo `m`.
    pub fn multiplier(&self) -> u64 {
        self.multiplier as u64
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    fn next(&self, x: u64) -> u64 {
        ((self.multiplier * u128::from(x) + self.increment) % u128::from(self.modulus)) as u64
    }
}

impl SequenceGenerator for LinearCongruential {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::LinearCongruential
    }

    fn generate(&self, count: usize) -> Sequence {
        let mut sequence = Sequence::with_capacity(GeneratorKind::LinearCongruential, count);
        let mut xi = self.x0 % self.modulus;
        for index in 1..=count {
            xi = self.next(xi);
            sequence.records.push(SequenceRecord {
                index,
                xi,
                trace: None,
                ri: truncate_ratio(u128::from(xi), u128::from(self.modulus), PRECISION),
                ni: None,
            });
        }
        sequence
    }
}
