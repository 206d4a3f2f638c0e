//! Multiplicative congruential generator: `Xi = (a·Xi-1) mod m`.
//!
//! `a = 8t + 3` and `m = 2^g`. Values are normalized by `m - 1`, so a state of
//! `m - 1` would map to exactly 1; that value is pinned to
//! [`UNIT_CEILING`](crate::precision::UNIT_CEILING).
//!
//! `a - 1 ≡ 2 (mod 8)`, so `a·x ≡ x` only for `x ≡ 0 (mod m/2)`. The seed
//! `m/2` is therefore a fixed point and is reported as a [`Degeneracy`].

use crate::error::GeneratorError;
use crate::precision::{truncate_ratio, PRECISION, UNIT_CEILING};
use crate::sequence::{Degeneracy, Sequence, SequenceRecord};

use super::{power_of_two_modulus, GeneratorKind, SequenceGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiplicativeCongruential {
    x0: u64,
    multiplier: u128,
    modulus: u64,
}

impl MultiplicativeCongruential {
    /// `a = 8t + 3`, `m = 2^g` with `g` in `2..=63`; `x0 mod m` must be nonzero.
    pub fn new(x0: u64, t: u64, g: u32) -> Result<Self, GeneratorError> {
        let modulus = power_of_two_modulus(g, 2)?;
        if x0 % modulus == 0 {
            return Err(GeneratorError::invalid(
                "x0",
                format!("seed must not be a multiple of m = {modulus} (0 is a fixed point)"),
            ));
        }
        let m = u128::from(modulus);
        Ok(Self {
            x0,
            multiplier: (8 * u128::from(t) + 3) % m,
            modulus,
        })
    }

    pub fn multiplier(&self) -> u64 {
        self.multiplier as u64
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    fn normalize(&self, xi: u64) -> f64 {
        let ri = truncate_ratio(u128::from(xi), u128::from(self.modulus - 1), PRECISION);
        ri.min(UNIT_CEILING)
    }
}

impl SequenceGenerator for MultiplicativeCongruential {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::MultiplicativeCongruential
    }

    fn generate(&self, count: usize) -> Sequence {
        let mut sequence =
            Sequence::with_capacity(GeneratorKind::MultiplicativeCongruential, count);
        let m = u128::from(self.modulus);
        let mut xi = self.x0 % self.modulus;
        for index in 1..=count {
            let previous = xi;
            xi = ((self.multiplier * u128::from(xi)) % m) as u64;
            sequence.records.push(SequenceRecord {
                index,
                xi,
                trace: None,
                ri: self.normalize(xi),
                ni: None,
            });
            if xi == previous {
                sequence.degeneracy = Some(Degeneracy::FixedPoint { step: index, state: xi });
                break;
            }
        }
        sequence
    }
}
