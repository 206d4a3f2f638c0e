//! Middle-square generator.
//!
//! Square the state, count the digits of the square, and cut a fixed block of
//! digits out of it. The block becomes the next state and, divided by 10^4,
//! the normalized value. Squares with fewer than 3 or more than 12 digits
//! have no extraction window, so generation stops there.

use crate::error::GeneratorError;
use crate::precision::{decimal_digits, truncate_ratio, PRECISION};
use crate::sequence::{Degeneracy, MiddleSquareTrace, ScaleRange, Sequence, SequenceRecord};

use super::{GeneratorKind, SequenceGenerator};

/// Divisor that maps an extracted block into `[0, 1)`.
const NORMALIZER: u128 = 10_000;

/// Extraction window `(offset, length)` for a square with `digits` digits.
fn extraction_window(digits: u32) -> Option<(u32, u32)> {
    match digits {
        12 => Some((4, 4)),
        10 | 11 => Some((3, 4)),
        8 | 9 => Some((2, 4)),
        7 => Some((1, 4)),
        6 => Some((0, 4)),
        5 => Some((0, 3)),
        4 => Some((0, 2)),
        3 => Some((0, 1)),
        _ => None,
    }
}

/// Digits `[offset, offset + len)` of `value`, counted from the most
/// significant digit.
fn extract(value: u128, digits: u32, offset: u32, len: u32) -> u64 {
    let drop = digits - offset - len;
    ((value / 10u128.pow(drop)) % 10u128.pow(len)) as u64
}

/// Middle-square generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiddleSquare {
    seed: u64,
    range: Option<ScaleRange>,
}

impl MiddleSquare {
    /// `seed` must be positive; zero is a fixed point with nothing to extract.
    pub fn new(seed: u64) -> Result<Self, GeneratorError> {
        if seed == 0 {
            return Err(GeneratorError::invalid(
                "seed",
                "middle-square seed must be positive (0 squares to itself)",
            ));
        }
        Ok(Self { seed, range: None })
    }

    /// Also emit `Ni` scaled into `range`.
    pub fn with_range(mut self, range: ScaleRange) -> Result<Self, GeneratorError> {
        range.validate()?;
        self.range = Some(range);
        Ok(self)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl SequenceGenerator for MiddleSquare {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::MiddleSquare
    }

    fn generate(&self, count: usize) -> Sequence {
        let mut sequence = Sequence::with_capacity(GeneratorKind::MiddleSquare, count);
        let mut xi = self.seed;

        for index in 1..=count {
            let square = u128::from(xi) * u128::from(xi);
            let digits = decimal_digits(square);
            let Some((offset, len)) = extraction_window(digits) else {
                sequence.degeneracy = Some(Degeneracy::ExtractionExhausted {
                    step: index,
                    square_digits: digits,
                });
                break;
            };

            let extracted = extract(square, digits, offset, len);
            let ri = truncate_ratio(u128::from(extracted), NORMALIZER, PRECISION);
            sequence.records.push(SequenceRecord {
                index,
                xi,
                trace: Some(MiddleSquareTrace {
                    square,
                    digits,
                    extracted,
                }),
                ri,
                ni: self.range.map(|r| r.scale(ri)),
            });

            if extracted == xi {
                sequence.degeneracy = Some(Degeneracy::FixedPoint {
                    step: index,
                    state: xi,
                });
                break;
            }
            xi = extracted;
        }

        sequence
    }
}
