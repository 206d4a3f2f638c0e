//! Recurrence-based sequence generators.
//!
//! Every generator implements [`SequenceGenerator`]. Construction validates the
//! parameters once; [`SequenceGenerator::generate`] is then total and
//! deterministic: the same parameters always reproduce the same sequence.

mod linear;
mod middle_square;
mod multiplicative;

pub use linear::LinearCongruential;
pub use middle_square::MiddleSquare;
pub use multiplicative::MultiplicativeCongruential;

use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;
use crate::sequence::{ScaleRange, Sequence};

/// Largest supported modulus exponent: `m = 2^g` must fit in a `u64`.
pub const MAX_MODULUS_EXPONENT: u32 = 63;

/// Generator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    MiddleSquare,
    LinearCongruential,
    MultiplicativeCongruential,
}

impl GeneratorKind {
    pub const ALL: [GeneratorKind; 3] = [
        Self::MiddleSquare,
        Self::LinearCongruential,
        Self::MultiplicativeCongruential,
    ];

    /// Parse a user-facing method name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "middle_square" | "middlesquare" | "ms" | "cuadrados" => Some(Self::MiddleSquare),
            "linear_congruential" | "linear" | "lcg" => Some(Self::LinearCongruential),
            "multiplicative_congruential" | "multiplicative" | "mcg" => {
                Some(Self::MultiplicativeCongruential)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MiddleSquare => write!(f, "middle_square"),
            Self::LinearCongruential => write!(f, "linear_congruential"),
            Self::MultiplicativeCongruential => write!(f, "multiplicative_congruential"),
        }
    }
}

/// Trait that every generator implements.
pub trait SequenceGenerator: Send + Sync {
    fn kind(&self) -> GeneratorKind;

    /// Produce up to `count` records. Fewer records means the recurrence
    /// degenerated; the returned [`Sequence`] says why.
    fn generate(&self, count: usize) -> Sequence;
}

/// Parameters for one generator call, tagged by method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum GeneratorParameters {
    #[serde(alias = "middle-square", alias = "cuadrados")]
    MiddleSquare {
        seed: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<ScaleRange>,
    },
    #[serde(alias = "linear", alias = "lcg")]
    LinearCongruential { x0: u64, k: u64, c: u64, g: u32 },
    #[serde(alias = "multiplicative", alias = "mcg")]
    MultiplicativeCongruential { x0: u64, t: u64, g: u32 },
}

impl GeneratorParameters {
    pub fn kind(&self) -> GeneratorKind {
        match self {
            Self::MiddleSquare { .. } => GeneratorKind::MiddleSquare,
            Self::LinearCongruential { .. } => GeneratorKind::LinearCongruential,
            Self::MultiplicativeCongruential { .. } => GeneratorKind::MultiplicativeCongruential,
        }
    }

    /// Validate and build the generator.
    pub fn build(&self) -> Result<Box<dyn SequenceGenerator>, GeneratorError> {
        Ok(match *self {
            Self::MiddleSquare { seed, range } => {
                let generator = MiddleSquare::new(seed)?;
                match range {
                    Some(range) => Box::new(generator.with_range(range)?),
                    None => Box::new(generator),
                }
            }
            Self::LinearCongruential { x0, k, c, g } => {
                Box::new(LinearCongruential::new(x0, k, c, g)?)
            }
            Self::MultiplicativeCongruential { x0, t, g } => {
                Box::new(MultiplicativeCongruential::new(x0, t, g)?)
            }
        })
    }
}

/// Build the generator described by `params` and run it for `count` steps.
pub fn generate(params: &GeneratorParameters, count: usize) -> Result<Sequence, GeneratorError> {
    let sequence = params.build()?.generate(count);
    if let Some(degeneracy) = sequence.degeneracy {
        log::debug!(
            "{} stopped after {}/{} records: {degeneracy}",
            sequence.method,
            sequence.len(),
            count
        );
    }
    Ok(sequence)
}

/// `m = 2^g` for `g` in `min..=MAX_MODULUS_EXPONENT`.
fn power_of_two_modulus(g: u32, min: u32) -> Result<u64, GeneratorError> {
    if !(min..=MAX_MODULUS_EXPONENT).contains(&g) {
        return Err(GeneratorError::invalid(
            "g",
            format!("modulus exponent must be in {min}..={MAX_MODULUS_EXPONENT}, got {g}"),
        ));
    }
    Ok(1u64 << g)
}
