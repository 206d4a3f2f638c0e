//! # prngbench-core
//!
//! Deterministic pseudorandom sequences from three classical recurrences:
//! middle-square, linear congruential and multiplicative congruential.
//!
//! ## Quick Start
//!
//! ```
//! use prngbench_core::{GeneratorParameters, generate};
//!
//! let params = GeneratorParameters::LinearCongruential { x0: 37, k: 5, c: 7, g: 12 };
//! let sequence = generate(&params, 100).unwrap();
//! assert_eq!(sequence.len(), 100);
//!
//! // Normalized values in [0, 1), ready for the test battery.
//! let values = sequence.values();
//! assert!(values.iter().all(|r| (0.0..1.0).contains(r)));
//! ```
//!
//! ## Architecture
//!
//! Parameters → Generator (validated once) → Sequence (records + degeneracy flag)
//!
//! Every generator implements [`SequenceGenerator`]. Identical parameters always
//! reproduce an identical sequence; there is no external entropy anywhere.
//! Normalized values are truncated to 5 decimals, never rounded.
//!
//! A middle-square sequence may come back shorter than requested. That is a
//! normal result, flagged by [`Sequence::degeneracy`], not an error.

pub mod distributions;
pub mod error;
pub mod generators;
pub mod precision;
pub mod sequence;

pub use distributions::{NormalSample, normal, uniform};
pub use error::GeneratorError;
pub use generators::{
    GeneratorKind, GeneratorParameters, LinearCongruential, MiddleSquare,
    MultiplicativeCongruential, SequenceGenerator, generate,
};
pub use precision::{truncate, truncate5};
pub use sequence::{Degeneracy, MiddleSquareTrace, ScaleRange, Sequence, SequenceRecord};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
