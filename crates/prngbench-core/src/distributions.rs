//! Transforms from normalized values to other distributions.
//!
//! Inputs are values in `[0, 1)` as produced by the generators. Anything that
//! takes a logarithm first clamps its input away from 0 and 1.

use serde::Serialize;

use crate::error::GeneratorError;
use crate::precision::clamp_open_unit;
use crate::sequence::ScaleRange;

/// Uniform values on `[range.lower, range.upper]`, truncated to 5 decimals.
pub fn uniform(values: &[f64], range: ScaleRange) -> Result<Vec<f64>, GeneratorError> {
    range.validate()?;
    Ok(values.iter().map(|&ri| range.scale(ri)).collect())
}

/// One Box-Muller output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalSample {
    /// 1-based output index.
    pub index: usize,
    /// Standard normal deviate.
    pub z: f64,
    /// `mean + std_dev * z`.
    pub value: f64,
}

/// Normal deviates by Box-Muller over consecutive pairs `(u, v)`.
///
/// Produces `values.len() / 2` samples; an odd trailing value is unused.
pub fn normal(
    values: &[f64],
    mean: f64,
    std_dev: f64,
) -> Result<Vec<NormalSample>, GeneratorError> {
    if !mean.is_finite() {
        return Err(GeneratorError::invalid("mean", "must be finite"));
    }
    if !std_dev.is_finite() || std_dev <= 0.0 {
        return Err(GeneratorError::invalid(
            "std_dev",
            format!("must be positive and finite, got {std_dev}"),
        ));
    }

    Ok(values
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| {
            let u = clamp_open_unit(pair[0]);
            let v = clamp_open_unit(pair[1]);
            let z = (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos();
            NormalSample {
                index: i + 1,
                z,
                value: mean + std_dev * z,
            }
        })
        .collect())
}
