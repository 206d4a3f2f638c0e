//! Generated sequences and their per-step records.

use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;
use crate::generators::GeneratorKind;
use crate::precision::truncate5;

/// Digit bookkeeping for one middle-square step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MiddleSquareTrace {
    /// `Xi²`.
    pub square: u128,
    /// Decimal digit count of `Xi²`.
    pub digits: u32,
    /// Block extracted from the square; becomes the next state.
    pub extracted: u64,
}

/// One generated step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceRecord {
    /// 1-based position in the sequence.
    pub index: usize,
    /// Internal state `Xi` for this step.
    pub xi: u64,
    /// Middle-square digit trace (absent for congruential generators).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<MiddleSquareTrace>,
    /// Normalized value in `[0, 1)`, truncated to 5 decimals.
    pub ri: f64,
    /// `ri` mapped into a caller-supplied interval, truncated to 5 decimals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ni: Option<f64>,
}

/// Why a sequence stopped before reaching the requested length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degeneracy {
    /// The square at `step` had a digit count with no extraction window.
    ExtractionExhausted { step: usize, square_digits: u32 },
    /// The state at `step` maps onto itself.
    FixedPoint { step: usize, state: u64 },
}

impl std::fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExtractionExhausted {
                step,
                square_digits,
            } => write!(
                f,
                "no digits can be extracted at step {step} (square has {square_digits} digits)"
            ),
            Self::FixedPoint { step, state } => {
                write!(f, "fixed point {state} reached at step {step}")
            }
        }
    }
}

/// Closed interval used to scale `Ri` into `Ni`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub lower: f64,
    pub upper: f64,
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self {
            lower: 0.0,
            upper: 10.0,
        }
    }
}

impl ScaleRange {
    /// Validated constructor; `lower` must be strictly below `upper`.
    pub fn new(lower: f64, upper: f64) -> Result<Self, GeneratorError> {
        let range = Self { lower, upper };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), GeneratorError> {
        if !self.lower.is_finite() || !self.upper.is_finite() {
            return Err(GeneratorError::invalid("range", "bounds must be finite"));
        }
        if self.lower >= self.upper {
            return Err(GeneratorError::invalid(
                "range",
                format!(
                    "lower bound {} must be below upper bound {}",
                    self.lower, self.upper
                ),
            ));
        }
        Ok(())
    }

    /// `lower + (upper - lower) * ri`, truncated to 5 decimals.
    pub fn scale(&self, ri: f64) -> f64 {
        truncate5(self.lower + (self.upper - self.lower) * ri)
    }
}

/// Output of one generator call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sequence {
    pub method: GeneratorKind,
    /// Number of records the caller asked for.
    pub requested: usize,
    pub records: Vec<SequenceRecord>,
    /// Set when generation stopped early.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degeneracy: Option<Degeneracy>,
}

impl Sequence {
    pub(crate) fn with_capacity(method: GeneratorKind, requested: usize) -> Self {
        Self {
            method,
            requested,
            // Middle-square sequences rarely live long; don't trust `requested`.
            records: Vec::with_capacity(requested.min(1 << 16)),
            degeneracy: None,
        }
    }

    /// The normalized values, in order. This is what the test battery consumes.
    pub fn values(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.ri).collect()
    }

    /// Scaled values, for records that carry one.
    pub fn scaled_values(&self) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.ni).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_degenerate(&self) -> bool {
        self.degeneracy.is_some()
    }

    /// True when every requested record was produced.
    pub fn is_complete(&self) -> bool {
        self.records.len() == self.requested
    }

    /// Fill `ni` on every record by mapping `ri` into `range`.
    pub fn scale_into(&mut self, range: ScaleRange) -> Result<(), GeneratorError> {
        let scaled = crate::distributions::uniform(&self.values(), range)?;
        for (record, ni) in self.records.iter_mut().zip(scaled) {
            record.ni = Some(ni);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: usize, ri: f64) -> SequenceRecord {
        SequenceRecord {
            index,
            xi: index as u64,
            trace: None,
            ri,
            ni: None,
        }
    }

    #[test]
    fn scale_range_rejects_inverted_bounds() {
        assert!(ScaleRange::new(5.0, 5.0).is_err());
        assert!(ScaleRange::new(10.0, 0.0).is_err());
        assert!(ScaleRange::new(f64::NAN, 1.0).is_err());
        assert!(ScaleRange::new(0.0, 10.0).is_ok());
    }

    #[test]
    fn scale_truncates() {
        let range = ScaleRange::new(0.0, 2.0).unwrap();
        // 2 * 0.123456 = 0.246912
        assert_eq!(range.scale(0.123456), 0.24691);
        assert_eq!(range.scale(0.5), 1.0);
        assert_eq!(ScaleRange::default().scale(0.5), 5.0);
    }

    #[test]
    fn scale_into_fills_every_record() {
        let mut seq = Sequence::with_capacity(GeneratorKind::LinearCongruential, 2);
        seq.records.push(record(1, 0.25));
        seq.records.push(record(2, 0.75));
        seq.scale_into(ScaleRange::new(10.0, 20.0).unwrap()).unwrap();
        assert_eq!(seq.scaled_values(), vec![12.5, 17.5]);
        assert!(seq.is_complete());
        assert!(!seq.is_degenerate());
    }

    #[test]
    fn scale_into_rejects_inverted_range_without_touching_records() {
        let mut seq = Sequence::with_capacity(GeneratorKind::LinearCongruential, 1);
        seq.records.push(record(1, 0.25));
        let inverted = ScaleRange {
            lower: 5.0,
            upper: 1.0,
        };
        assert!(seq.scale_into(inverted).is_err());
        assert!(seq.scaled_values().is_empty());
    }

    #[test]
    fn degeneracy_display_mentions_step() {
        let d = Degeneracy::FixedPoint {
            step: 4,
            state: 3792,
        };
        assert!(d.to_string().contains("step 4"));
        let d = Degeneracy::ExtractionExhausted {
            step: 1,
            square_digits: 13,
        };
        assert!(d.to_string().contains("13 digits"));
    }
}
