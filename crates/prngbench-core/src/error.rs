//! Error type for generator construction.

use thiserror::Error;

/// Errors raised while validating generator or transform parameters.
///
/// Short sequences are not errors: a generator that collapses early returns a
/// [`Sequence`](crate::Sequence) carrying a [`Degeneracy`](crate::Degeneracy).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneratorError {
    /// A parameter is outside the domain the recurrence supports.
    #[error("invalid parameter `{parameter}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl GeneratorError {
    pub(crate) fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_parameter() {
        let err = GeneratorError::invalid("seed", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid parameter `seed`: must be positive"
        );
    }
}
