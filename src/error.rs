//! Error types for input validation and quote generation.

use thiserror::Error;

/// An input record was rejected before the pipeline started.
///
/// These are the caller's responsibility to have caught, but every engine
/// entry point re-checks them so that no stage ever sees a missing size
/// metric or a negative magnitude.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// None of the recognized size metrics was present and non-zero.
    #[error("{vertical}: no size metric given (need one of units, beds, racks, bays, square_feet)")]
    MissingSizeMetric {
        /// Vertical key the input was declared for.
        vertical: String,
    },
    /// A magnitude that must be `>= 0` was negative.
    #[error("{field} must be >= 0, got {value}")]
    Negative {
        /// Dotted field path.
        field: String,
        /// Offending value.
        value: f64,
    },
    /// A magnitude was NaN or infinite.
    #[error("{field} must be a finite number")]
    NonFinite {
        /// Dotted field path.
        field: String,
    },
    /// A rate or fraction fell outside its allowed range.
    #[error("{field} {message}")]
    OutOfRange {
        /// Dotted field path.
        field: String,
        /// Constraint description.
        message: String,
    },
}

impl ValidationError {
    /// Dotted path of the offending field.
    pub fn field(&self) -> &str {
        match self {
            Self::MissingSizeMetric { .. } => "facility",
            Self::Negative { field, .. }
            | Self::NonFinite { field }
            | Self::OutOfRange { field, .. } => field,
        }
    }

    pub(crate) fn out_of_range(field: &str, message: impl Into<String>) -> Self {
        Self::OutOfRange {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Checks that `value` is finite and non-negative.
///
/// # Errors
///
/// Returns [`ValidationError::NonFinite`] or [`ValidationError::Negative`].
pub fn ensure_non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite {
            field: field.to_string(),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// Checks that `value` lies in the closed unit interval.
///
/// # Errors
///
/// Returns a [`ValidationError`] if `value` is non-finite or outside `[0, 1]`.
pub fn ensure_fraction(field: &str, value: f64) -> Result<(), ValidationError> {
    ensure_non_negative(field, value)?;
    if value > 1.0 {
        return Err(ValidationError::out_of_range(field, "must be in [0.0, 1.0]"));
    }
    Ok(())
}

/// Failure of [`crate::quote::generate_quote`].
#[derive(Debug, Error)]
pub enum QuoteError {
    /// The request was rejected before any stage ran.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    /// A derived invariant did not hold after a stage completed.
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}
