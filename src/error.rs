use thiserror::Error;

use crate::body::BodyPart;

pub type Result<T> = std::result::Result<T, SimError>;

/// Everything the simulator can refuse to do.
///
/// None of these are retried inside the crate. A failed sample is discarded whole.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// A user supplied value lies outside the model's validity range.
    /// Raised before any computation starts.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f32,
        reason: &'static str,
    },

    /// Two stages disagree on how many samples a curve or trajectory holds.
    #[error("{what}: expected {expected} samples, got {actual}")]
    ArityMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A body part landed outside the allocated range window.
    #[error("{part:?} at pulse {pulse} falls in range bin {bin}, outside [0, {bins})")]
    IndexOutOfRange {
        part: BodyPart,
        pulse: usize,
        bin: i64,
        bins: usize,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl SimError {
    pub(crate) fn invalid(name: &'static str, value: f32, reason: &'static str) -> SimError {
        SimError::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

// Checks a strictly positive, finite value.
pub(crate) fn require_positive(name: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() && value > 0. {
        Ok(value)
    } else {
        Err(SimError::invalid(name, value, "must be positive and finite"))
    }
}
