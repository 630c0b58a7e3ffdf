//! Reduction Error Types

use thiserror::Error;

/// Errors during volume reduction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReductionError {
    /// Drop fraction is NaN, or outside [0, 1] under [`crate::FractionPolicy::Reject`]
    #[error("Drop fraction {0} is outside [0, 1]")]
    InvalidFraction(f64),
}
