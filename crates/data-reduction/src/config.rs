//! Reduction Configuration

use crate::error::ReductionError;
use serde::{Deserialize, Serialize};

/// What to do with a drop fraction outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FractionPolicy {
    /// Clamp into [0, 1]
    #[default]
    Clamp,
    /// Fail with [`ReductionError::InvalidFraction`]
    Reject,
}

/// Reduction configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReductionConfig {
    /// Fraction of records to DROP (0 keeps everything, 1 drops everything)
    pub drop_fraction: f64,
    /// Handling of out-of-range fractions
    pub policy: FractionPolicy,
}

impl ReductionConfig {
    /// Drop the given fraction of records
    pub fn drop(drop_fraction: f64) -> Self {
        Self {
            drop_fraction,
            ..Default::default()
        }
    }

    /// Keep the given fraction of records. Stored as the complementary drop
    /// fraction; [`crate::drop_count`] absorbs the subtraction's rounding error.
    pub fn keep(keep_fraction: f64) -> Self {
        Self::drop(1.0 - keep_fraction)
    }

    /// Reject out-of-range fractions instead of clamping
    pub fn strict(mut self) -> Self {
        self.policy = FractionPolicy::Reject;
        self
    }

    /// Drop fraction after applying the policy
    pub fn effective_fraction(&self) -> Result<f64, ReductionError> {
        let f = self.drop_fraction;
        if f.is_nan() {
            return Err(ReductionError::InvalidFraction(f));
        }
        match self.policy {
            FractionPolicy::Clamp => Ok(f.clamp(0.0, 1.0)),
            FractionPolicy::Reject if (0.0..=1.0).contains(&f) => Ok(f),
            FractionPolicy::Reject => Err(ReductionError::InvalidFraction(f)),
        }
    }
}
