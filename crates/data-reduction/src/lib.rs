//! Volume Reduction
//!
//! Drops a uniformly random subset of a feature list and restores voxel index
//! order on what remains.

mod config;
mod error;
mod reducer;

pub use config::{FractionPolicy, ReductionConfig};
pub use error::ReductionError;
pub use reducer::{drop_count, VolumeReducer};
