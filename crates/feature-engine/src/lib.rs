//! Feature Engineering Engine
//!
//! Extracts a fixed-width feature vector (intensity, local average, local
//! standard deviation, gradient magnitude) for every interior voxel of a grid.

mod features;
mod gradient;
mod neighborhood;
mod statistics;

pub use features::{
    ExtractError, ExtractorConfig, FeatureChannel, FeatureExtractor, FeatureList, FeatureRecord,
    UnsortedRecords, FEATURE_CHANNELS,
};
pub use gradient::{DifferenceScheme, Gradient};
pub use neighborhood::{Neighborhood, NEIGHBORHOOD_SIZE};
pub use statistics::{NeighborhoodStatistics, StdDevNormalization};
