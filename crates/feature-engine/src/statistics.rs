//! Neighborhood Statistics Computation

use crate::neighborhood::{Neighborhood, NEIGHBORHOOD_SIZE};
use serde::{Deserialize, Serialize};

/// How the squared deviations are normalized before taking the root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StdDevNormalization {
    /// `sqrt(sum((v - mean)^2))`, no division by the sample count.
    #[default]
    RootSumOfSquares,
    /// Textbook population deviation, `sqrt(sum((v - mean)^2) / 27)`
    Population,
}

/// Statistics over the 27 samples of a neighborhood
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NeighborhoodStatistics {
    /// Arithmetic mean of all 27 samples
    pub mean: f64,
    /// Deviation about the mean, normalized per [`StdDevNormalization`]
    pub std_dev: f64,
}

impl NeighborhoodStatistics {
    /// Compute mean and deviation of a neighborhood
    pub fn compute(hood: &Neighborhood, normalization: StdDevNormalization) -> Self {
        let n = NEIGHBORHOOD_SIZE as f64;
        let samples = hood.samples();

        let mean = samples.iter().sum::<f64>() / n;

        let mut m2 = 0.0;
        for &v in samples {
            let d = v - mean;
            m2 += d * d;
        }

        let std_dev = match normalization {
            StdDevNormalization::RootSumOfSquares => m2.sqrt(),
            StdDevNormalization::Population => (m2 / n).sqrt(),
        };

        Self { mean, std_dev }
    }
}
