//! Feature Record Assembly

use crate::gradient::{DifferenceScheme, Gradient};
use crate::neighborhood::Neighborhood;
use crate::statistics::{NeighborhoodStatistics, StdDevNormalization};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use volume_grid::{SampleFormat, VolumeGrid, VoxelIndex};

/// Number of feature channels per voxel
pub const FEATURE_CHANNELS: usize = 4;

/// Slot of each feature inside [`FeatureRecord::values`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureChannel {
    Intensity = 0,
    Average = 1,
    StdDev = 2,
    GradientMagnitude = 3,
}

/// Derived measurements of one voxel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub voxel_index: VoxelIndex,
    /// `[intensity, average, std_dev, gradient_magnitude]`
    pub values: [f32; FEATURE_CHANNELS],
}

impl FeatureRecord {
    pub fn get(&self, channel: FeatureChannel) -> f32 {
        self.values[channel as usize]
    }
}

/// Feature records ordered by ascending voxel index.
///
/// Serializes as a plain sequence of records; deserialization rejects
/// sequences whose voxel indices decrease.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FeatureRecord>", into = "Vec<FeatureRecord>")]
pub struct FeatureList {
    records: Vec<FeatureRecord>,
}

/// A record sequence that breaks ascending voxel index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Record {position} breaks ascending voxel order")]
pub struct UnsortedRecords {
    /// Position of the first record whose index is below its predecessor's
    pub position: usize,
}

impl FeatureList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of records in any order and sort them by voxel index
    pub fn from_unsorted(mut records: Vec<FeatureRecord>) -> Self {
        records.sort_unstable_by_key(|r| r.voxel_index);
        Self { records }
    }

    /// Whether voxel indices are non-decreasing
    pub fn is_sorted(&self) -> bool {
        self.records
            .windows(2)
            .all(|w| w[0].voxel_index <= w[1].voxel_index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeatureRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[FeatureRecord] {
        &self.records
    }

    pub fn into_vec(self) -> Vec<FeatureRecord> {
        self.records
    }
}

impl TryFrom<Vec<FeatureRecord>> for FeatureList {
    type Error = UnsortedRecords;

    /// Accept records already in ascending voxel index order
    fn try_from(records: Vec<FeatureRecord>) -> Result<Self, Self::Error> {
        match records
            .windows(2)
            .position(|w| w[1].voxel_index < w[0].voxel_index)
        {
            Some(i) => Err(UnsortedRecords { position: i + 1 }),
            None => Ok(Self { records }),
        }
    }
}

impl From<FeatureList> for Vec<FeatureRecord> {
    fn from(list: FeatureList) -> Self {
        list.records
    }
}

impl<'a> IntoIterator for &'a FeatureList {
    type Item = &'a FeatureRecord;
    type IntoIter = std::slice::Iter<'a, FeatureRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Errors during feature extraction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// Grid samples are not 16-bit unsigned integers
    #[error("Unsupported sample format: {0} (expected uint16)")]
    UnsupportedSampleFormat(SampleFormat),
}

/// Extraction options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub normalization: StdDevNormalization,
    pub scheme: DifferenceScheme,
}

/// Computes one feature record per interior voxel
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: ExtractorConfig,
}

impl FeatureExtractor {
    /// Create a new feature extractor
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract features for every voxel with a full 3x3x3 neighborhood.
    ///
    /// Boundary voxels are never emitted. A grid thinner than 3 samples on any
    /// axis yields an empty list.
    pub fn extract(&self, grid: &VolumeGrid) -> Result<FeatureList, ExtractError> {
        let volume = grid
            .as_u16()
            .ok_or(ExtractError::UnsupportedSampleFormat(grid.format()))?;
        let dims = grid.dimensions();

        if !dims.has_interior() {
            debug!("Grid {} has no interior voxels", dims);
            return Ok(FeatureList::new());
        }

        let mut records = Vec::with_capacity(dims.interior_count());
        for x in 1..dims.x - 1 {
            for y in 1..dims.y - 1 {
                for z in 1..dims.z - 1 {
                    let hood = Neighborhood::gather(volume, x, y, z);
                    records.push(FeatureRecord {
                        voxel_index: dims.calc_pos(x, y, z),
                        values: self.measure(&hood),
                    });
                }
            }
        }

        let list = FeatureList::from_unsorted(records);
        info!("Extracted {} feature records from {} grid", list.len(), dims);
        Ok(list)
    }

    /// Feature vector of one neighborhood
    pub fn measure(&self, hood: &Neighborhood) -> [f32; FEATURE_CHANNELS] {
        let stats = NeighborhoodStatistics::compute(hood, self.config.normalization);
        let gradient = Gradient::estimate(hood, self.config.scheme);
        [
            hood.center() as f32,
            stats.mean as f32,
            stats.std_dev as f32,
            gradient.magnitude() as f32,
        ]
    }
}
