//! Volume Grid
//!
//! Dense 3D grids of scalar samples, addressed by coordinate triple or by the
//! canonical voxel index `z * nx * ny + y * nx + x`.

mod dimensions;
mod error;
mod grid;

pub use dimensions::Dimensions;
pub use error::GridError;
pub use grid::VolumeGrid;

use serde::{Deserialize, Serialize};

/// Canonical identifier of a grid cell
pub type VoxelIndex = u64;

/// Element type of the samples stored in a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleFormat {
    #[serde(rename = "uint8")]
    UInt8,
    #[serde(rename = "uint16")]
    UInt16,
    #[serde(rename = "float32")]
    Float32,
}

impl SampleFormat {
    /// Size of one sample in a raw volume file
    pub fn byte_width(self) -> usize {
        match self {
            SampleFormat::UInt8 => 1,
            SampleFormat::UInt16 => 2,
            SampleFormat::Float32 => 4,
        }
    }
}

impl std::fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SampleFormat::UInt8 => "uint8",
            SampleFormat::UInt16 => "uint16",
            SampleFormat::Float32 => "float32",
        };
        f.write_str(name)
    }
}
