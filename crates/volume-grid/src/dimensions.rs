//! Grid Dimensions and Voxel Indexing

use crate::VoxelIndex;
use serde::{Deserialize, Serialize};

/// Extent of a grid along each axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Dimensions {
    /// Create dimensions from per-axis extents
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Total number of cells. Only meaningful for dimensions that passed
    /// [`Dimensions::checked_voxel_count`].
    pub fn voxel_count(&self) -> usize {
        self.x * self.y * self.z
    }

    /// Total number of cells, or `None` if the product overflows `usize`
    pub fn checked_voxel_count(&self) -> Option<usize> {
        self.x.checked_mul(self.y)?.checked_mul(self.z)
    }

    /// Canonical index of the cell at `(x, y, z)`: x varies fastest, z slowest
    pub fn calc_pos(&self, x: usize, y: usize, z: usize) -> VoxelIndex {
        (z * self.x * self.y + y * self.x + x) as VoxelIndex
    }

    /// Inverse of [`Dimensions::calc_pos`]
    pub fn coords(&self, index: VoxelIndex) -> (usize, usize, usize) {
        let index = index as usize;
        let plane = self.x * self.y;
        let z = index / plane;
        let rem = index % plane;
        (rem % self.x, rem / self.x, z)
    }

    /// Whether every axis leaves room for a full 3x3x3 neighborhood
    pub fn has_interior(&self) -> bool {
        self.x >= 3 && self.y >= 3 && self.z >= 3
    }

    /// Number of cells at least one step away from every boundary
    pub fn interior_count(&self) -> usize {
        if !self.has_interior() {
            return 0;
        }
        (self.x - 2) * (self.y - 2) * (self.z - 2)
    }

    /// Shape in ndarray order `(z, y, x)`
    pub(crate) fn shape(&self) -> (usize, usize, usize) {
        (self.z, self.y, self.x)
    }
}

impl From<[usize; 3]> for Dimensions {
    fn from(dims: [usize; 3]) -> Self {
        Self::new(dims[0], dims[1], dims[2])
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}
