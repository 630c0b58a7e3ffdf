//! 3x3x3 Voxel Neighborhood

use ndarray::Array3;

/// Number of samples in a full neighborhood, center included
pub const NEIGHBORHOOD_SIZE: usize = 27;

/// Samples surrounding one interior voxel, addressed by offsets in {-1, 0, 1}
#[derive(Debug, Clone, PartialEq)]
pub struct Neighborhood {
    samples: [f64; NEIGHBORHOOD_SIZE],
}

impl Neighborhood {
    /// Gather the neighborhood of `(x, y, z)` from a `[z, y, x]` array.
    ///
    /// The caller keeps the coordinate within `1..=dim-2` on each axis.
    pub fn gather(volume: &Array3<u16>, x: usize, y: usize, z: usize) -> Self {
        let mut samples = [0.0; NEIGHBORHOOD_SIZE];
        let mut i = 0;
        for zz in z - 1..=z + 1 {
            for yy in y - 1..=y + 1 {
                for xx in x - 1..=x + 1 {
                    samples[i] = volume[[zz, yy, xx]] as f64;
                    i += 1;
                }
            }
        }
        Self { samples }
    }

    /// Build directly from samples ordered x fastest, then y, then z
    pub fn from_samples(samples: [f64; NEIGHBORHOOD_SIZE]) -> Self {
        Self { samples }
    }

    /// Sample at offset `(dx, dy, dz)` from the center
    pub fn at(&self, dx: i8, dy: i8, dz: i8) -> f64 {
        debug_assert!((-1..=1).contains(&dx) && (-1..=1).contains(&dy) && (-1..=1).contains(&dz));
        let i = (dz + 1) as usize * 9 + (dy + 1) as usize * 3 + (dx + 1) as usize;
        self.samples[i]
    }

    pub fn center(&self) -> f64 {
        self.at(0, 0, 0)
    }

    pub fn samples(&self) -> &[f64; NEIGHBORHOOD_SIZE] {
        &self.samples
    }
}
