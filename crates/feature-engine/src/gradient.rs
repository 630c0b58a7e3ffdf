//! Finite-Difference Gradients

use crate::neighborhood::Neighborhood;
use serde::{Deserialize, Serialize};

/// Finite-difference stencil used along each axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceScheme {
    /// `(v(+1) - v(-1)) / 2`
    #[default]
    Central,
    /// `v(+1) - v(0)`
    Forward,
    /// `v(0) - v(-1)`
    Backward,
}

/// Gradient vector at the center of a neighborhood
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Gradient {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Gradient {
    /// Estimate the gradient from axis-aligned neighbors at distance 1
    pub fn estimate(hood: &Neighborhood, scheme: DifferenceScheme) -> Self {
        let axis = |plus: f64, minus: f64| match scheme {
            DifferenceScheme::Central => (plus - minus) / 2.0,
            DifferenceScheme::Forward => plus - hood.center(),
            DifferenceScheme::Backward => hood.center() - minus,
        };

        Self {
            x: axis(hood.at(1, 0, 0), hood.at(-1, 0, 0)),
            y: axis(hood.at(0, 1, 0), hood.at(0, -1, 0)),
            z: axis(hood.at(0, 0, 1), hood.at(0, 0, -1)),
        }
    }

    /// Euclidean norm
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighborhood::NEIGHBORHOOD_SIZE;

    /// Neighborhood sampled from `f(dx, dy, dz)`
    fn sampled(f: impl Fn(f64, f64, f64) -> f64) -> Neighborhood {
        let mut samples = [0.0; NEIGHBORHOOD_SIZE];
        let mut i = 0;
        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    samples[i] = f(dx as f64, dy as f64, dz as f64);
                    i += 1;
                }
            }
        }
        Neighborhood::from_samples(samples)
    }

    #[test]
    fn test_unit_ramp_along_x() {
        let hood = sampled(|x, _, _| 2.0 + x);
        let g = Gradient::estimate(&hood, DifferenceScheme::Central);
        assert_eq!(g, Gradient { x: 1.0, y: 0.0, z: 0.0 });
        assert_eq!(g.magnitude(), 1.0);
    }

    #[test]
    fn test_diagonal_ramp_magnitude() {
        let hood = sampled(|x, y, z| 6.0 + x + y + z);
        let g = Gradient::estimate(&hood, DifferenceScheme::Central);
        assert!((g.magnitude() - 3f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_one_sided_schemes() {
        // quadratic in x: forward and backward differ, central averages them
        let hood = sampled(|x, _, _| (x + 1.0) * (x + 1.0));
        let forward = Gradient::estimate(&hood, DifferenceScheme::Forward);
        let backward = Gradient::estimate(&hood, DifferenceScheme::Backward);
        let central = Gradient::estimate(&hood, DifferenceScheme::Central);

        assert_eq!(forward.x, 3.0);
        assert_eq!(backward.x, 1.0);
        assert_eq!(central.x, 2.0);
        assert_eq!(forward.y, 0.0);
        assert_eq!(backward.z, 0.0);
    }
}
