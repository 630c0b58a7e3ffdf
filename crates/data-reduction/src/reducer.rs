//! Randomized Volume Reducer

use crate::config::ReductionConfig;
use crate::error::ReductionError;
use feature_engine::FeatureList;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::debug;

/// Relative distance to an integer below which a product counts as that integer
const INTEGER_TOLERANCE: f64 = 1e-9;

/// Number of records removed from a list of `len` records: `floor(len * fraction)`.
///
/// Products within rounding noise of an integer snap to it, so
/// `ReductionConfig::keep(0.9)` drops exactly 10 of 100 records even though
/// `1.0 - 0.9` is slightly below 0.1 in binary floating point.
pub fn drop_count(len: usize, drop_fraction: f64) -> usize {
    let exact = len as f64 * drop_fraction;
    let nearest = exact.round();
    let count = if (exact - nearest).abs() <= INTEGER_TOLERANCE * nearest.max(1.0) {
        nearest
    } else {
        exact.floor()
    };
    (count.max(0.0) as usize).min(len)
}

/// Removes a uniformly random subset of a feature list.
///
/// The random source is owned by the reducer; share a reducer across threads
/// only behind a lock.
pub struct VolumeReducer<R = ChaCha20Rng> {
    config: ReductionConfig,
    rng: R,
}

impl VolumeReducer<ChaCha20Rng> {
    /// Reducer with a reproducible random stream
    pub fn seeded(config: ReductionConfig, seed: u64) -> Self {
        Self::with_rng(config, ChaCha20Rng::seed_from_u64(seed))
    }

    /// Reducer seeded from the operating system
    pub fn from_entropy(config: ReductionConfig) -> Self {
        Self::with_rng(config, ChaCha20Rng::from_entropy())
    }
}

impl<R: Rng> VolumeReducer<R> {
    /// Reducer drawing from a caller-supplied generator
    pub fn with_rng(config: ReductionConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &ReductionConfig {
        &self.config
    }

    /// Drop `floor(len * drop_fraction)` random records and re-sort the rest
    pub fn reduce(&mut self, input: &FeatureList) -> Result<FeatureList, ReductionError> {
        let fraction = self.config.effective_fraction()?;
        if input.is_empty() {
            return Ok(FeatureList::new());
        }

        let dropped = drop_count(input.len(), fraction);
        let mut records = input.as_slice().to_vec();
        records.shuffle(&mut self.rng);
        records.drain(..dropped);

        debug!(
            "Reduced {} records to {} (dropped {}, fraction {})",
            input.len(),
            records.len(),
            dropped,
            fraction
        );
        Ok(FeatureList::from_unsorted(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FractionPolicy;
    use feature_engine::{FeatureExtractor, FeatureRecord};
    use proptest::prelude::*;
    use volume_grid::{Dimensions, VolumeGrid};

    fn synthetic(len: usize) -> FeatureList {
        let records = (0..len as u64)
            .map(|i| FeatureRecord {
                voxel_index: i * 3 + 1,
                values: [i as f32, i as f32 * 0.5, 1.0 / (i as f32 + 1.0), -(i as f32)],
            })
            .collect();
        FeatureList::from_unsorted(records)
    }

    #[test]
    fn test_drop_count_floors() {
        assert_eq!(drop_count(10, 0.25), 2);
        assert_eq!(drop_count(10, 0.0), 0);
        assert_eq!(drop_count(10, 1.0), 10);
        assert_eq!(drop_count(3, 0.5), 1);
    }

    #[test]
    fn test_fraction_means_dropped_share() {
        let input = synthetic(100);
        let mut reducer = VolumeReducer::seeded(ReductionConfig::drop(0.9), 1);
        assert_eq!(reducer.reduce(&input).unwrap().len(), 10);

        let mut reducer = VolumeReducer::seeded(ReductionConfig::keep(0.75), 1);
        assert_eq!(reducer.reduce(&input).unwrap().len(), 75);
    }

    #[test]
    fn test_keep_fraction_is_exact() {
        let input = synthetic(100);
        for (keep, expected) in [(0.9, 90), (0.7, 70), (0.3, 30), (0.1, 10), (0.99, 99)] {
            let mut reducer = VolumeReducer::seeded(ReductionConfig::keep(keep), 2);
            assert_eq!(reducer.reduce(&input).unwrap().len(), expected, "keep {}", keep);
        }
        assert_eq!(drop_count(100, 1.0 - 0.9), 10);
        // genuine fractional products still floor
        assert_eq!(drop_count(7, 0.5), 3);
        assert_eq!(drop_count(1000, 0.0995), 99);
    }

    #[test]
    fn test_empty_input() {
        let mut reducer = VolumeReducer::seeded(ReductionConfig::drop(0.5), 7);
        assert!(reducer.reduce(&FeatureList::new()).unwrap().is_empty());
    }

    #[test]
    fn test_zero_fraction_is_identity() {
        let input = synthetic(50);
        let mut reducer = VolumeReducer::seeded(ReductionConfig::drop(0.0), 3);
        assert_eq!(reducer.reduce(&input).unwrap(), input);
    }

    #[test]
    fn test_same_seed_same_subset() {
        let input = synthetic(200);
        let config = ReductionConfig::drop(0.5);
        let a = VolumeReducer::seeded(config, 42).reduce(&input).unwrap();
        let b = VolumeReducer::seeded(config, 42).reduce(&input).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_strict_policy_rejects() {
        let mut reducer = VolumeReducer::seeded(ReductionConfig::drop(2.0).strict(), 0);
        assert_eq!(
            reducer.reduce(&synthetic(4)),
            Err(ReductionError::InvalidFraction(2.0))
        );
        assert_eq!(reducer.config().policy, FractionPolicy::Reject);
    }

    #[test]
    fn test_reduces_extracted_features() {
        let grid = VolumeGrid::from_fn_u16(Dimensions::new(8, 8, 8), |x, y, z| (x * y * z) as u16)
            .unwrap();
        let features = FeatureExtractor::default().extract(&grid).unwrap();
        let mut reducer = VolumeReducer::seeded(ReductionConfig::drop(0.5), 11);
        let reduced = reducer.reduce(&features).unwrap();

        assert_eq!(reduced.len(), 216 - 108);
        assert!(reduced.is_sorted());
    }

    proptest! {
        #[test]
        fn reduction_size_and_verbatim_retention(
            len in 1usize..300, fraction in 0.0f64..=1.0, seed in any::<u64>(),
        ) {
            let input = synthetic(len);
            let mut reducer = VolumeReducer::seeded(ReductionConfig::drop(fraction), seed);
            let output = reducer.reduce(&input).unwrap();

            prop_assert_eq!(output.len(), len - drop_count(len, fraction));
            prop_assert!(output.len() <= input.len());
            prop_assert!(output
                .as_slice()
                .windows(2)
                .all(|w| w[0].voxel_index < w[1].voxel_index));
            for record in &output {
                let original = input.iter().find(|r| r.voxel_index == record.voxel_index);
                prop_assert!(original.is_some());
                let original = original.unwrap();
                prop_assert_eq!(original.voxel_index, record.voxel_index);
                for (a, b) in original.values.iter().zip(record.values.iter()) {
                    prop_assert_eq!(a.to_bits(), b.to_bits());
                }
            }
        }

        #[test]
        fn size_preserved_only_without_drops(len in 1usize..200, fraction in 0.0f64..=1.0) {
            let input = synthetic(len);
            let output = VolumeReducer::seeded(ReductionConfig::drop(fraction), 5)
                .reduce(&input)
                .unwrap();
            prop_assert_eq!(output.len() == len, drop_count(len, fraction) == 0);
        }
    }
}
