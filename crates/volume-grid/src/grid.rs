//! Volume Grid Storage

use crate::{Dimensions, GridError, SampleFormat};
use byteorder::{ByteOrder, LittleEndian};
use ndarray::Array3;
use std::path::Path;
use tracing::debug;

/// Sample storage tagged by element type, indexed `[z, y, x]`
#[derive(Debug, Clone)]
enum SampleData {
    UInt8(Array3<u8>),
    UInt16(Array3<u16>),
    Float32(Array3<f32>),
}

/// Immutable dense 3D grid of scalar samples
#[derive(Debug, Clone)]
pub struct VolumeGrid {
    dimensions: Dimensions,
    data: SampleData,
}

impl VolumeGrid {
    /// Build a 16-bit grid from samples laid out x fastest, then y, then z
    pub fn from_u16(dimensions: Dimensions, samples: Vec<u16>) -> Result<Self, GridError> {
        let array = shaped(dimensions, samples)?;
        Ok(Self {
            dimensions,
            data: SampleData::UInt16(array),
        })
    }

    /// Build an 8-bit grid
    pub fn from_u8(dimensions: Dimensions, samples: Vec<u8>) -> Result<Self, GridError> {
        let array = shaped(dimensions, samples)?;
        Ok(Self {
            dimensions,
            data: SampleData::UInt8(array),
        })
    }

    /// Build a floating-point grid
    pub fn from_f32(dimensions: Dimensions, samples: Vec<f32>) -> Result<Self, GridError> {
        let array = shaped(dimensions, samples)?;
        Ok(Self {
            dimensions,
            data: SampleData::Float32(array),
        })
    }

    /// Build a 16-bit grid by evaluating `f(x, y, z)` at every cell
    pub fn from_fn_u16<F>(dimensions: Dimensions, mut f: F) -> Result<Self, GridError>
    where
        F: FnMut(usize, usize, usize) -> u16,
    {
        checked_count::<u16>(dimensions)?;
        let array = Array3::from_shape_fn(dimensions.shape(), |(z, y, x)| f(x, y, z));
        Ok(Self {
            dimensions,
            data: SampleData::UInt16(array),
        })
    }

    /// Decode a headerless little-endian raw volume
    pub fn from_raw_bytes(
        dimensions: Dimensions,
        format: SampleFormat,
        bytes: &[u8],
    ) -> Result<Self, GridError> {
        let count = checked_count::<u8>(dimensions)?;
        let expected = count
            .checked_mul(format.byte_width())
            .ok_or(GridError::TooLarge(dimensions))?;
        if bytes.len() != expected {
            return Err(GridError::SizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }

        match format {
            SampleFormat::UInt8 => Self::from_u8(dimensions, bytes.to_vec()),
            SampleFormat::UInt16 => {
                let mut samples = vec![0u16; count];
                LittleEndian::read_u16_into(bytes, &mut samples);
                Self::from_u16(dimensions, samples)
            }
            SampleFormat::Float32 => {
                let mut samples = vec![0f32; count];
                LittleEndian::read_f32_into(bytes, &mut samples);
                Self::from_f32(dimensions, samples)
            }
        }
    }

    /// Read a headerless raw volume file
    pub fn load_raw(
        path: impl AsRef<Path>,
        dimensions: Dimensions,
        format: SampleFormat,
    ) -> Result<Self, GridError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        debug!(
            "Loaded raw volume {}: {} bytes, {} {}",
            path.display(),
            bytes.len(),
            dimensions,
            format
        );
        Self::from_raw_bytes(dimensions, format, &bytes)
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn format(&self) -> SampleFormat {
        match self.data {
            SampleData::UInt8(_) => SampleFormat::UInt8,
            SampleData::UInt16(_) => SampleFormat::UInt16,
            SampleData::Float32(_) => SampleFormat::Float32,
        }
    }

    /// 16-bit samples, if that is the grid's element type
    pub fn as_u16(&self) -> Option<&Array3<u16>> {
        match &self.data {
            SampleData::UInt16(array) => Some(array),
            _ => None,
        }
    }

    /// Sample at `(x, y, z)` widened to f64. Panics outside the grid.
    pub fn value_at(&self, x: usize, y: usize, z: usize) -> f64 {
        match &self.data {
            SampleData::UInt8(a) => a[[z, y, x]] as f64,
            SampleData::UInt16(a) => a[[z, y, x]] as f64,
            SampleData::Float32(a) => a[[z, y, x]] as f64,
        }
    }
}

/// Cell count of a non-empty grid whose `T` storage stays within `isize::MAX` bytes
fn checked_count<T>(dimensions: Dimensions) -> Result<usize, GridError> {
    if dimensions.x == 0 || dimensions.y == 0 || dimensions.z == 0 {
        return Err(GridError::ZeroDimension);
    }
    let count = dimensions
        .checked_voxel_count()
        .ok_or(GridError::TooLarge(dimensions))?;
    match count.checked_mul(std::mem::size_of::<T>().max(1)) {
        Some(bytes) if bytes <= isize::MAX as usize => Ok(count),
        _ => Err(GridError::TooLarge(dimensions)),
    }
}

fn shaped<T>(dimensions: Dimensions, samples: Vec<T>) -> Result<Array3<T>, GridError> {
    let expected = checked_count::<T>(dimensions)?;
    if samples.len() != expected {
        return Err(GridError::SizeMismatch {
            expected,
            actual: samples.len(),
        });
    }
    Array3::from_shape_vec(dimensions.shape(), samples).map_err(|_| GridError::SizeMismatch {
        expected,
        actual: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_layout() {
        let dims = Dimensions::new(3, 2, 2);
        let samples: Vec<u16> = (0..12).collect();
        let grid = VolumeGrid::from_u16(dims, samples).unwrap();

        for z in 0..2 {
            for y in 0..2 {
                for x in 0..3 {
                    let expected = dims.calc_pos(x, y, z) as f64;
                    assert_eq!(grid.value_at(x, y, z), expected);
                }
            }
        }
    }

    #[test]
    fn test_size_mismatch() {
        let dims = Dimensions::new(3, 3, 3);
        let err = VolumeGrid::from_u16(dims, vec![0; 26]).unwrap_err();
        assert!(matches!(
            err,
            GridError::SizeMismatch {
                expected: 27,
                actual: 26
            }
        ));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let dims = Dimensions::new(0, 4, 4);
        assert!(matches!(
            VolumeGrid::from_u8(dims, vec![]),
            Err(GridError::ZeroDimension)
        ));
    }

    #[test]
    fn test_raw_u16_little_endian() {
        let dims = Dimensions::new(2, 1, 1);
        let bytes = [0x34, 0x12, 0xFF, 0x00];
        let grid = VolumeGrid::from_raw_bytes(dims, SampleFormat::UInt16, &bytes).unwrap();
        assert_eq!(grid.format(), SampleFormat::UInt16);
        assert_eq!(grid.value_at(0, 0, 0), 4660.0);
        assert_eq!(grid.value_at(1, 0, 0), 255.0);
    }

    #[test]
    fn test_raw_length_checked() {
        let dims = Dimensions::new(2, 2, 2);
        let result = VolumeGrid::from_raw_bytes(dims, SampleFormat::Float32, &[0u8; 31]);
        assert!(matches!(
            result,
            Err(GridError::SizeMismatch {
                expected: 32,
                actual: 31
            })
        ));
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        let huge = Dimensions::new(1 << 22, 1 << 22, 1 << 22);
        assert!(matches!(
            VolumeGrid::from_raw_bytes(huge, SampleFormat::UInt16, &[0; 8]),
            Err(GridError::TooLarge(d)) if d == huge
        ));
        assert!(matches!(
            VolumeGrid::from_fn_u16(huge, |_, _, _| 0),
            Err(GridError::TooLarge(_))
        ));
        assert!(matches!(
            VolumeGrid::from_u16(huge, vec![0; 8]),
            Err(GridError::TooLarge(_))
        ));

        // cell count fits in usize but the byte size does not
        let wide = Dimensions::new(1 << 21, 1 << 21, 1 << 21);
        assert!(matches!(
            VolumeGrid::from_raw_bytes(wide, SampleFormat::UInt16, &[0; 8]),
            Err(GridError::TooLarge(_))
        ));
        assert!(matches!(
            VolumeGrid::from_fn_u16(wide, |_, _, _| 0),
            Err(GridError::TooLarge(_))
        ));
    }

    #[test]
    fn test_as_u16_only_for_u16() {
        let dims = Dimensions::new(1, 1, 1);
        assert!(VolumeGrid::from_u16(dims, vec![7]).unwrap().as_u16().is_some());
        assert!(VolumeGrid::from_f32(dims, vec![7.0]).unwrap().as_u16().is_none());
    }
}
