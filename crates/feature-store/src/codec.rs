//! Feature List Codecs
//!
//! The fixed-width layout is a little-endian `u64` record count followed by
//! one 24-byte record per voxel: `u64` voxel index, then four `f32` values.
//! Records appear in ascending voxel index order.

use crate::StorageError;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use feature_engine::{FeatureList, FeatureRecord, FEATURE_CHANNELS};
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};

/// Size of one record in the fixed-width layout
pub const RECORD_BYTES: usize = 8 + 4 * FEATURE_CHANNELS;

/// Upper bound on up-front allocation when the count comes from untrusted input
const MAX_PREALLOCATED: u64 = 1 << 20;

/// On-disk representation of a feature list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Length-prefixed fixed-width records
    #[default]
    Fixed,
    /// postcard varint encoding
    Compact,
}

/// Write a feature list in the fixed-width layout
pub fn write_features<W: Write>(writer: &mut W, list: &FeatureList) -> Result<(), StorageError> {
    writer.write_u64::<LittleEndian>(list.len() as u64)?;
    for record in list {
        writer.write_u64::<LittleEndian>(record.voxel_index)?;
        for value in record.values {
            writer.write_f32::<LittleEndian>(value)?;
        }
    }
    Ok(())
}

/// Read a fixed-width feature list, rejecting truncated or unordered input
pub fn read_features<R: Read>(reader: &mut R) -> Result<FeatureList, StorageError> {
    let expected = reader.read_u64::<LittleEndian>().map_err(|e| truncated(e, 0, 0))?;
    let mut records = Vec::with_capacity(expected.min(MAX_PREALLOCATED) as usize);

    for read in 0..expected {
        let voxel_index = reader
            .read_u64::<LittleEndian>()
            .map_err(|e| truncated(e, expected, read))?;
        let mut values = [0f32; FEATURE_CHANNELS];
        reader
            .read_f32_into::<LittleEndian>(&mut values)
            .map_err(|e| truncated(e, expected, read))?;
        records.push(FeatureRecord {
            voxel_index,
            values,
        });
    }

    check_order(&records)?;
    Ok(FeatureList::from_unsorted(records))
}

pub fn encode_fixed(list: &FeatureList) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(8 + list.len() * RECORD_BYTES);
    // writes into a Vec cannot fail
    let _ = write_features(&mut bytes, list);
    bytes
}

pub fn decode_fixed(mut bytes: &[u8]) -> Result<FeatureList, StorageError> {
    read_features(&mut bytes)
}

pub fn encode_compact(list: &FeatureList) -> Result<Vec<u8>, StorageError> {
    postcard::to_allocvec(list).map_err(|e| StorageError::SerializationError(e.to_string()))
}

/// Decode a compact list; `FeatureList` deserialization rejects unordered records
pub fn decode_compact(bytes: &[u8]) -> Result<FeatureList, StorageError> {
    postcard::from_bytes(bytes).map_err(|e| StorageError::SerializationError(e.to_string()))
}

fn check_order(records: &[FeatureRecord]) -> Result<(), StorageError> {
    match records
        .windows(2)
        .position(|w| w[1].voxel_index < w[0].voxel_index)
    {
        Some(i) => Err(StorageError::Unsorted { position: i + 1 }),
        None => Ok(()),
    }
}

fn truncated(err: io::Error, expected: u64, read: u64) -> StorageError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        StorageError::Truncated { expected, read }
    } else {
        StorageError::Io(err)
    }
}
