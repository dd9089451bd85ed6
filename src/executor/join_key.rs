// Copyright 2026 Rowmill Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Join key encoding.
//!
//! [`KeySet`] serializes a row's key-expression vector into a fixed-length
//! byte image that is byte-equal exactly when the key values are SQL-equal:
//!
//! - collated text becomes the collation's unique sort key, plain text is
//!   space padded to the declared length
//! - time-zone values contribute only their UTC portion
//! - decimal floating point contributes its canonical `make_key` image
//! - IEEE floats equal to zero contribute all-zero bytes, so `+0.0` and
//!   `-0.0` meet
//! - every other scalar contributes its raw little-endian image
//!
//! NULL keys write nothing into the pre-zeroed buffer; the encoder reports
//! them so the join can keep NULL out of matching entirely.
//!
//! The 32-bit hash over the image is deterministic and unseeded; build and
//! probe sides use the same function, so equal images always land in the
//! same bucket with the same stored hash.

use std::hash::Hasher;

use chrono::{Datelike, NaiveTime};
use rustc_hash::FxHasher;
use smallvec::SmallVec;

use crate::core::{Error, Result, Row, SqlType, Value};

use super::expression::KeyExpr;

/// Result of encoding one row's keys.
#[derive(Debug, Clone, Copy)]
pub struct EncodedKey {
    /// Hash of the whole key image.
    pub hash: u32,
    /// True if any key evaluated to NULL.
    pub has_null: bool,
}

/// The ordered key expressions of one join sub-stream, with the byte
/// layout derived from their declared types.
#[derive(Debug, Clone)]
pub struct KeySet {
    keys: SmallVec<[KeyExpr; 4]>,
    lengths: SmallVec<[u16; 4]>,
    total_length: usize,
}

impl KeySet {
    pub fn new(keys: Vec<KeyExpr>) -> Self {
        debug_assert!(!keys.is_empty());
        let keys: SmallVec<[KeyExpr; 4]> = keys.into();
        let lengths: SmallVec<[u16; 4]> = keys
            .iter()
            .map(|k| k.descriptor().key_length() as u16)
            .collect();
        let total_length = lengths.iter().map(|&l| l as usize).sum();
        Self {
            keys,
            lengths,
            total_length,
        }
    }

    /// Number of keys.
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Per-key encoded widths, in key order.
    pub fn key_lengths(&self) -> &[u16] {
        &self.lengths
    }

    /// Total width of the encoded key image.
    pub fn total_length(&self) -> usize {
        self.total_length
    }

    /// Encode the row's keys into `buf` and hash the image.
    ///
    /// `buf` must be exactly `total_length` bytes; it is zeroed first, so
    /// NULL keys leave all-zero bytes behind.
    pub fn encode(&self, row: &Row, buf: &mut [u8]) -> Result<EncodedKey> {
        debug_assert_eq!(buf.len(), self.total_length);
        buf.fill(0);

        let mut offset = 0;
        let mut has_null = false;

        for (key, &length) in self.keys.iter().zip(&self.lengths) {
            let length = length as usize;
            let value = key.evaluate(row)?;
            if value.is_null() {
                has_null = true;
            } else {
                encode_value(key.descriptor(), value, &mut buf[offset..offset + length])?;
            }
            offset += length;
        }

        debug_assert_eq!(offset, self.total_length);

        Ok(EncodedKey {
            hash: hash_bytes(buf),
            has_null,
        })
    }
}

/// Write the canonical image of `value` into `dst` (already zeroed).
fn encode_value(descriptor: SqlType, value: &Value, dst: &mut [u8]) -> Result<()> {
    match (descriptor, value) {
        (SqlType::Char { collation, .. }, Value::Text(s))
        | (SqlType::VarChar { collation, .. }, Value::Text(s)) => {
            match collation {
                Some(collation) => collation.string_to_key(s, dst),
                None => {
                    // Plain text: copy and space-fill to the declared width.
                    let bytes = s.as_bytes();
                    let n = bytes.len().min(dst.len());
                    dst[..n].copy_from_slice(&bytes[..n]);
                    dst[n..].fill(b' ');
                }
            }
        }
        (SqlType::SmallInt | SqlType::Integer | SqlType::BigInt, Value::Integer(v)) => {
            debug_assert!(dst.len() <= descriptor.stored_length());
            dst.copy_from_slice(&v.to_le_bytes()[..dst.len()]);
        }
        (SqlType::Boolean, Value::Boolean(v)) => {
            dst[0] = *v as u8;
        }
        (SqlType::Real, Value::Real(v)) => {
            // Positive zero in binary for both signed zeros.
            if *v != 0.0 {
                dst.copy_from_slice(&v.to_le_bytes());
            }
        }
        (SqlType::Double, Value::Double(v)) => {
            if *v != 0.0 {
                dst.copy_from_slice(&v.to_le_bytes());
            }
        }
        (SqlType::Decimal64, Value::Decimal64(v)) => {
            // make_key works in its own scratch; the destination inside the
            // key buffer carries no alignment.
            dst.copy_from_slice(&v.make_key());
        }
        (SqlType::Decimal128, Value::Decimal128(v)) => {
            dst.copy_from_slice(&v.make_key());
        }
        (SqlType::Date, Value::Date(v)) => {
            debug_assert!(dst.len() <= descriptor.stored_length());
            dst.copy_from_slice(&v.num_days_from_ce().to_le_bytes());
        }
        (SqlType::Time, Value::Time(v)) => {
            dst.copy_from_slice(&time_micros(v).to_le_bytes());
        }
        (SqlType::TimeTz, Value::TimeTz { time, .. }) => {
            // UTC portion only; the offset never reaches the key.
            dst.copy_from_slice(&time_micros(time).to_le_bytes());
        }
        (SqlType::Timestamp, Value::Timestamp(v)) => {
            dst.copy_from_slice(&v.and_utc().timestamp_micros().to_le_bytes());
        }
        (SqlType::TimestampTz, Value::TimestampTz(v)) => {
            dst.copy_from_slice(&v.timestamp_micros().to_le_bytes());
        }
        (descriptor, value) => {
            return Err(Error::type_error(format!(
                "{} key cannot encode {} value",
                descriptor,
                value.kind()
            )));
        }
    }
    Ok(())
}

/// Microseconds since midnight.
fn time_micros(time: &NaiveTime) -> i64 {
    time.signed_duration_since(NaiveTime::MIN)
        .num_microseconds()
        .unwrap_or(0)
}

/// Deterministic 32-bit hash over a key image.
///
/// Unseeded and process-wide pure: equal images hash equal across build
/// and probe, across runs.
pub fn hash_bytes(bytes: &[u8]) -> u32 {
    let mut hasher = FxHasher::default();
    hasher.write(bytes);
    let hash = hasher.finish();
    (hash ^ (hash >> 32)) as u32
}
