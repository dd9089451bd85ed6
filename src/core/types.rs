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

//! Declared SQL types.
//!
//! [`SqlType`] is the planner-visible descriptor of a key expression. The
//! key encoder derives two widths from it: the stored width of the value
//! and the width of the canonical key image used for join matching. For
//! most scalars the two coincide; text, time-zone, and decimal floating
//! point types diverge (sort keys, UTC-only images, canonical decimal
//! images).

use std::fmt;

use super::collation::Collation;
use super::decimal::{Decimal128, Decimal64};

/// A declared SQL type, as assigned by the planner to a key expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    /// 16-bit signed integer
    SmallInt,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    BigInt,
    /// Boolean true/false
    Boolean,
    /// IEEE 754 single precision
    Real,
    /// IEEE 754 double precision
    Double,
    /// 64-bit decimal floating point
    Decimal64,
    /// 128-bit decimal floating point
    Decimal128,
    /// Calendar date
    Date,
    /// Time of day
    Time,
    /// Time of day with time zone
    TimeTz,
    /// Date and time of day
    Timestamp,
    /// Date and time of day with time zone
    TimestampTz,
    /// Fixed-length character string, space padded
    Char { len: u16, collation: Option<Collation> },
    /// Variable-length character string with a declared maximum
    VarChar { len: u16, collation: Option<Collation> },
}

impl SqlType {
    /// Width in bytes of the stored value.
    ///
    /// Time-zone types store the UTC portion plus a 2-byte offset.
    pub fn stored_length(&self) -> usize {
        match self {
            SqlType::SmallInt => 2,
            SqlType::Integer => 4,
            SqlType::BigInt => 8,
            SqlType::Boolean => 1,
            SqlType::Real => 4,
            SqlType::Double => 8,
            SqlType::Decimal64 => 8,
            SqlType::Decimal128 => 16,
            SqlType::Date => 4,
            SqlType::Time => 8,
            SqlType::TimeTz => 10,
            SqlType::Timestamp => 8,
            SqlType::TimestampTz => 10,
            SqlType::Char { len, .. } | SqlType::VarChar { len, .. } => *len as usize,
        }
    }

    /// Width in bytes of the canonical key image.
    ///
    /// This is the width the hash join reserves per key inside the encoded
    /// key buffer:
    ///
    /// - collated text uses the collation's sort key width, plain text the
    ///   declared string length
    /// - time-zone types use only the UTC portion
    /// - decimal floating point uses the canonical `make_key` image
    /// - everything else is the stored width
    pub fn key_length(&self) -> usize {
        match self {
            SqlType::Char { len, collation } | SqlType::VarChar { len, collation } => {
                match collation {
                    Some(collation) => collation.key_length(*len as usize),
                    None => *len as usize,
                }
            }
            SqlType::Time | SqlType::TimeTz => 8,
            SqlType::Timestamp | SqlType::TimestampTz => 8,
            SqlType::Decimal64 => Decimal64::KEY_LENGTH,
            SqlType::Decimal128 => Decimal128::KEY_LENGTH,
            other => other.stored_length(),
        }
    }

    /// Returns true for CHAR/VARCHAR.
    pub fn is_text(&self) -> bool {
        matches!(self, SqlType::Char { .. } | SqlType::VarChar { .. })
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::SmallInt => write!(f, "SMALLINT"),
            SqlType::Integer => write!(f, "INTEGER"),
            SqlType::BigInt => write!(f, "BIGINT"),
            SqlType::Boolean => write!(f, "BOOLEAN"),
            SqlType::Real => write!(f, "REAL"),
            SqlType::Double => write!(f, "DOUBLE PRECISION"),
            SqlType::Decimal64 => write!(f, "DECFLOAT(16)"),
            SqlType::Decimal128 => write!(f, "DECFLOAT(34)"),
            SqlType::Date => write!(f, "DATE"),
            SqlType::Time => write!(f, "TIME"),
            SqlType::TimeTz => write!(f, "TIME WITH TIME ZONE"),
            SqlType::Timestamp => write!(f, "TIMESTAMP"),
            SqlType::TimestampTz => write!(f, "TIMESTAMP WITH TIME ZONE"),
            SqlType::Char { len, .. } => write!(f, "CHAR({len})"),
            SqlType::VarChar { len, .. } => write!(f, "VARCHAR({len})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_widths() {
        assert_eq!(SqlType::SmallInt.key_length(), 2);
        assert_eq!(SqlType::Integer.key_length(), 4);
        assert_eq!(SqlType::BigInt.key_length(), 8);
        assert_eq!(SqlType::Boolean.key_length(), 1);
        assert_eq!(SqlType::Real.key_length(), 4);
        assert_eq!(SqlType::Double.key_length(), 8);
        assert_eq!(SqlType::Date.key_length(), 4);
    }

    #[test]
    fn test_time_zone_key_drops_offset() {
        // The stored value carries the zone, the key image does not.
        assert_eq!(SqlType::TimeTz.stored_length(), 10);
        assert_eq!(SqlType::TimeTz.key_length(), 8);
        assert_eq!(SqlType::TimestampTz.stored_length(), 10);
        assert_eq!(SqlType::TimestampTz.key_length(), 8);
        assert_eq!(SqlType::Time.key_length(), SqlType::TimeTz.key_length());
    }

    #[test]
    fn test_text_key_uses_collation_width() {
        let plain = SqlType::VarChar {
            len: 12,
            collation: None,
        };
        let collated = SqlType::VarChar {
            len: 12,
            collation: Some(Collation::CaseInsensitive),
        };
        assert_eq!(plain.key_length(), 12);
        assert_eq!(collated.key_length(), 12);
        assert!(plain.is_text());
    }

    #[test]
    fn test_decimal_key_widths() {
        assert_eq!(SqlType::Decimal64.key_length(), Decimal64::KEY_LENGTH);
        assert_eq!(SqlType::Decimal128.key_length(), Decimal128::KEY_LENGTH);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            SqlType::Char {
                len: 5,
                collation: None
            }
            .to_string(),
            "CHAR(5)"
        );
        assert_eq!(SqlType::TimestampTz.to_string(), "TIMESTAMP WITH TIME ZONE");
    }
}
