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

//! Runtime values.
//!
//! [`Value`] is what a key expression evaluates to. Variants map onto the
//! [`SqlType`](super::types::SqlType) families the key encoder understands;
//! all integer widths share `Integer(i64)` since the declared type, not the
//! runtime value, decides the encoded width.
//!
//! Time-zone values are normalized at construction: `TimeTz` stores the UTC
//! time of day plus the original offset, and `TimestampTz` keeps the zoned
//! `chrono` value whose instant is zone-independent. Join equality over
//! these types therefore falls out of the stored UTC portion.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use super::decimal::{Decimal128, Decimal64};

/// A runtime value produced by evaluating a key expression.
///
/// Text uses `Arc<str>` for cheap cloning during row operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value
    Null,

    /// Signed integer of any declared width
    Integer(i64),

    /// Boolean value
    Boolean(bool),

    /// IEEE 754 single precision
    Real(f32),

    /// IEEE 754 double precision
    Double(f64),

    /// 64-bit decimal floating point
    Decimal64(Decimal64),

    /// 128-bit decimal floating point
    Decimal128(Decimal128),

    /// Calendar date
    Date(NaiveDate),

    /// Time of day
    Time(NaiveTime),

    /// Time of day with zone; `time` is the UTC portion
    TimeTz { time: NaiveTime, offset_minutes: i16 },

    /// Date and time of day
    Timestamp(NaiveDateTime),

    /// Date and time of day with zone
    TimestampTz(DateTime<FixedOffset>),

    /// UTF-8 text string (Arc for cheap cloning)
    Text(Arc<str>),
}

impl Value {
    /// Create a NULL value
    pub fn null() -> Self {
        Value::Null
    }

    /// Create an integer value
    pub fn integer(value: i64) -> Self {
        Value::Integer(value)
    }

    /// Create a boolean value
    pub fn boolean(value: bool) -> Self {
        Value::Boolean(value)
    }

    /// Create a single-precision float value
    pub fn real(value: f32) -> Self {
        Value::Real(value)
    }

    /// Create a double-precision float value
    pub fn double(value: f64) -> Self {
        Value::Double(value)
    }

    /// Create a 64-bit decimal floating point value
    pub fn decimal64(coefficient: i64, exponent: i16) -> Self {
        Value::Decimal64(Decimal64::new(coefficient, exponent))
    }

    /// Create a 128-bit decimal floating point value
    pub fn decimal128(coefficient: i128, exponent: i16) -> Self {
        Value::Decimal128(Decimal128::new(coefficient, exponent))
    }

    /// Create a date value
    pub fn date(value: NaiveDate) -> Self {
        Value::Date(value)
    }

    /// Create a time value
    pub fn time(value: NaiveTime) -> Self {
        Value::Time(value)
    }

    /// Create a time-with-zone value from a local time and its UTC offset.
    ///
    /// The local time is reduced to UTC immediately, wrapping across
    /// midnight, so two values denoting the same UTC instant are equal.
    pub fn time_tz(local: NaiveTime, offset_minutes: i16) -> Self {
        let (utc, _) = local.overflowing_sub_signed(Duration::minutes(offset_minutes as i64));
        Value::TimeTz {
            time: utc,
            offset_minutes,
        }
    }

    /// Create a timestamp value
    pub fn timestamp(value: NaiveDateTime) -> Self {
        Value::Timestamp(value)
    }

    /// Create a timestamp-with-zone value
    pub fn timestamp_tz(value: DateTime<FixedOffset>) -> Self {
        Value::TimestampTz(value)
    }

    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(Arc::from(value.into().as_str()))
    }

    /// Returns true if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the value's family, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INTEGER",
            Value::Boolean(_) => "BOOLEAN",
            Value::Real(_) => "REAL",
            Value::Double(_) => "DOUBLE",
            Value::Decimal64(_) => "DECFLOAT(16)",
            Value::Decimal128(_) => "DECFLOAT(34)",
            Value::Date(_) => "DATE",
            Value::Time(_) => "TIME",
            Value::TimeTz { .. } => "TIME WITH TIME ZONE",
            Value::Timestamp(_) => "TIMESTAMP",
            Value::TimestampTz(_) => "TIMESTAMP WITH TIME ZONE",
            Value::Text(_) => "TEXT",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Decimal64(v) => write!(f, "{v}"),
            Value::Decimal128(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{v}"),
            Value::Time(v) => write!(f, "{v}"),
            Value::TimeTz {
                time,
                offset_minutes,
            } => {
                let (local, _) =
                    time.overflowing_add_signed(Duration::minutes(*offset_minutes as i64));
                write!(
                    f,
                    "{local}{:+03}:{:02}",
                    offset_minutes / 60,
                    (offset_minutes % 60).abs()
                )
            }
            Value::Timestamp(v) => write!(f, "{v}"),
            Value::TimestampTz(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v}"),
        }
    }
}
