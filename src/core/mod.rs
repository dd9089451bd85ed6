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

//! Core types and definitions for Rowmill
//!
//! This module contains the fundamental types used throughout the engine:
//!
//! - [`SqlType`] - declared SQL types with their stored and key widths
//! - [`Collation`] - text collations producing binary-comparable sort keys
//! - [`Decimal64`] / [`Decimal128`] - decimal floating point values
//! - [`Value`] - runtime values
//! - [`Row`] - a row of values
//! - [`Error`] - error types for all execution operations

pub mod collation;
pub mod decimal;
pub mod error;
pub mod row;
pub mod types;
pub mod value;

// Re-export main types for convenience
pub use collation::Collation;
pub use decimal::{Decimal128, Decimal64};
pub use error::{Error, Result};
pub use row::Row;
pub use types::SqlType;
pub use value::Value;
