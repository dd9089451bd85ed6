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

//! # Rowmill - Multi-way hash equi-join execution engine
//!
//! Rowmill is the physical join layer of a relational query engine: a
//! Volcano-style, pull-driven record source tree whose centerpiece is a
//! multi-way hash equi-join. One leader stream drives the join; any number
//! of inner streams are materialized, indexed by a typed binary key
//! encoding, and enumerated as a Cartesian product of matches per leader
//! row.
//!
//! ## Key Features
//!
//! - **Typed key encoding** - SQL values are serialized into fixed-length
//!   byte images that are byte-equal exactly when the values are SQL-equal
//!   (signed zeros normalized, time zones reduced to UTC, decimal floating
//!   point canonicalized, collated text mapped to sort keys)
//! - **Multi-stream hash index** - a single directory answers "does every
//!   inner stream have a match for this key?" in one probe
//! - **Odometer iteration** - the full combination space of matching inner
//!   rows is walked lazily, one output row per pull
//! - **Lazy build** - inner streams are never opened when the leader turns
//!   out to be empty
//! - **Cooperative cancellation** - every pull yields to a cancellation
//!   point carried by the execution context
//!
//! ## Quick Start
//!
//! ```rust
//! use rowmill::{
//!     ColumnInfo, ExecutionContext, HashJoinOperator, JoinInput, KeyExpr,
//!     MaterializedSource, RecordSource, Row, SqlType, Value,
//! };
//!
//! let orders = MaterializedSource::named(
//!     "orders",
//!     vec![
//!         Row::from_values(vec![Value::integer(1), Value::text("beans")]),
//!         Row::from_values(vec![Value::integer(2), Value::text("rice")]),
//!     ],
//!     vec![ColumnInfo::new("customer_id"), ColumnInfo::new("item")],
//! );
//! let customers = MaterializedSource::named(
//!     "customers",
//!     vec![Row::from_values(vec![Value::integer(1), Value::text("Ada")])],
//!     vec![ColumnInfo::new("id"), ColumnInfo::new("name")],
//! );
//!
//! let mut join = HashJoinOperator::new(
//!     ExecutionContext::new(),
//!     Box::new(orders),
//!     vec![KeyExpr::column(0, SqlType::Integer)],
//!     vec![JoinInput::new(
//!         Box::new(customers),
//!         vec![KeyExpr::column(0, SqlType::Integer)],
//!     )],
//!     None,
//! );
//!
//! join.open().unwrap();
//! let row = join.next().unwrap().unwrap();
//! assert_eq!(row.get(3), Some(&Value::text("Ada")));
//! assert!(join.next().unwrap().is_none());
//! join.close().unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`core`] - Value layer ([`SqlType`], [`Value`], [`Row`], [`Error`])
//! - [`executor`] - Record sources and the hash join operator

pub mod core;
pub mod executor;

pub use crate::core::{Collation, Decimal128, Decimal64, Error, Result, Row, SqlType, Value};
pub use crate::executor::{
    BufferedStream, CancellationHandle, ColumnInfo, ExecutionContext, HashIndex, HashJoinOperator,
    JoinInput, KeyExpr, KeySet, MaterializedSource, RecordSource, StreamId,
};
