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

//! Query execution
//!
//! This module provides the streaming execution layer: the [`RecordSource`]
//! pull contract, the supporting sources, and the multi-way hash join.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ Consumer     │ ← Pulls rows via next()
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │ Hash Join    │ ← Leader streamed, inner streams buffered + indexed
//! └──┬───────┬───┘
//!    │       │
//! ┌──▼──┐ ┌──▼───────────┐
//! │Lead │ │BufferedStream│ ← locate(position) random access
//! └─────┘ └──┬───────────┘
//!            │
//!         ┌──▼──┐
//!         │Inner│
//!         └─────┘
//! ```
//!
//! # Components
//!
//! - [`RecordSource`] - Volcano-style open/next/close contract
//! - [`BufferedStream`] - materializing wrapper with positional reseek
//! - [`KeySet`] - typed binary key encoding for join keys
//! - [`HashIndex`] - multi-stream hash directory over encoded keys
//! - [`HashJoinOperator`] - the multi-way hash equi-join
//! - [`ExecutionContext`] - per-request state (cancellation)

pub mod buffered;
pub mod context;
pub mod expression;
pub mod hash_index;
pub mod join_key;
pub mod operator;
pub mod operators;

pub use buffered::BufferedStream;
pub use context::{CancellationHandle, ExecutionContext};
pub use expression::KeyExpr;
pub use hash_index::HashIndex;
pub use join_key::{hash_bytes, EncodedKey, KeySet};
pub use operator::{ColumnInfo, MaterializedSource, RecordSource, StreamId};
pub use operators::hash_join::{HashJoinOperator, JoinInput};
