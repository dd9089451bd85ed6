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

//! Join operators.
//!
//! Each operator implements the [`RecordSource`](super::RecordSource)
//! contract with the `open()`, `next()`, `close()` lifecycle.
//!
//! - [`HashJoinOperator`](hash_join::HashJoinOperator) - multi-way hash
//!   equi-join: one leader stream drives, any number of inner streams are
//!   buffered and indexed by encoded key

pub mod hash_join;

pub use hash_join::{HashJoinOperator, JoinInput};
