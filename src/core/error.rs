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

//! Error types for Rowmill
//!
//! This module defines all error types used throughout the execution engine.

use thiserror::Error;

/// Result type alias for Rowmill operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Rowmill execution operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Record locking requested on a source that cannot lock
    #[error("record locking is not supported by this record source")]
    RecordLockNotSupported,

    /// Query was cancelled via its execution context
    #[error("query cancelled")]
    QueryCancelled,

    /// Column index out of bounds while evaluating a key expression
    #[error("column index {index} out of bounds")]
    ColumnIndexOutOfBounds { index: usize },

    /// Type error
    #[error("type error: {0}")]
    Type(String),

    /// Operation not supported
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Internal error for unexpected conditions
    #[error("{message}")]
    Internal { message: String },
}

impl Error {
    /// Create a new Type error
    pub fn type_error(message: impl Into<String>) -> Self {
        Error::Type(message.into())
    }

    /// Create a new Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Check if this error means execution was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::QueryCancelled)
    }
}
