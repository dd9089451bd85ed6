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

//! Volcano-style record source interface for streaming query execution.
//!
//! Every physical operator implements [`RecordSource`] and participates in
//! the pull pipeline:
//!
//! 1. `open()` - Initialize the source (idempotent re-entry)
//! 2. `next()` - Get the next row (repeatedly until `None`)
//! 3. `close()` - Release resources (idempotent)
//!
//! Beyond the pull loop, the trait carries the tree bookkeeping the plan
//! layer needs: child enumeration, stream discovery, record invalidation,
//! cardinality, and plan rendering.

use std::fmt;

use crate::core::{Error, Result, Row};

/// Identifier of a base stream (table occurrence) in the plan.
pub type StreamId = u32;

/// Column information for a record source's output schema.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Original table alias (if from a table)
    pub table_alias: Option<String>,
}

impl ColumnInfo {
    /// Create a new column info with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_alias: None,
        }
    }

    /// Create a column info with table alias.
    pub fn with_table(name: impl Into<String>, table_alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_alias: Some(table_alias.into()),
        }
    }
}

impl fmt::Display for ColumnInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table_alias {
            Some(alias) => write!(f, "{}.{}", alias, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Volcano-style pull contract implemented by every physical operator.
///
/// Sources are `Send` so a query can be driven from another thread, but a
/// single source is never shared: it owns mutable cursor state.
pub trait RecordSource: Send {
    /// Initialize the source. Re-entry resets any prior cursor state.
    fn open(&mut self) -> Result<()>;

    /// Get the next row.
    ///
    /// Returns `Ok(None)` once exhausted (and on every later call until the
    /// source is re-opened).
    fn next(&mut self) -> Result<Option<Row>>;

    /// Release resources. Must be idempotent and safe after errors.
    fn close(&mut self) -> Result<()>;

    /// Output schema of this source.
    fn schema(&self) -> &[ColumnInfo];

    /// Estimated output cardinality, for planner cost feedback.
    fn cardinality(&self) -> f64;

    /// Short name for diagnostics.
    fn name(&self) -> &str;

    /// Re-fetch the current row after an external change.
    ///
    /// Sources whose output is materialized from child rows have nothing to
    /// re-read and report success.
    fn refetch(&mut self) -> Result<bool> {
        Ok(true)
    }

    /// Lock the current row for update.
    fn lock_record(&mut self) -> Result<()> {
        Err(Error::RecordLockNotSupported)
    }

    /// Direct child sources, in plan order.
    fn children(&self) -> Vec<&dyn RecordSource> {
        Vec::new()
    }

    /// Mark this subtree as part of a recursive query.
    fn mark_recursive(&mut self) {}

    /// Collect the base stream ids used by this subtree.
    fn find_used_streams(&self, streams: &mut Vec<StreamId>, expand_all: bool) {
        let _ = (streams, expand_all);
    }

    /// Set the subtree's current records to all-NULL state.
    fn null_records(&mut self) {}

    /// Drop the subtree's current record references.
    fn invalidate_records(&mut self) {}

    /// Render this subtree into a plan string.
    ///
    /// The detailed form emits one indented line per node; the terse form
    /// emits the classic one-line nested notation.
    fn print_plan(&self, plan: &mut String, detailed: bool, level: usize, recurse: bool);
}

/// Append a newline and `level` indentation steps to a plan string.
pub(crate) fn plan_indent(plan: &mut String, level: usize) {
    plan.push('\n');
    for _ in 0..level {
        plan.push_str("    ");
    }
}

/// An in-memory record source over pre-materialized rows.
///
/// This is the leaf the executor hands out for VALUES lists, cached CTE
/// results, and tests. It carries the base stream id the planner assigned
/// to the occurrence.
pub struct MaterializedSource {
    label: String,
    rows: Vec<Row>,
    schema: Vec<ColumnInfo>,
    stream: StreamId,
    cursor: usize,
    open: bool,
}

impl MaterializedSource {
    /// Create a source over the given rows.
    pub fn new(rows: Vec<Row>, schema: Vec<ColumnInfo>) -> Self {
        Self::named("Values", rows, schema)
    }

    /// Create a source with a label used in plan output.
    pub fn named(label: impl Into<String>, rows: Vec<Row>, schema: Vec<ColumnInfo>) -> Self {
        Self {
            label: label.into(),
            rows,
            schema,
            stream: 0,
            cursor: 0,
            open: false,
        }
    }

    /// Assign the base stream id reported by `find_used_streams`.
    pub fn with_stream(mut self, stream: StreamId) -> Self {
        self.stream = stream;
        self
    }
}

impl RecordSource for MaterializedSource {
    fn open(&mut self) -> Result<()> {
        self.cursor = 0;
        self.open = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>> {
        if !self.open {
            return Ok(None);
        }
        match self.rows.get(self.cursor) {
            Some(row) => {
                self.cursor += 1;
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }

    fn schema(&self) -> &[ColumnInfo] {
        &self.schema
    }

    fn cardinality(&self) -> f64 {
        self.rows.len() as f64
    }

    fn name(&self) -> &str {
        &self.label
    }

    fn find_used_streams(&self, streams: &mut Vec<StreamId>, _expand_all: bool) {
        if !streams.contains(&self.stream) {
            streams.push(self.stream);
        }
    }

    fn print_plan(&self, plan: &mut String, detailed: bool, level: usize, _recurse: bool) {
        if detailed {
            plan_indent(plan, level + 1);
            plan.push_str("Materialized Rows \"");
            plan.push_str(&self.label);
            plan.push('"');
        } else {
            plan.push_str(&self.label);
        }
    }
}
