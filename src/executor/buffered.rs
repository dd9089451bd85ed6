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

//! Buffered record stream.
//!
//! [`BufferedStream`] wraps a child source and materializes its rows as
//! they are pulled, so that a consumer can reseek to any already-seen row
//! by its 0-based position via [`BufferedStream::locate`]. The hash join
//! drains each inner stream through this wrapper once, then revisits match
//! positions in O(1).

use crate::core::{Result, Row};

use super::operator::{ColumnInfo, RecordSource, StreamId};

/// A materializing wrapper providing positional random access over a
/// child's output.
pub struct BufferedStream {
    source: Box<dyn RecordSource>,
    rows: Vec<Row>,
    next_pos: usize,
    source_exhausted: bool,
    open: bool,
}

impl BufferedStream {
    pub fn new(source: Box<dyn RecordSource>) -> Self {
        Self {
            source,
            rows: Vec::new(),
            next_pos: 0,
            source_exhausted: false,
            open: false,
        }
    }

    /// Reseek so the next `next()` call returns the row at `position`.
    ///
    /// The position must refer to an already-materialized row (or the
    /// current end of the buffer).
    pub fn locate(&mut self, position: usize) {
        debug_assert!(position <= self.rows.len());
        self.next_pos = position;
    }

    /// Number of rows materialized so far.
    pub fn buffered(&self) -> usize {
        self.rows.len()
    }

    /// The wrapped child source.
    pub fn source(&self) -> &dyn RecordSource {
        self.source.as_ref()
    }

    /// The wrapped child source, mutably.
    pub fn source_mut(&mut self) -> &mut dyn RecordSource {
        self.source.as_mut()
    }
}

impl RecordSource for BufferedStream {
    fn open(&mut self) -> Result<()> {
        self.rows.clear();
        self.next_pos = 0;
        self.source_exhausted = false;
        self.open = true;
        self.source.open()
    }

    fn next(&mut self) -> Result<Option<Row>> {
        if !self.open {
            return Ok(None);
        }
        if self.next_pos < self.rows.len() {
            let row = self.rows[self.next_pos].clone();
            self.next_pos += 1;
            return Ok(Some(row));
        }
        if self.source_exhausted {
            return Ok(None);
        }
        match self.source.next()? {
            Some(row) => {
                self.rows.push(row.clone());
                self.next_pos += 1;
                Ok(Some(row))
            }
            None => {
                self.source_exhausted = true;
                Ok(None)
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        if self.open {
            self.open = false;
            self.rows = Vec::new();
            self.source.close()?;
        }
        Ok(())
    }

    fn schema(&self) -> &[ColumnInfo] {
        self.source.schema()
    }

    fn cardinality(&self) -> f64 {
        self.source.cardinality()
    }

    fn name(&self) -> &str {
        "Record Buffer"
    }

    fn children(&self) -> Vec<&dyn RecordSource> {
        vec![self.source.as_ref()]
    }

    fn mark_recursive(&mut self) {
        self.source.mark_recursive();
    }

    fn find_used_streams(&self, streams: &mut Vec<StreamId>, expand_all: bool) {
        self.source.find_used_streams(streams, expand_all);
    }

    fn null_records(&mut self) {
        self.source.null_records();
    }

    fn invalidate_records(&mut self) {
        self.source.invalidate_records();
    }

    fn print_plan(&self, plan: &mut String, detailed: bool, level: usize, recurse: bool) {
        if detailed {
            super::operator::plan_indent(plan, level + 1);
            plan.push_str("Record Buffer");
            if recurse {
                self.source.print_plan(plan, true, level + 1, true);
            }
        } else {
            // The buffer is transparent in terse plans.
            self.source.print_plan(plan, false, level, recurse);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::executor::operator::MaterializedSource;

    fn buffered(values: Vec<i64>) -> BufferedStream {
        let rows = values
            .into_iter()
            .map(|v| Row::from_values(vec![Value::integer(v)]))
            .collect();
        BufferedStream::new(Box::new(MaterializedSource::new(
            rows,
            vec![ColumnInfo::new("id")],
        )))
    }

    fn id(row: &Row) -> i64 {
        match row.get(0) {
            Some(Value::Integer(v)) => *v,
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn test_streams_like_child() {
        let mut buf = buffered(vec![10, 20, 30]);
        buf.open().unwrap();
        let mut seen = Vec::new();
        while let Some(row) = buf.next().unwrap() {
            seen.push(id(&row));
        }
        assert_eq!(seen, vec![10, 20, 30]);
        buf.close().unwrap();
    }

    #[test]
    fn test_locate_reseeks() {
        let mut buf = buffered(vec![10, 20, 30]);
        buf.open().unwrap();
        while buf.next().unwrap().is_some() {}
        assert_eq!(buf.buffered(), 3);

        buf.locate(1);
        assert_eq!(id(&buf.next().unwrap().unwrap()), 20);
        assert_eq!(id(&buf.next().unwrap().unwrap()), 30);

        buf.locate(0);
        assert_eq!(id(&buf.next().unwrap().unwrap()), 10);
    }

    #[test]
    fn test_exhaustion_is_sticky() {
        let mut buf = buffered(vec![1]);
        buf.open().unwrap();
        assert!(buf.next().unwrap().is_some());
        assert!(buf.next().unwrap().is_none());
        assert!(buf.next().unwrap().is_none());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut buf = buffered(vec![1, 2]);
        buf.open().unwrap();
        buf.next().unwrap();
        buf.close().unwrap();
        buf.close().unwrap();
        assert!(buf.next().unwrap().is_none());
    }

    #[test]
    fn test_reopen_rebuffers() {
        let mut buf = buffered(vec![7]);
        buf.open().unwrap();
        while buf.next().unwrap().is_some() {}
        buf.close().unwrap();

        buf.open().unwrap();
        assert_eq!(buf.buffered(), 0);
        assert_eq!(id(&buf.next().unwrap().unwrap()), 7);
    }
}
