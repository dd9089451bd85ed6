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

//! Multi-way hash equi-join operator.
//!
//! One leader stream drives the join and is scanned exactly once. Every
//! inner stream is materialized through a [`BufferedStream`] and indexed in
//! a shared [`HashIndex`] keyed by the typed binary key encoding. Per
//! leader row, the operator walks the Cartesian product of matching inner
//! rows as a right-major odometer: the last inner stream spins fastest,
//! and exhausting it carries into the stream to its left.
//!
//! The join proceeds in two phases:
//!
//! 1. **Build** (lazily, on the first leader row): drain each inner stream
//!    into its buffer, encode every row's keys, fill the index, then sort
//!    all collision lists. An empty leader therefore never opens the inner
//!    streams.
//! 2. **Probe** (per `next()` pull): under `must_read`, advance the leader,
//!    encode its keys, and `setup` the index; under `first`, fetch an
//!    initial match on every inner stream; otherwise advance the odometer.
//!
//! Matching is by the stored 32-bit key hash; with key verification on
//! (the default) each candidate's stored key image is also compared to the
//! leader image, so correctness does not ride on hash quality.

use crate::core::{Error, Result, Row};
use crate::executor::buffered::BufferedStream;
use crate::executor::context::ExecutionContext;
use crate::executor::expression::KeyExpr;
use crate::executor::hash_index::HashIndex;
use crate::executor::join_key::KeySet;
use crate::executor::operator::{plan_indent, ColumnInfo, RecordSource, StreamId};

const MAXIMUM_SELECTIVITY: f64 = 1.0;
const REDUCE_SELECTIVITY_FACTOR_EQUALITY: f64 = 0.1;

/// One inner input of a hash join: the source and its key expressions.
pub struct JoinInput {
    pub source: Box<dyn RecordSource>,
    pub keys: Vec<KeyExpr>,
}

impl JoinInput {
    pub fn new(source: Box<dyn RecordSource>, keys: Vec<KeyExpr>) -> Self {
        Self { source, keys }
    }
}

/// An inner stream at execution time: the buffered source plus its key
/// layout.
struct SubStream {
    buffer: BufferedStream,
    keys: KeySet,
}

/// Multi-way hash equi-join.
///
/// Output rows are the leader row's columns followed by each inner
/// stream's columns in declaration order. Leader row order is preserved;
/// within one leader row, output follows the odometer over collision-list
/// order.
pub struct HashJoinOperator {
    ctx: ExecutionContext,
    leader: Box<dyn RecordSource>,
    leader_keys: KeySet,
    args: Vec<SubStream>,

    schema: Vec<ColumnInfo>,
    cardinality: f64,
    verify_keys: bool,

    // Execution state
    is_open: bool,
    must_read: bool,
    first: bool,
    index: Option<HashIndex>,
    /// With key verification: one flat image buffer per stream, stride
    /// `leader_keys.total_length()`, indexed by row position.
    key_images: Vec<Vec<u8>>,
    leader_buf: Vec<u8>,
    leader_hash: u32,
    leader_row: Option<Row>,
    current: Vec<Option<Row>>,
}

impl HashJoinOperator {
    /// Create a hash join over a leader and one or more inner inputs.
    ///
    /// Every input's key vector must have the same length and, per key
    /// index, the same encoded width as the leader's - that is what makes
    /// the key images directly comparable. Feeding incompatible key types
    /// is a planner bug.
    ///
    /// `selectivity` overrides the estimated fraction of the Cartesian
    /// product that joins; when absent, the usual per-equality reduction
    /// applies.
    pub fn new(
        ctx: ExecutionContext,
        leader: Box<dyn RecordSource>,
        leader_keys: Vec<KeyExpr>,
        inners: Vec<JoinInput>,
        selectivity: Option<f64>,
    ) -> Self {
        debug_assert!(!inners.is_empty());

        let leader_keys = KeySet::new(leader_keys);

        let mut cardinality = leader.cardinality();
        let mut schema: Vec<ColumnInfo> = leader.schema().to_vec();
        let mut args = Vec::with_capacity(inners.len());
        let mut inner_key_count = 0u32;

        for input in inners {
            let keys = KeySet::new(input.keys);
            debug_assert_eq!(keys.key_count(), leader_keys.key_count());
            debug_assert_eq!(keys.key_lengths(), leader_keys.key_lengths());

            inner_key_count += keys.key_count() as u32;
            cardinality *= input.source.cardinality();
            schema.extend(input.source.schema().iter().cloned());

            args.push(SubStream {
                buffer: BufferedStream::new(input.source),
                keys,
            });
        }

        let selectivity = selectivity.unwrap_or_else(|| {
            MAXIMUM_SELECTIVITY * REDUCE_SELECTIVITY_FACTOR_EQUALITY.powi(inner_key_count as i32)
        });
        cardinality *= selectivity;

        let current = args.iter().map(|_| None).collect();

        Self {
            ctx,
            leader,
            leader_keys,
            args,
            schema,
            cardinality,
            verify_keys: true,
            is_open: false,
            must_read: false,
            first: false,
            index: None,
            key_images: Vec::new(),
            leader_buf: Vec::new(),
            leader_hash: 0,
            leader_row: None,
            current,
        }
    }

    /// Toggle per-candidate key image comparison.
    ///
    /// With verification off, any hash collision between distinct key
    /// images joins spuriously; leave it on unless the workload has been
    /// shown collision-free.
    pub fn with_key_verification(mut self, verify: bool) -> Self {
        self.verify_keys = verify;
        self
    }

    /// Rows per inner stream the index handles before lookups degrade;
    /// exposed for planner capacity checks.
    pub fn max_capacity() -> usize {
        HashIndex::max_capacity()
    }

    /// Read and cache all inner streams, filling the hash index.
    ///
    /// Runs once, on the first leader row.
    fn build_index(&mut self) -> Result<()> {
        let mut index = HashIndex::new(self.args.len());
        let mut images: Vec<Vec<u8>> = Vec::with_capacity(self.args.len());
        let mut scratch = Vec::new();
        let verify_keys = self.verify_keys;

        for (stream, sub) in self.args.iter_mut().enumerate() {
            sub.buffer.open()?;

            scratch.resize(sub.keys.total_length(), 0);
            let mut stream_images = Vec::new();
            let mut position: u32 = 0;

            while let Some(row) = sub.buffer.next()? {
                let encoded = sub.keys.encode(&row, &mut scratch)?;
                // A NULL key can never equal anything; keep the row out of
                // the index so it never matches.
                if !encoded.has_null {
                    index.put(stream, encoded.hash, position);
                }
                if verify_keys {
                    stream_images.extend_from_slice(&scratch);
                }
                position += 1;
            }

            images.push(stream_images);
        }

        index.sort_all();

        self.leader_buf = vec![0; self.leader_keys.total_length()];
        self.key_images = images;
        self.index = Some(index);
        Ok(())
    }

    /// Compare a candidate's stored key image against the leader image.
    fn key_matches(&self, stream: usize, position: u32) -> bool {
        let stride = self.leader_keys.total_length();
        let images = &self.key_images[stream];
        let start = position as usize * stride;
        images[start..start + stride] == self.leader_buf[..]
    }

    /// Advance one stream to its next matching row, if any.
    fn advance(&mut self, stream: usize) -> Result<bool> {
        loop {
            let Some(index) = self.index.as_mut() else {
                return Ok(false);
            };
            let Some(position) = index.iterate(stream, self.leader_hash) else {
                return Ok(false);
            };

            if self.verify_keys && !self.key_matches(stream, position) {
                // Same 32-bit hash, different key bytes: not a match.
                continue;
            }

            let sub = &mut self.args[stream];
            sub.buffer.locate(position as usize);
            return match sub.buffer.next()? {
                Some(row) => {
                    self.current[stream] = Some(row);
                    Ok(true)
                }
                None => Ok(false),
            };
        }
    }

    /// Rewind one stream's collision cursor to the first match.
    fn reset_cursor(&mut self, stream: usize) {
        if let Some(index) = self.index.as_mut() {
            index.reset(stream, self.leader_hash);
        }
    }

    /// Fetch the next matching row for `stream`, carrying into its
    /// predecessors odometer-style when it runs out.
    ///
    /// The carry chain is an explicit walk over stream ordinals, so depth
    /// never depends on how many inner streams the join has.
    fn fetch_record(&mut self, stream: usize) -> Result<bool> {
        if self.advance(stream)? {
            return Ok(true);
        }

        // `stream` is out of matches: some predecessor has to move before
        // anything to its right rewinds.
        let mut carry = stream;
        loop {
            if carry == 0 {
                return Ok(false);
            }
            if !self.advance(carry - 1)? {
                carry -= 1;
                continue;
            }

            // A predecessor moved; rewind and refill everything from the
            // carry point back out to `stream`.
            let mut refill = carry;
            loop {
                self.reset_cursor(refill);
                if !self.advance(refill)? {
                    carry = refill;
                    break;
                }
                if refill == stream {
                    return Ok(true);
                }
                refill += 1;
            }
        }
    }

    /// Combine the leader row and the current inner rows into one output
    /// row.
    fn emit(&self) -> Row {
        let mut out = Row::with_capacity(self.schema.len());
        if let Some(leader) = &self.leader_row {
            out.extend_from(leader);
        }
        for row in self.current.iter().flatten() {
            out.extend_from(row);
        }
        out
    }
}

impl RecordSource for HashJoinOperator {
    fn open(&mut self) -> Result<()> {
        self.is_open = true;
        self.must_read = true;
        self.first = false;

        self.index = None;
        self.key_images = Vec::new();
        self.leader_buf = Vec::new();
        self.leader_row = None;
        for row in self.current.iter_mut() {
            *row = None;
        }

        // Inner streams open lazily, with the index build.
        self.leader.open()
    }

    fn next(&mut self) -> Result<Option<Row>> {
        self.ctx.check_cancelled()?;

        if !self.is_open {
            return Ok(None);
        }

        loop {
            if self.must_read {
                // Fetch the record from the leading stream.
                let Some(row) = self.leader.next()? else {
                    return Ok(None);
                };

                // We have something to join with, so ensure the index is
                // initialized.
                if self.index.is_none() {
                    self.build_index()?;
                }

                // Compute and hash the comparison keys.
                let encoded = self.leader_keys.encode(&row, &mut self.leader_buf)?;
                self.leader_row = Some(row);

                if encoded.has_null {
                    // NULL keys never match anything.
                    continue;
                }
                self.leader_hash = encoded.hash;

                // Ensure every inner stream has matches for this hash and
                // set up the collision cursors.
                let matched = match self.index.as_mut() {
                    Some(index) => index.setup(encoded.hash),
                    None => false,
                };
                if !matched {
                    continue;
                }

                self.must_read = false;
                self.first = true;
            }

            // Fetch collisions from the inner streams.
            if self.first {
                let mut found = true;
                for stream in 0..self.args.len() {
                    if !self.fetch_record(stream)? {
                        found = false;
                        break;
                    }
                }
                if !found {
                    self.must_read = true;
                    continue;
                }
                self.first = false;
            } else if !self.fetch_record(self.args.len() - 1)? {
                self.must_read = true;
                continue;
            }

            return Ok(Some(self.emit()));
        }
    }

    fn close(&mut self) -> Result<()> {
        self.invalidate_records();

        if self.is_open {
            self.is_open = false;

            self.index = None;
            self.key_images = Vec::new();
            self.leader_buf = Vec::new();

            for sub in &mut self.args {
                sub.buffer.close()?;
            }
            self.leader.close()?;
        }
        Ok(())
    }

    fn schema(&self) -> &[ColumnInfo] {
        &self.schema
    }

    fn cardinality(&self) -> f64 {
        self.cardinality
    }

    fn name(&self) -> &str {
        "HashJoin"
    }

    fn refetch(&mut self) -> Result<bool> {
        // Output is materialized from the current child rows.
        Ok(true)
    }

    fn lock_record(&mut self) -> Result<()> {
        Err(Error::RecordLockNotSupported)
    }

    fn children(&self) -> Vec<&dyn RecordSource> {
        let mut children: Vec<&dyn RecordSource> = vec![self.leader.as_ref()];
        for sub in &self.args {
            children.push(sub.buffer.source());
        }
        children
    }

    fn mark_recursive(&mut self) {
        self.leader.mark_recursive();
        for sub in &mut self.args {
            sub.buffer.source_mut().mark_recursive();
        }
    }

    fn find_used_streams(&self, streams: &mut Vec<StreamId>, expand_all: bool) {
        self.leader.find_used_streams(streams, expand_all);
        for sub in &self.args {
            sub.buffer.source().find_used_streams(streams, expand_all);
        }
    }

    fn null_records(&mut self) {
        self.leader.null_records();
        for sub in &mut self.args {
            sub.buffer.null_records();
        }
    }

    fn invalidate_records(&mut self) {
        self.leader_row = None;
        for row in self.current.iter_mut() {
            *row = None;
        }
        self.leader.invalidate_records();
        for sub in &mut self.args {
            sub.buffer.invalidate_records();
        }
    }

    fn print_plan(&self, plan: &mut String, detailed: bool, level: usize, recurse: bool) {
        if detailed {
            plan_indent(plan, level + 1);
            plan.push_str("Hash Join (inner)");
            if recurse {
                self.leader.print_plan(plan, true, level + 1, true);
                for sub in &self.args {
                    sub.buffer.source().print_plan(plan, true, level + 1, true);
                }
            }
        } else {
            plan.push_str("HASH (");
            self.leader.print_plan(plan, false, level + 1, recurse);
            for sub in &self.args {
                plan.push_str(", ");
                sub.buffer.source().print_plan(plan, false, level + 1, recurse);
            }
            plan.push(')');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SqlType, Value};
    use crate::executor::operator::MaterializedSource;

    fn make_rows(data: Vec<Vec<i64>>) -> Vec<Row> {
        data.into_iter()
            .map(|vals| Row::from_values(vals.into_iter().map(Value::integer).collect()))
            .collect()
    }

    fn make_source(data: Vec<Vec<i64>>, cols: Vec<&str>) -> Box<dyn RecordSource> {
        let rows = make_rows(data);
        let schema = cols.into_iter().map(ColumnInfo::new).collect();
        Box::new(MaterializedSource::new(rows, schema))
    }

    fn int_key(column: usize) -> KeyExpr {
        KeyExpr::column(column, SqlType::Integer)
    }

    fn collect(join: &mut HashJoinOperator) -> Vec<Row> {
        let mut results = Vec::new();
        join.open().unwrap();
        while let Some(row) = join.next().unwrap() {
            results.push(row);
        }
        join.close().unwrap();
        results
    }

    fn ints(row: &Row) -> Vec<i64> {
        row.iter()
            .map(|v| match v {
                Value::Integer(i) => *i,
                other => panic!("unexpected value {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_two_way_join() {
        let leader = make_source(vec![vec![1], vec![2], vec![3]], vec!["id"]);
        let inner = make_source(vec![vec![2], vec![2], vec![4]], vec!["id"]);

        let mut join = HashJoinOperator::new(
            ExecutionContext::new(),
            leader,
            vec![int_key(0)],
            vec![JoinInput::new(inner, vec![int_key(0)])],
            None,
        );

        let results = collect(&mut join);
        let rows: Vec<Vec<i64>> = results.iter().map(ints).collect();
        assert_eq!(rows, vec![vec![2, 2], vec![2, 2]]);
    }

    #[test]
    fn test_empty_inner_drains_leader() {
        let leader = make_source(vec![vec![1], vec![2]], vec!["id"]);
        let inner = make_source(vec![], vec!["id"]);

        let mut join = HashJoinOperator::new(
            ExecutionContext::new(),
            leader,
            vec![int_key(0)],
            vec![JoinInput::new(inner, vec![int_key(0)])],
            None,
        );

        assert!(collect(&mut join).is_empty());
    }

    #[test]
    fn test_next_before_open_returns_none() {
        let leader = make_source(vec![vec![1]], vec!["id"]);
        let inner = make_source(vec![vec![1]], vec!["id"]);

        let mut join = HashJoinOperator::new(
            ExecutionContext::new(),
            leader,
            vec![int_key(0)],
            vec![JoinInput::new(inner, vec![int_key(0)])],
            None,
        );

        assert!(join.next().unwrap().is_none());
    }

    #[test]
    fn test_schema_concatenates_children() {
        let leader = make_source(vec![], vec!["a", "b"]);
        let inner = make_source(vec![], vec!["c"]);

        let join = HashJoinOperator::new(
            ExecutionContext::new(),
            leader,
            vec![int_key(0)],
            vec![JoinInput::new(inner, vec![int_key(0)])],
            None,
        );

        let names: Vec<&str> = join.schema().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_default_selectivity_reduces_cardinality() {
        let leader = make_source(vec![vec![1], vec![2]], vec!["id"]);
        let inner = make_source(vec![vec![1], vec![2], vec![3]], vec!["id"]);

        let join = HashJoinOperator::new(
            ExecutionContext::new(),
            leader,
            vec![int_key(0)],
            vec![JoinInput::new(inner, vec![int_key(0)])],
            None,
        );

        // 2 x 3 x 0.1 for the single equality.
        assert!((join.cardinality() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_selectivity_wins() {
        let leader = make_source(vec![vec![1], vec![2]], vec!["id"]);
        let inner = make_source(vec![vec![1], vec![2], vec![3]], vec!["id"]);

        let join = HashJoinOperator::new(
            ExecutionContext::new(),
            leader,
            vec![int_key(0)],
            vec![JoinInput::new(inner, vec![int_key(0)])],
            Some(0.5),
        );

        assert!((join.cardinality() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_lock_record_not_supported() {
        let leader = make_source(vec![], vec!["id"]);
        let inner = make_source(vec![], vec!["id"]);

        let mut join = HashJoinOperator::new(
            ExecutionContext::new(),
            leader,
            vec![int_key(0)],
            vec![JoinInput::new(inner, vec![int_key(0)])],
            None,
        );

        assert_eq!(join.lock_record(), Err(Error::RecordLockNotSupported));
        assert!(join.refetch().unwrap());
    }
}
