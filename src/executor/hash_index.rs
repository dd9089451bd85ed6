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

//! Multi-stream hash index for the hash join.
//!
//! The index is a directory of `stream_count x TABLE_SIZE` collision lists:
//! one row of buckets per inner stream, all addressed by the same
//! `hash % TABLE_SIZE` slot. A probe ([`HashIndex::setup`]) succeeds only
//! when *every* stream has at least one entry with the probe hash, which is
//! what lets the join skip a leader row with a single lookup instead of one
//! per stream.
//!
//! Collision lists are append-only during build, then sorted by hash once
//! ([`HashIndex::sort_all`]) so `setup`/`reset` can binary-search and
//! iteration can walk forward while the hash stays equal. The sort is
//! stable, so entries with equal hashes keep their build (row position)
//! order.
//!
//! # Memory Layout
//!
//! ```text
//! HashIndex
//! ├── slots: Vec<Option<CollisionList>>  [stream_count * TABLE_SIZE]
//! └── slot: usize                        // bucket remembered by setup()
//!
//! CollisionList
//! ├── entries: Vec<HashEntry>  // sorted by hash after build
//! └── cursor: usize            // per-stream iteration state
//! ```

/// Number of buckets per stream.
///
/// A prime, so key distributions with a stride do not pile into a few
/// buckets. The directory is not resized; see [`HashIndex::max_capacity`].
const TABLE_SIZE: usize = 1009;

/// Entries per slot pre-allocated on first insert.
const BUCKET_PREALLOCATE: usize = 32;

const INVALID_CURSOR: usize = usize::MAX;

/// One indexed row: the full key hash and the row's position in its
/// stream's buffered materialization.
#[derive(Debug, Clone, Copy)]
struct HashEntry {
    hash: u32,
    position: u32,
}

/// The entries sharing one bucket slot, with the iteration cursor used
/// during probing.
#[derive(Debug)]
struct CollisionList {
    entries: Vec<HashEntry>,
    cursor: usize,
}

impl CollisionList {
    fn new() -> Self {
        Self {
            entries: Vec::with_capacity(BUCKET_PREALLOCATE),
            cursor: INVALID_CURSOR,
        }
    }

    fn add(&mut self, hash: u32, position: u32) {
        self.entries.push(HashEntry { hash, position });
    }

    fn sort(&mut self) {
        // Stable: equal hashes keep build order, i.e. ascending position.
        self.entries.sort_by_key(|entry| entry.hash);
    }

    /// Position the cursor at the first entry with this hash.
    fn locate(&mut self, hash: u32) -> bool {
        let first = self.entries.partition_point(|entry| entry.hash < hash);
        if first < self.entries.len() && self.entries[first].hash == hash {
            self.cursor = first;
            return true;
        }
        self.cursor = INVALID_CURSOR;
        false
    }

    /// Yield the cursor's position and advance, while the hash matches.
    fn iterate(&mut self, hash: u32) -> Option<u32> {
        if self.cursor >= self.entries.len() {
            return None;
        }
        let entry = self.entries[self.cursor];
        self.cursor += 1;
        if entry.hash != hash {
            self.cursor = INVALID_CURSOR;
            return None;
        }
        Some(entry.position)
    }
}

/// Hash directory shared by all inner streams of one hash join.
pub struct HashIndex {
    stream_count: usize,
    slots: Vec<Option<CollisionList>>,
    /// Bucket remembered by the last successful `setup`.
    slot: usize,
}

impl HashIndex {
    pub fn new(stream_count: usize) -> Self {
        debug_assert!(stream_count > 0);
        let mut slots = Vec::new();
        slots.resize_with(stream_count * TABLE_SIZE, || None);
        Self {
            stream_count,
            slots,
            slot: 0,
        }
    }

    /// Rows per stream beyond which lookups degrade toward linear.
    ///
    /// Binary search across 1000 collisions costs about as much as linear
    /// search across 10, which is the rough bound of acceptable lookup
    /// performance. The index stays correct past this; the planner should
    /// prefer another strategy.
    pub fn max_capacity() -> usize {
        TABLE_SIZE * 1000
    }

    /// Append an entry for `stream` during build.
    pub fn put(&mut self, stream: usize, hash: u32, position: u32) {
        debug_assert!(stream < self.stream_count);
        let slot = hash as usize % TABLE_SIZE;
        self.slots[stream * TABLE_SIZE + slot]
            .get_or_insert_with(CollisionList::new)
            .add(hash, position);
    }

    /// Sort every collision list; must run after build, before any probe.
    pub fn sort_all(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.sort();
        }
    }

    /// Prepare iteration for a probe hash.
    ///
    /// Returns true only if every stream's bucket holds an entry with this
    /// exact hash; on success the bucket is remembered and every stream's
    /// cursor points at its first matching entry.
    pub fn setup(&mut self, hash: u32) -> bool {
        let slot = hash as usize % TABLE_SIZE;

        for stream in 0..self.stream_count {
            let Some(collisions) = self.slots[stream * TABLE_SIZE + slot].as_mut() else {
                return false;
            };
            if !collisions.locate(hash) {
                return false;
            }
        }

        self.slot = slot;
        true
    }

    /// Rewind one stream's cursor to its first entry for `hash`.
    pub fn reset(&mut self, stream: usize, hash: u32) {
        debug_assert!(stream < self.stream_count);
        if let Some(collisions) = self.slots[stream * TABLE_SIZE + self.slot].as_mut() {
            collisions.locate(hash);
        }
    }

    /// Yield the next matching position for `stream`, advancing its cursor.
    pub fn iterate(&mut self, stream: usize, hash: u32) -> Option<u32> {
        debug_assert!(stream < self.stream_count);
        self.slots[stream * TABLE_SIZE + self.slot]
            .as_mut()
            .and_then(|collisions| collisions.iterate(hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_requires_every_stream() {
        let mut index = HashIndex::new(2);
        index.put(0, 100, 0);
        index.sort_all();

        // Stream 1 has no entry for hash 100.
        assert!(!index.setup(100));

        index.put(1, 100, 5);
        index.sort_all();
        assert!(index.setup(100));
    }

    #[test]
    fn test_iterate_in_build_order() {
        let mut index = HashIndex::new(1);
        index.put(0, 7, 2);
        index.put(0, 7, 0);

        // Same bucket, different hash: must not surface for hash 7.
        index.put(0, 7 + TABLE_SIZE as u32, 1);
        index.sort_all();

        assert!(index.setup(7));
        // Stable sort keeps insertion order among equal hashes.
        assert_eq!(index.iterate(0, 7), Some(2));
        assert_eq!(index.iterate(0, 7), Some(0));
        assert_eq!(index.iterate(0, 7), None);
        // Cursor is invalid after exhaustion.
        assert_eq!(index.iterate(0, 7), None);
    }

    #[test]
    fn test_bucket_collision_is_filtered_by_hash() {
        let mut index = HashIndex::new(1);
        let colliding = 3 + TABLE_SIZE as u32;
        index.put(0, colliding, 9);
        index.sort_all();

        // Hash 3 maps to the same bucket but no entry carries hash 3.
        assert!(!index.setup(3));
        assert!(index.setup(colliding));
        assert_eq!(index.iterate(0, colliding), Some(9));
    }

    #[test]
    fn test_reset_rewinds_cursor() {
        let mut index = HashIndex::new(1);
        index.put(0, 42, 1);
        index.put(0, 42, 2);
        index.sort_all();

        assert!(index.setup(42));
        assert_eq!(index.iterate(0, 42), Some(1));
        assert_eq!(index.iterate(0, 42), Some(2));
        assert_eq!(index.iterate(0, 42), None);

        index.reset(0, 42);
        assert_eq!(index.iterate(0, 42), Some(1));
    }

    #[test]
    fn test_streams_are_independent() {
        let mut index = HashIndex::new(2);
        index.put(0, 8, 0);
        index.put(1, 8, 10);
        index.put(1, 8, 11);
        index.sort_all();

        assert!(index.setup(8));
        assert_eq!(index.iterate(0, 8), Some(0));
        assert_eq!(index.iterate(1, 8), Some(10));
        assert_eq!(index.iterate(1, 8), Some(11));
        assert_eq!(index.iterate(0, 8), None);
        assert_eq!(index.iterate(1, 8), None);
    }

    #[test]
    fn test_empty_index_never_sets_up() {
        let mut index = HashIndex::new(3);
        index.sort_all();
        assert!(!index.setup(0));
        assert!(!index.setup(12345));
    }

    #[test]
    fn test_max_capacity_hint() {
        assert_eq!(HashIndex::max_capacity(), 1009 * 1000);
    }
}
