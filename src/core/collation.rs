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

//! Text collations.
//!
//! A collation maps a string to a binary sort key: two strings that compare
//! equal under the collation produce byte-identical sort keys. The hash join
//! relies on this to compare collated text keys without re-running the
//! collation comparator per candidate pair.

/// A text collation attached to a CHAR/VARCHAR type.
///
/// The absence of a collation means plain binary text: the key image is the
/// raw bytes padded with spaces (see the key encoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collation {
    /// ASCII case-insensitive: sort keys fold letters to upper case.
    CaseInsensitive,
}

impl Collation {
    /// Byte width of the sort key produced for a declared string length.
    pub fn key_length(&self, declared: usize) -> usize {
        match self {
            // Case folding is 1:1 on bytes, so the key is as wide as the
            // declared string.
            Collation::CaseInsensitive => declared,
        }
    }

    /// Write the unique sort key for `src` into `dst`, padding with spaces.
    ///
    /// `dst` must be exactly `key_length` bytes for the declared length.
    /// Input longer than the key is truncated; the declared length is the
    /// maximum the planner allows, so truncation only trims equal tails.
    pub fn string_to_key(&self, src: &str, dst: &mut [u8]) {
        match self {
            Collation::CaseInsensitive => {
                let bytes = src.as_bytes();
                let n = bytes.len().min(dst.len());
                for (d, b) in dst[..n].iter_mut().zip(bytes) {
                    *d = b.to_ascii_uppercase();
                }
                dst[n..].fill(b' ');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_folds_and_pads() {
        let mut key = [0u8; 6];
        Collation::CaseInsensitive.string_to_key("abC", &mut key);
        assert_eq!(&key, b"ABC   ");
    }

    #[test]
    fn test_equal_under_collation_means_equal_keys() {
        let mut a = [0u8; 4];
        let mut b = [0u8; 4];
        Collation::CaseInsensitive.string_to_key("Rust", &mut a);
        Collation::CaseInsensitive.string_to_key("rUST", &mut b);
        assert_eq!(a, b);

        Collation::CaseInsensitive.string_to_key("ruse", &mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn test_overlong_input_truncates() {
        let mut key = [0u8; 3];
        Collation::CaseInsensitive.string_to_key("abcdef", &mut key);
        assert_eq!(&key, b"ABC");
    }

    #[test]
    fn test_key_length_matches_declared() {
        assert_eq!(Collation::CaseInsensitive.key_length(10), 10);
    }
}
