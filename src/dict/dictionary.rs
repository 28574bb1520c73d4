// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.
//! Order-preserving segment dictionary codec.
//!
//! Responsibilities:
//! - Maps literal byte values to fixed-width code words, assigned in sorted literal order
//!   so byte-wise code comparison is equivalent to literal-order comparison.
//! - Resolves absent literals to neighboring codes under an explicit rounding direction,
//!   or to the reserved NULL sentinel when no neighbor exists in that direction.
//!
//! Key exported interfaces:
//! - Types: `SegmentDictionary`, `RoundingDirection`.
//! - Functions: `is_null_code`.
//!
//! Current limitations:
//! - Dictionaries are sealed at construction; segments are immutable once published, so
//!   there is no incremental append path.

/// Policy for picking a substitute code when a literal is absent from the dictionary.
///
/// `Exact` is used by equality operators where a non-verbatim literal can never match;
/// the ordering operators round toward the side that preserves the comparison's row set.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RoundingDirection {
    Exact,
    RoundUp,
    RoundDown,
}

/// True if `code` is the reserved NULL sentinel (all bytes 0xFF).
///
/// The sentinel compares greater than every assigned code under byte-wise ordering, which
/// is why code assignment must leave the all-0xFF word unused.
pub fn is_null_code(code: &[u8]) -> bool {
    !code.is_empty() && code.iter().all(|b| *b == 0xFF)
}

/// Per-segment, per-column dictionary with order-preserving fixed-width codes.
///
/// Values are stored sorted and deduplicated; the value at sorted position `i` is assigned
/// code `i + 1`, big-endian encoded into `code_width` bytes. Code 0 is reserved so a code
/// word of all zero bytes never collides with an assigned value, and the all-0xFF word is
/// reserved as the NULL sentinel.
#[derive(Clone, Debug)]
pub struct SegmentDictionary {
    code_width: usize,
    values: Vec<Vec<u8>>,
}

impl SegmentDictionary {
    pub fn new(code_width: usize, mut values: Vec<Vec<u8>>) -> Result<Self, String> {
        if code_width == 0 || code_width > 8 {
            return Err(format!("invalid dictionary code width: {}", code_width));
        }
        values.sort();
        values.dedup();

        // Codes 1..=len must stay below the all-0xFF sentinel.
        let capacity = max_code_for_width(code_width);
        if values.len() as u64 >= capacity {
            return Err(format!(
                "dictionary with {} values exceeds capacity of {}-byte codes",
                values.len(),
                code_width
            ));
        }
        Ok(Self { code_width, values })
    }

    pub fn code_width(&self) -> usize {
        self.code_width
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest and largest literals observed in this segment, if any.
    pub fn min_value(&self) -> Option<&[u8]> {
        self.values.first().map(|v| v.as_slice())
    }

    pub fn max_value(&self) -> Option<&[u8]> {
        self.values.last().map(|v| v.as_slice())
    }

    pub fn null_code(&self) -> Vec<u8> {
        vec![0xFF; self.code_width]
    }

    /// Look up the code word for `value`, rounding to a neighbor when absent.
    ///
    /// A verbatim hit returns its exact code regardless of direction. Otherwise `RoundUp`
    /// resolves to the smallest entry strictly greater than `value`, `RoundDown` to the
    /// largest entry strictly less, and `Exact` to nothing; "nothing" in the requested
    /// direction is reported as the NULL sentinel, never as an error.
    pub fn code_of(&self, value: &[u8], rounding: RoundingDirection) -> Vec<u8> {
        match self.values.binary_search_by(|v| v.as_slice().cmp(value)) {
            Ok(index) => self.encode_position(index),
            Err(insert_at) => match rounding {
                RoundingDirection::Exact => self.null_code(),
                RoundingDirection::RoundUp => {
                    if insert_at < self.values.len() {
                        self.encode_position(insert_at)
                    } else {
                        self.null_code()
                    }
                }
                RoundingDirection::RoundDown => {
                    if insert_at > 0 {
                        self.encode_position(insert_at - 1)
                    } else {
                        self.null_code()
                    }
                }
            },
        }
    }

    /// Exact-only encode used when building test tuples and row keys.
    pub fn encode(&self, value: &[u8]) -> Vec<u8> {
        self.code_of(value, RoundingDirection::Exact)
    }

    /// Decode a code word back to its literal value.
    pub fn value_of(&self, code: &[u8]) -> Option<&[u8]> {
        if code.len() != self.code_width || is_null_code(code) {
            return None;
        }
        let mut id: u64 = 0;
        for b in code {
            id = (id << 8) | u64::from(*b);
        }
        if id == 0 {
            return None;
        }
        self.values.get((id - 1) as usize).map(|v| v.as_slice())
    }

    fn encode_position(&self, index: usize) -> Vec<u8> {
        let id = (index as u64) + 1;
        let be = id.to_be_bytes();
        be[8 - self.code_width..].to_vec()
    }
}

fn max_code_for_width(code_width: usize) -> u64 {
    if code_width >= 8 {
        u64::MAX
    } else {
        (1u64 << (8 * code_width)) - 1
    }
}
