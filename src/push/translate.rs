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
use crate::common::ids::ColumnRef;
use crate::dict::{RoundingDirection, Segment};

/// Translate one literal into the code word that replaces it in a rewritten comparison.
///
/// Pure function of the segment's sealed dictionary state. "Not representable in the
/// rounding direction" is a normal outcome reported as the NULL sentinel, never an
/// error; the rewriter decides per operator what the sentinel means. A column with no
/// dictionary in this segment has no representable values at all, so every literal maps
/// to the sentinel.
pub fn translate(
    segment: &Segment,
    column: ColumnRef,
    literal: &[u8],
    rounding: RoundingDirection,
) -> Vec<u8> {
    match segment.dictionary(column) {
        Some(dict) => dict.code_of(literal, rounding),
        None => vec![0xFF],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict::{SegmentDictionary, is_null_code};
    use std::sync::Arc;

    fn segment() -> Segment {
        let dict = SegmentDictionary::new(
            2,
            vec![b"10".to_vec(), b"20".to_vec(), b"30".to_vec()],
        )
        .expect("dictionary");
        let mut seg = Segment::new("seg-a");
        seg.add_dictionary(ColumnRef::new(1), Arc::new(dict));
        seg
    }

    #[test]
    fn test_verbatim_hit_ignores_direction() {
        let seg = segment();
        let col = ColumnRef::new(1);
        let exact = translate(&seg, col, b"20", RoundingDirection::Exact);
        assert_eq!(translate(&seg, col, b"20", RoundingDirection::RoundUp), exact);
        assert_eq!(
            translate(&seg, col, b"20", RoundingDirection::RoundDown),
            exact
        );
        assert!(!is_null_code(&exact));
    }

    #[test]
    fn test_absent_literal_rounds_or_signals_null() {
        let seg = segment();
        let col = ColumnRef::new(1);
        assert!(is_null_code(&translate(
            &seg,
            col,
            b"25",
            RoundingDirection::Exact
        )));

        let up = translate(&seg, col, b"25", RoundingDirection::RoundUp);
        let down = translate(&seg, col, b"25", RoundingDirection::RoundDown);
        let dict = seg.dictionary(col).unwrap();
        assert_eq!(dict.value_of(&up), Some(b"30".as_slice()));
        assert_eq!(dict.value_of(&down), Some(b"20".as_slice()));

        // Outside the representable range in the rounding direction.
        assert!(is_null_code(&translate(
            &seg,
            col,
            b"40",
            RoundingDirection::RoundUp
        )));
        assert!(is_null_code(&translate(
            &seg,
            col,
            b"05",
            RoundingDirection::RoundDown
        )));
    }

    #[test]
    fn test_unknown_column_maps_to_sentinel() {
        let seg = segment();
        let code = translate(&seg, ColumnRef::new(99), b"10", RoundingDirection::Exact);
        assert!(is_null_code(&code));
    }
}
