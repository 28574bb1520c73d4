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
use hashbrown::HashSet;
use tracing::debug;

use crate::common::ids::ColumnRef;
use crate::dict::Segment;
use crate::filter::codec::{decode_filter, encode_filter};
use crate::filter::{EvaluatableTuple, FilterArena, FilterId};
use crate::push::rewrite::rewrite_filter;

/// Rewritten filter tree plus its approximation metadata, ready for transport to and
/// evaluation at the storage tier.
///
/// `filter == None` means "match everything" and serializes to an empty byte sequence.
/// The approximation-column set exists only on the producing side; the wire form does
/// not carry it, so a deserialized envelope always reports it empty.
#[derive(Clone, Debug)]
pub struct PushedFilter {
    filter: Option<(FilterArena, FilterId)>,
    approximation_columns: HashSet<ColumnRef>,
}

impl PushedFilter {
    /// Rewrite `root` against `segment` and wrap the result.
    ///
    /// The rewritten tree is serialized and immediately deserialized before being
    /// returned: the envelope must hold exactly the tree a remote storage-tier evaluator
    /// would reconstruct, so wire-form fidelity is checked here rather than trusted.
    pub fn from_filter(
        segment: &Segment,
        arena: &FilterArena,
        root: FilterId,
    ) -> Result<Self, String> {
        let rewritten = rewrite_filter(arena, root, segment)?;
        let bytes = encode_filter(&rewritten.arena, rewritten.root)?;
        let (copy, copy_root) = decode_filter(&bytes)?;
        debug!(
            "pushed filter for segment {}: {} bytes, {} approximate columns",
            segment.name(),
            bytes.len(),
            rewritten.approximation_columns.len()
        );
        Ok(Self {
            filter: Some((copy, copy_root)),
            approximation_columns: rewritten.approximation_columns,
        })
    }

    /// Empty bytes when there is no tree; otherwise the tree's wire encoding.
    pub fn serialize(&self) -> Result<Vec<u8>, String> {
        match &self.filter {
            None => Ok(Vec::new()),
            Some((arena, root)) => encode_filter(arena, *root),
        }
    }

    /// Empty bytes are the reserved sentinel for "no filter, match everything".
    pub fn deserialize(bytes: &[u8]) -> Result<Self, String> {
        if bytes.is_empty() {
            return Ok(Self {
                filter: None,
                approximation_columns: HashSet::new(),
            });
        }
        let (arena, root) = decode_filter(bytes)?;
        Ok(Self {
            filter: Some((arena, root)),
            approximation_columns: HashSet::new(),
        })
    }

    /// Evaluate against one encoded row; an absent tree matches unconditionally.
    pub fn evaluate(&self, tuple: &dyn EvaluatableTuple) -> Result<bool, String> {
        match &self.filter {
            None => Ok(true),
            Some((arena, root)) => arena.evaluate(*root, tuple),
        }
    }

    pub fn filter(&self) -> Option<(&FilterArena, FilterId)> {
        self.filter.as_ref().map(|(arena, root)| (arena, *root))
    }

    /// Columns whose pushed filtering is approximate; the coordinator must still apply
    /// the original exact predicate on them after candidate rows return.
    pub fn approximation_columns(&self) -> &HashSet<ColumnRef> {
        &self.approximation_columns
    }
}
