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
use crate::dict::is_null_code;
use crate::filter::{CompareOp, FilterArena, FilterId, FilterNode};

/// One concrete row as seen by the storage tier: per-column fixed-width code words.
///
/// Implementations hand out the code word stored in the row key; `None` means the row
/// carries no value for that column in this segment's layout.
pub trait EvaluatableTuple {
    fn value_of(&self, column: ColumnRef) -> Option<&[u8]>;
}

pub(crate) fn evaluate_node(
    arena: &FilterArena,
    id: FilterId,
    tuple: &dyn EvaluatableTuple,
) -> Result<bool, String> {
    let node = arena
        .node(id)
        .ok_or_else(|| "invalid FilterId".to_string())?;
    match node {
        FilterNode::And(children) => {
            for child in children {
                if !evaluate_node(arena, *child, tuple)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        FilterNode::Or(children) => {
            for child in children {
                if evaluate_node(arena, *child, tuple)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        FilterNode::Not(child) => Ok(!evaluate_node(arena, *child, tuple)?),
        FilterNode::ConstTrue => Ok(true),
        FilterNode::ConstFalse => Ok(false),
        FilterNode::Compare { op, children } => evaluate_compare(arena, *op, children, tuple),
        FilterNode::Column(_) | FilterNode::Constant(_) => {
            Err("bare column/constant node is not a boolean filter".to_string())
        }
        FilterNode::Function { name, .. } => Err(format!(
            "function filter '{}' cannot be evaluated at the storage tier",
            name
        )),
    }
}

fn evaluate_compare(
    arena: &FilterArena,
    op: CompareOp,
    children: &[FilterId],
    tuple: &dyn EvaluatableTuple,
) -> Result<bool, String> {
    let mut column = None;
    let mut values: Vec<&[u8]> = Vec::new();
    for child in children {
        match arena.node(*child) {
            Some(FilterNode::Column(c)) => column = Some(*c),
            Some(FilterNode::Constant(vs)) => values.extend(vs.iter().map(|v| v.as_slice())),
            _ => return Err("comparison child must be a column or constant leaf".to_string()),
        }
    }
    // Degenerate comparisons (no column, or no constant values) carry no constraint the
    // storage tier can apply; they pass through the rewriter verbatim, so evaluation
    // widens them to TRUE instead of rejecting a tree this crate itself produced.
    let Some(column) = column else {
        return Ok(true);
    };
    if values.is_empty() {
        return Ok(true);
    }

    // A row without a value for the column, or with the NULL sentinel stored, matches no
    // comparison (SQL NULL semantics carried into the encoded domain).
    let Some(actual) = tuple.value_of(column) else {
        return Ok(false);
    };
    if is_null_code(actual) {
        return Ok(false);
    }

    let first = values[0];
    let matched = match op {
        // EQ carries a set after rewriting (members are dropped/kept one by one), so it
        // shares membership semantics with IN.
        CompareOp::Eq | CompareOp::In => values.iter().any(|v| *v == actual),
        CompareOp::Neq => actual != first,
        CompareOp::Lt => actual < first,
        CompareOp::Lte => actual <= first,
        CompareOp::Gt => actual > first,
        CompareOp::Gte => actual >= first,
    };
    Ok(matched)
}
