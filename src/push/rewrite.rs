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
//! Predicate rewriter: logical literals to dictionary code words.
//!
//! Responsibilities:
//! - Walks a logical filter tree and emits a storage-tier tree in a fresh arena,
//!   translating comparison literals through the segment dictionaries.
//! - Neutralizes subtrees the storage tier cannot interpret, recording the affected
//!   columns so the coordinator re-applies the exact predicate after rows return.
//!
//! Key exported interfaces:
//! - Types: `RewrittenFilter`.
//! - Functions: `rewrite_filter`.
//!
//! Current limitations:
//! - The capability boundary is the shape-based `is_evaluable_recursively` predicate;
//!   it must stay in sync with what the storage-tier evaluator actually supports.

use hashbrown::HashSet;

use crate::common::ids::ColumnRef;
use crate::dict::{RoundingDirection, Segment, is_null_code};
use crate::filter::{
    CompareOp, FilterArena, FilterId, FilterNode, collect_columns, is_evaluable_recursively,
};
use crate::push::translate::translate;

/// Result of one rewrite pass: the pushed tree plus the columns whose filtering became
/// approximate (collapsed toward TRUE) and still need exact re-evaluation downstream.
#[derive(Clone, Debug)]
pub struct RewrittenFilter {
    pub arena: FilterArena,
    pub root: FilterId,
    pub approximation_columns: HashSet<ColumnRef>,
}

/// Rewrite the logical subtree rooted at `root` against `segment`'s dictionaries.
///
/// The input arena is never mutated; the returned tree lives in its own arena.
pub fn rewrite_filter(
    input: &FilterArena,
    root: FilterId,
    segment: &Segment,
) -> Result<RewrittenFilter, String> {
    let mut arena = FilterArena::default();
    let mut approximation_columns = HashSet::new();
    let root = rewrite_node(input, root, segment, &mut arena, &mut approximation_columns)?;
    Ok(RewrittenFilter {
        arena,
        root,
        approximation_columns,
    })
}

fn rewrite_node(
    input: &FilterArena,
    id: FilterId,
    segment: &Segment,
    out: &mut FilterArena,
    approx: &mut HashSet<ColumnRef>,
) -> Result<FilterId, String> {
    let node = input
        .node(id)
        .ok_or_else(|| "invalid FilterId".to_string())?;

    // NOT over an unevaluable child must be replaced with TRUE here, at the NOT node.
    // If the child alone were collapsed to TRUE by the generic rule below, the outer NOT
    // would flip it to FALSE and silently drop matching rows.
    if let FilterNode::Not(child) = node {
        if !is_evaluable_recursively(input, *child) {
            collect_columns(input, *child, approx);
            return Ok(out.push(FilterNode::ConstTrue));
        }
    }

    match node {
        FilterNode::And(children) => {
            let children = rewrite_children(input, children, segment, out, approx)?;
            Ok(out.push(FilterNode::And(children)))
        }
        FilterNode::Or(children) => {
            let children = rewrite_children(input, children, segment, out, approx)?;
            Ok(out.push(FilterNode::Or(children)))
        }
        FilterNode::Not(child) => {
            let child = rewrite_node(input, *child, segment, out, approx)?;
            Ok(out.push(FilterNode::Not(child)))
        }
        FilterNode::Compare { op, children } => {
            rewrite_compare(input, id, *op, children, segment, out, approx)
        }
        FilterNode::Column(column) => Ok(out.push(FilterNode::Column(*column))),
        FilterNode::Constant(values) => Ok(out.push(FilterNode::Constant(values.clone()))),
        FilterNode::ConstTrue => Ok(out.push(FilterNode::ConstTrue)),
        FilterNode::ConstFalse => Ok(out.push(FilterNode::ConstFalse)),
        FilterNode::Function { .. } => {
            // The storage tier cannot run this construct; widen to TRUE and let the
            // coordinator re-check its columns. An enclosing NOT was already neutralized
            // at the NOT node above, so no negation can flip this into FALSE.
            collect_columns(input, id, approx);
            Ok(out.push(FilterNode::ConstTrue))
        }
    }
}

fn rewrite_children(
    input: &FilterArena,
    children: &[FilterId],
    segment: &Segment,
    out: &mut FilterArena,
    approx: &mut HashSet<ColumnRef>,
) -> Result<Vec<FilterId>, String> {
    let mut rewritten = Vec::with_capacity(children.len());
    for child in children {
        rewritten.push(rewrite_node(input, *child, segment, out, approx)?);
    }
    Ok(rewritten)
}

fn rewrite_compare(
    input: &FilterArena,
    id: FilterId,
    op: CompareOp,
    children: &[FilterId],
    segment: &Segment,
    out: &mut FilterArena,
    approx: &mut HashSet<ColumnRef>,
) -> Result<FilterId, String> {
    if !is_evaluable_recursively(input, id) {
        collect_columns(input, id, approx);
        return Ok(out.push(FilterNode::ConstTrue));
    }

    // Extract the column and constant operands.
    let mut column = None;
    let mut values: Vec<Vec<u8>> = Vec::new();
    for child in children {
        match input.node(*child) {
            Some(FilterNode::Column(c)) => column = Some(*c),
            Some(FilterNode::Constant(vs)) => values.extend(vs.iter().cloned()),
            // Unreachable after the evaluable check; kept as a loud guard.
            _ => return Err("comparison child must be a column or constant leaf".to_string()),
        }
    }

    // Degenerate comparison: nothing to translate, pass through unchanged.
    let Some(column) = column else {
        let children = rewrite_children(input, children, segment, out, approx)?;
        return Ok(out.push(FilterNode::Compare { op, children }));
    };
    if values.is_empty() {
        let children = rewrite_children(input, children, segment, out, approx)?;
        return Ok(out.push(FilterNode::Compare { op, children }));
    }

    // A column that is not dictionary-coded in this segment cannot be filtered at the
    // storage tier at all; neutralize toward TRUE and let the coordinator re-check.
    if !segment.has_column(column) {
        approx.insert(column);
        return Ok(out.push(FilterNode::ConstTrue));
    }

    let first_value = values[0].as_slice();
    let node = match op {
        CompareOp::Eq | CompareOp::In => {
            let mut new_values = Vec::with_capacity(values.len());
            for value in &values {
                let code = translate(segment, column, value, RoundingDirection::Exact);
                if !is_null_code(&code) {
                    new_values.push(code);
                }
            }
            if new_values.is_empty() {
                // No member of the set exists in this segment; the comparison can never hold.
                FilterNode::ConstFalse
            } else {
                new_compare(out, op, column, new_values)
            }
        }
        CompareOp::Neq => {
            let code = translate(segment, column, first_value, RoundingDirection::Exact);
            if is_null_code(&code) {
                // The literal never occurs in this segment, so "not equal" holds vacuously.
                FilterNode::ConstTrue
            } else {
                new_compare(out, op, column, vec![code])
            }
        }
        CompareOp::Lt => {
            let code = translate(segment, column, first_value, RoundingDirection::RoundUp);
            if is_null_code(&code) {
                // Literal is above the segment maximum; every stored value is less.
                FilterNode::ConstTrue
            } else {
                new_compare(out, op, column, vec![code])
            }
        }
        CompareOp::Lte => {
            let code = translate(segment, column, first_value, RoundingDirection::RoundDown);
            if is_null_code(&code) {
                // Literal is below the segment minimum; nothing stored can be <= it.
                FilterNode::ConstFalse
            } else {
                new_compare(out, op, column, vec![code])
            }
        }
        CompareOp::Gt => {
            let code = translate(segment, column, first_value, RoundingDirection::RoundDown);
            if is_null_code(&code) {
                // Literal is below the segment minimum; every stored value is greater.
                FilterNode::ConstTrue
            } else {
                new_compare(out, op, column, vec![code])
            }
        }
        CompareOp::Gte => {
            let code = translate(segment, column, first_value, RoundingDirection::RoundUp);
            if is_null_code(&code) {
                // Literal is above the segment maximum; nothing stored can be >= it.
                FilterNode::ConstFalse
            } else {
                new_compare(out, op, column, vec![code])
            }
        }
    };
    Ok(out.push(node))
}

fn new_compare(
    out: &mut FilterArena,
    op: CompareOp,
    column: ColumnRef,
    values: Vec<Vec<u8>>,
) -> FilterNode {
    let column = out.push(FilterNode::Column(column));
    let constant = out.push(FilterNode::Constant(values));
    FilterNode::Compare {
        op,
        children: vec![column, constant],
    }
}
