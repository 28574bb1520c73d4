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
//! Generic filter tree over arena-allocated nodes.
//!
//! Responsibilities:
//! - Owns the closed set of filter node variants and the arena they live in.
//! - Provides the capability predicate (`is_evaluable_recursively`) and column
//!   collection used by the push-down rewriter.
//! - Evaluates trees against encoded tuples (see `eval`).
//!
//! Key exported interfaces:
//! - Types: `FilterArena`, `FilterId`, `FilterNode`, `CompareOp`, `EvaluatableTuple`.
//! - Functions: `is_evaluable_recursively`, `collect_columns`, `structurally_eq`.

pub mod codec;
mod eval;

use hashbrown::HashSet;

use crate::common::ids::ColumnRef;

pub use eval::EvaluatableTuple;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct FilterId(pub usize);

/// Comparison operators the storage tier understands over code words.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CompareOp {
    Eq,
    Neq,
    In,
    Lt,
    Lte,
    Gt,
    Gte,
}

#[derive(Clone, Debug)]
pub enum FilterNode {
    And(Vec<FilterId>),
    Or(Vec<FilterId>),
    Not(FilterId),
    /// Comparison over one `Column` child plus zero-or-more `Constant` children.
    /// Degenerate shapes (no column, no constants) are tolerated and passed through
    /// by the rewriter.
    Compare {
        op: CompareOp,
        children: Vec<FilterId>,
    },
    Column(ColumnRef),
    /// One or more literal byte values; a singleton for scalar comparisons, a set for IN.
    Constant(Vec<Vec<u8>>),
    ConstTrue,
    ConstFalse,
    /// Opaque construct the storage tier cannot interpret (LIKE, CASE and friends in the
    /// coordinator's richer expression language). Never evaluable at the storage tier.
    Function {
        name: String,
        children: Vec<FilterId>,
    },
}

/// Arena of filter nodes. Trees are immutable once built: rewriting emits into a fresh
/// arena and never mutates its input, so the logical filter stays available to other
/// consumers of the query context.
#[derive(Clone, Debug, Default)]
pub struct FilterArena {
    nodes: Vec<FilterNode>,
}

impl FilterArena {
    pub fn push(&mut self, node: FilterNode) -> FilterId {
        let id = FilterId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: FilterId) -> Option<&FilterNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Evaluate the subtree rooted at `id` against one encoded tuple.
    pub fn evaluate(&self, id: FilterId, tuple: &dyn EvaluatableTuple) -> Result<bool, String> {
        eval::evaluate_node(self, id, tuple)
    }
}

fn children_of(node: &FilterNode) -> &[FilterId] {
    match node {
        FilterNode::And(children) | FilterNode::Or(children) => children,
        FilterNode::Not(child) => std::slice::from_ref(child),
        FilterNode::Compare { children, .. } => children,
        FilterNode::Function { children, .. } => children,
        FilterNode::Column(_)
        | FilterNode::Constant(_)
        | FilterNode::ConstTrue
        | FilterNode::ConstFalse => &[],
    }
}

/// Whether the whole subtree can be resolved by the storage tier using only encoded
/// row-key data.
///
/// `Function` nodes are never storage-tier evaluable, and a `Compare` only qualifies when
/// every child is a plain `Column` or `Constant` leaf. A dangling id counts as not
/// evaluable rather than a panic: the rewriter neutralizes such subtrees.
pub fn is_evaluable_recursively(arena: &FilterArena, id: FilterId) -> bool {
    let Some(node) = arena.node(id) else {
        return false;
    };
    match node {
        FilterNode::Function { .. } => false,
        FilterNode::Compare { children, .. } => children.iter().all(|child| {
            matches!(
                arena.node(*child),
                Some(FilterNode::Column(_)) | Some(FilterNode::Constant(_))
            )
        }),
        _ => children_of(node)
            .iter()
            .all(|child| is_evaluable_recursively(arena, *child)),
    }
}

/// Collect every column referenced anywhere in the subtree into `out`.
pub fn collect_columns(arena: &FilterArena, id: FilterId, out: &mut HashSet<ColumnRef>) {
    let Some(node) = arena.node(id) else {
        return;
    };
    if let FilterNode::Column(column) = node {
        out.insert(*column);
    }
    for child in children_of(node) {
        collect_columns(arena, *child, out);
    }
}

/// Structural equality of two subtrees, independent of arena node numbering.
pub fn structurally_eq(a: &FilterArena, ia: FilterId, b: &FilterArena, ib: FilterId) -> bool {
    match (a.node(ia), b.node(ib)) {
        (Some(na), Some(nb)) => match (na, nb) {
            (FilterNode::And(ca), FilterNode::And(cb))
            | (FilterNode::Or(ca), FilterNode::Or(cb)) => {
                ca.len() == cb.len()
                    && ca
                        .iter()
                        .zip(cb.iter())
                        .all(|(x, y)| structurally_eq(a, *x, b, *y))
            }
            (FilterNode::Not(ca), FilterNode::Not(cb)) => structurally_eq(a, *ca, b, *cb),
            (
                FilterNode::Compare {
                    op: oa,
                    children: ca,
                },
                FilterNode::Compare {
                    op: ob,
                    children: cb,
                },
            ) => {
                oa == ob
                    && ca.len() == cb.len()
                    && ca
                        .iter()
                        .zip(cb.iter())
                        .all(|(x, y)| structurally_eq(a, *x, b, *y))
            }
            (FilterNode::Column(ca), FilterNode::Column(cb)) => ca == cb,
            (FilterNode::Constant(va), FilterNode::Constant(vb)) => va == vb,
            (FilterNode::ConstTrue, FilterNode::ConstTrue) => true,
            (FilterNode::ConstFalse, FilterNode::ConstFalse) => true,
            (
                FilterNode::Function {
                    name: na,
                    children: ca,
                },
                FilterNode::Function {
                    name: nb,
                    children: cb,
                },
            ) => {
                na == nb
                    && ca.len() == cb.len()
                    && ca
                        .iter()
                        .zip(cb.iter())
                        .all(|(x, y)| structurally_eq(a, *x, b, *y))
            }
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compare_on(arena: &mut FilterArena, op: CompareOp, col: u32, value: &[u8]) -> FilterId {
        let column = arena.push(FilterNode::Column(ColumnRef::new(col)));
        let constant = arena.push(FilterNode::Constant(vec![value.to_vec()]));
        arena.push(FilterNode::Compare {
            op,
            children: vec![column, constant],
        })
    }

    #[test]
    fn test_plain_compare_is_evaluable() {
        let mut arena = FilterArena::default();
        let cmp = compare_on(&mut arena, CompareOp::Eq, 1, b"x");
        assert!(is_evaluable_recursively(&arena, cmp));
    }

    #[test]
    fn test_function_subtree_is_not_evaluable() {
        let mut arena = FilterArena::default();
        let column = arena.push(FilterNode::Column(ColumnRef::new(1)));
        let like = arena.push(FilterNode::Function {
            name: "like".to_string(),
            children: vec![column],
        });
        let not = arena.push(FilterNode::Not(like));
        assert!(!is_evaluable_recursively(&arena, like));
        assert!(!is_evaluable_recursively(&arena, not));
    }

    #[test]
    fn test_compare_with_nested_child_is_not_evaluable() {
        let mut arena = FilterArena::default();
        let inner = compare_on(&mut arena, CompareOp::Eq, 1, b"x");
        let constant = arena.push(FilterNode::Constant(vec![b"y".to_vec()]));
        let outer = arena.push(FilterNode::Compare {
            op: CompareOp::Eq,
            children: vec![inner, constant],
        });
        assert!(!is_evaluable_recursively(&arena, outer));
    }

    #[test]
    fn test_collect_columns_walks_whole_subtree() {
        let mut arena = FilterArena::default();
        let a = compare_on(&mut arena, CompareOp::Eq, 1, b"x");
        let b = compare_on(&mut arena, CompareOp::Lt, 2, b"y");
        let and = arena.push(FilterNode::And(vec![a, b]));
        let not = arena.push(FilterNode::Not(and));

        let mut cols = HashSet::new();
        collect_columns(&arena, not, &mut cols);
        assert_eq!(cols.len(), 2);
        assert!(cols.contains(&ColumnRef::new(1)));
        assert!(cols.contains(&ColumnRef::new(2)));
    }

    #[test]
    fn test_structural_eq_ignores_node_numbering() {
        let mut a = FilterArena::default();
        let ca = compare_on(&mut a, CompareOp::In, 1, b"x");
        let ra = a.push(FilterNode::Not(ca));

        let mut b = FilterArena::default();
        // Same shape, different push order for unrelated nodes.
        let _pad = b.push(FilterNode::ConstTrue);
        let cb = compare_on(&mut b, CompareOp::In, 1, b"x");
        let rb = b.push(FilterNode::Not(cb));

        assert!(structurally_eq(&a, ra, &b, rb));
        assert!(!structurally_eq(&a, ra, &b, cb));
    }
}
