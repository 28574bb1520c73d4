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
//! Filter tree wire codec.
//!
//! Responsibilities:
//! - Encodes and decodes filter trees for transport between the coordinator and the
//!   storage tier.
//! - Implements binary parsing helpers with strict bounds and tag validation.
//!
//! Key exported interfaces:
//! - Functions: `encode_filter`, `decode_filter`.
//!
//! Current limitations:
//! - The wire form carries only the tree; producer-side metadata such as the
//!   approximation-column set is deliberately not serialized.

use crate::common::config;
use crate::common::ids::ColumnRef;
use crate::filter::{CompareOp, FilterArena, FilterId, FilterNode};

const FILTER_CODEC_VERSION: u8 = 0x1;

const TAG_AND: u8 = 1;
const TAG_OR: u8 = 2;
const TAG_NOT: u8 = 3;
const TAG_COMPARE: u8 = 4;
const TAG_COLUMN: u8 = 5;
const TAG_CONSTANT: u8 = 6;
const TAG_CONST_TRUE: u8 = 7;
const TAG_CONST_FALSE: u8 = 8;
const TAG_FUNCTION: u8 = 9;

impl CompareOp {
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            CompareOp::Eq => 0,
            CompareOp::Neq => 1,
            CompareOp::In => 2,
            CompareOp::Lt => 3,
            CompareOp::Lte => 4,
            CompareOp::Gt => 5,
            CompareOp::Gte => 6,
        }
    }
}

impl TryFrom<u8> for CompareOp {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CompareOp::Eq),
            1 => Ok(CompareOp::Neq),
            2 => Ok(CompareOp::In),
            3 => Ok(CompareOp::Lt),
            4 => Ok(CompareOp::Lte),
            5 => Ok(CompareOp::Gt),
            6 => Ok(CompareOp::Gte),
            _ => Err(format!("unknown comparison operator value: {value}")),
        }
    }
}

/// Encode the subtree rooted at `root` into a self-contained wire payload.
pub fn encode_filter(arena: &FilterArena, root: FilterId) -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    buf.push(FILTER_CODEC_VERSION);
    encode_node(arena, root, &mut buf)?;
    Ok(buf)
}

fn encode_node(arena: &FilterArena, id: FilterId, buf: &mut Vec<u8>) -> Result<(), String> {
    let node = arena
        .node(id)
        .ok_or_else(|| "invalid FilterId".to_string())?;
    match node {
        FilterNode::And(children) => {
            buf.push(TAG_AND);
            write_children(arena, children, buf)?;
        }
        FilterNode::Or(children) => {
            buf.push(TAG_OR);
            write_children(arena, children, buf)?;
        }
        FilterNode::Not(child) => {
            buf.push(TAG_NOT);
            encode_node(arena, *child, buf)?;
        }
        FilterNode::Compare { op, children } => {
            buf.push(TAG_COMPARE);
            buf.push(op.as_u8());
            write_children(arena, children, buf)?;
        }
        FilterNode::Column(column) => {
            buf.push(TAG_COLUMN);
            buf.extend_from_slice(&column.as_u32().to_le_bytes());
        }
        FilterNode::Constant(values) => {
            buf.push(TAG_CONSTANT);
            buf.extend_from_slice(&(values.len() as u32).to_le_bytes());
            for value in values {
                buf.extend_from_slice(&(value.len() as u32).to_le_bytes());
                buf.extend_from_slice(value);
            }
        }
        FilterNode::ConstTrue => buf.push(TAG_CONST_TRUE),
        FilterNode::ConstFalse => buf.push(TAG_CONST_FALSE),
        FilterNode::Function { name, children } => {
            buf.push(TAG_FUNCTION);
            buf.extend_from_slice(&(name.len() as u32).to_le_bytes());
            buf.extend_from_slice(name.as_bytes());
            write_children(arena, children, buf)?;
        }
    }
    Ok(())
}

fn write_children(
    arena: &FilterArena,
    children: &[FilterId],
    buf: &mut Vec<u8>,
) -> Result<(), String> {
    buf.extend_from_slice(&(children.len() as u32).to_le_bytes());
    for child in children {
        encode_node(arena, *child, buf)?;
    }
    Ok(())
}

/// Decode a wire payload into a fresh arena, returning the root id.
pub fn decode_filter(data: &[u8]) -> Result<(FilterArena, FilterId), String> {
    if data.is_empty() {
        return Err("filter payload is empty".to_string());
    }
    let mut offset = 0usize;
    let version = read_u8(data, &mut offset)?;
    if version != FILTER_CODEC_VERSION {
        return Err(format!("unsupported filter codec version: {version}"));
    }
    let mut arena = FilterArena::default();
    let root = decode_node(data, &mut offset, &mut arena, 0)?;
    if offset != data.len() {
        return Err(format!(
            "filter payload has {} trailing bytes",
            data.len() - offset
        ));
    }
    Ok((arena, root))
}

fn decode_node(
    data: &[u8],
    offset: &mut usize,
    arena: &mut FilterArena,
    depth: usize,
) -> Result<FilterId, String> {
    if depth > config::max_decode_depth() {
        return Err("filter payload exceeds max nesting depth".to_string());
    }
    let tag = read_u8(data, offset)?;
    let node = match tag {
        TAG_AND => FilterNode::And(read_children(data, offset, arena, depth)?),
        TAG_OR => FilterNode::Or(read_children(data, offset, arena, depth)?),
        TAG_NOT => FilterNode::Not(decode_node(data, offset, arena, depth + 1)?),
        TAG_COMPARE => {
            let op = CompareOp::try_from(read_u8(data, offset)?)?;
            let children = read_children(data, offset, arena, depth)?;
            FilterNode::Compare { op, children }
        }
        TAG_COLUMN => FilterNode::Column(ColumnRef::new(read_u32_le(data, offset)?)),
        TAG_CONSTANT => {
            let value_count = read_u32_le(data, offset)? as usize;
            let mut values = Vec::with_capacity(value_count.min(1024));
            for _ in 0..value_count {
                values.push(read_bytes(data, offset)?);
            }
            FilterNode::Constant(values)
        }
        TAG_CONST_TRUE => FilterNode::ConstTrue,
        TAG_CONST_FALSE => FilterNode::ConstFalse,
        TAG_FUNCTION => {
            let name_bytes = read_bytes(data, offset)?;
            let name = String::from_utf8(name_bytes)
                .map_err(|e| format!("function filter name is not utf8: {e}"))?;
            let children = read_children(data, offset, arena, depth)?;
            FilterNode::Function { name, children }
        }
        _ => return Err(format!("unknown filter node tag: {tag}")),
    };
    Ok(arena.push(node))
}

fn read_children(
    data: &[u8],
    offset: &mut usize,
    arena: &mut FilterArena,
    depth: usize,
) -> Result<Vec<FilterId>, String> {
    let child_count = read_u32_le(data, offset)? as usize;
    let mut children = Vec::with_capacity(child_count.min(1024));
    for _ in 0..child_count {
        children.push(decode_node(data, offset, arena, depth + 1)?);
    }
    Ok(children)
}

fn read_u8(data: &[u8], offset: &mut usize) -> Result<u8, String> {
    if data.len() < *offset + 1 {
        return Err("filter payload truncated".to_string());
    }
    let v = data[*offset];
    *offset += 1;
    Ok(v)
}

fn read_u32_le(data: &[u8], offset: &mut usize) -> Result<u32, String> {
    if data.len() < *offset + 4 {
        return Err("filter payload truncated".to_string());
    }
    let v = u32::from_le_bytes([
        data[*offset],
        data[*offset + 1],
        data[*offset + 2],
        data[*offset + 3],
    ]);
    *offset += 4;
    Ok(v)
}

fn read_bytes(data: &[u8], offset: &mut usize) -> Result<Vec<u8>, String> {
    let len = read_u32_le(data, offset)? as usize;
    if data.len() < *offset + len {
        return Err("filter payload truncated".to_string());
    }
    let v = data[*offset..*offset + len].to_vec();
    *offset += len;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::structurally_eq;

    fn sample_tree(arena: &mut FilterArena) -> FilterId {
        let col1 = arena.push(FilterNode::Column(ColumnRef::new(1)));
        let vals = arena.push(FilterNode::Constant(vec![
            vec![0, 1],
            vec![0, 3],
        ]));
        let in_pred = arena.push(FilterNode::Compare {
            op: CompareOp::In,
            children: vec![col1, vals],
        });

        let col2 = arena.push(FilterNode::Column(ColumnRef::new(2)));
        let bound = arena.push(FilterNode::Constant(vec![vec![0, 7]]));
        let lt = arena.push(FilterNode::Compare {
            op: CompareOp::Lt,
            children: vec![col2, bound],
        });
        let not_lt = arena.push(FilterNode::Not(lt));

        let t = arena.push(FilterNode::ConstTrue);
        let or = arena.push(FilterNode::Or(vec![not_lt, t]));
        arena.push(FilterNode::And(vec![in_pred, or]))
    }

    #[test]
    fn test_roundtrip_structural_equality() {
        let mut arena = FilterArena::default();
        let root = sample_tree(&mut arena);

        let bytes = encode_filter(&arena, root).expect("encode");
        let (decoded, decoded_root) = decode_filter(&bytes).expect("decode");
        assert!(structurally_eq(&arena, root, &decoded, decoded_root));
    }

    #[test]
    fn test_roundtrip_function_node() {
        let mut arena = FilterArena::default();
        let col = arena.push(FilterNode::Column(ColumnRef::new(9)));
        let func = arena.push(FilterNode::Function {
            name: "like".to_string(),
            children: vec![col],
        });
        let bytes = encode_filter(&arena, func).expect("encode");
        let (decoded, decoded_root) = decode_filter(&bytes).expect("decode");
        assert!(structurally_eq(&arena, func, &decoded, decoded_root));
    }

    #[test]
    fn test_reject_empty_and_bad_version() {
        assert!(decode_filter(&[]).is_err());
        let err = decode_filter(&[0x7F, TAG_CONST_TRUE]).unwrap_err();
        assert!(err.contains("unsupported filter codec version"));
    }

    #[test]
    fn test_reject_unknown_tag_and_truncation() {
        let err = decode_filter(&[FILTER_CODEC_VERSION, 0xEE]).unwrap_err();
        assert!(err.contains("unknown filter node tag"));

        let mut arena = FilterArena::default();
        let root = sample_tree(&mut arena);
        let bytes = encode_filter(&arena, root).expect("encode");
        let err = decode_filter(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(err.contains("truncated"));
    }

    #[test]
    fn test_reject_trailing_bytes() {
        let mut arena = FilterArena::default();
        let root = arena.push(FilterNode::ConstFalse);
        let mut bytes = encode_filter(&arena, root).expect("encode");
        bytes.push(0);
        let err = decode_filter(&bytes).unwrap_err();
        assert!(err.contains("trailing"));
    }

    #[test]
    fn test_unknown_compare_op_value() {
        let payload = vec![
            FILTER_CODEC_VERSION,
            TAG_COMPARE,
            0x63, // no such operator
            0,
            0,
            0,
            0,
        ];
        let err = decode_filter(&payload).unwrap_err();
        assert!(err.contains("unknown comparison operator"));
    }
}
