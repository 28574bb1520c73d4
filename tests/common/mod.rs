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
//! Common utilities and helpers for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use cubepush::{
    ColumnRef, EvaluatableTuple, RoundingDirection, Segment, SegmentDictionary, cubepush_config,
    cubepush_logging,
};

/// Test configuration for integration tests.
pub struct TestConfig {
    /// Temporary directory for test artifacts
    pub temp_dir: TempDir,
    /// Test config path
    pub config_path: PathBuf,
}

impl TestConfig {
    /// Create a new test configuration with default settings.
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let config_path = temp_dir.path().join("test_cubepush.toml");

        // Create a minimal test config
        let config_content = r#"
log_level = "warn"

[pushdown]
default_code_width = 2
max_decode_depth = 64
"#;

        std::fs::write(&config_path, config_content)?;
        let cfg = cubepush_config::init_from_path(&config_path)?;
        cubepush_logging::init_with_level(&cfg.effective_log_filter());

        Ok(Self {
            temp_dir,
            config_path,
        })
    }
}

/// A tuple backed by literal values, as the coordinator sees decoded rows.
pub struct LiteralTuple {
    values: HashMap<ColumnRef, Vec<u8>>,
}

impl LiteralTuple {
    pub fn new(entries: &[(u32, &[u8])]) -> Self {
        let values = entries
            .iter()
            .map(|(col, value)| (ColumnRef::new(*col), value.to_vec()))
            .collect();
        Self { values }
    }

    /// Encode this row into the code words the storage tier would hold in its row key.
    pub fn encode(&self, segment: &Segment) -> CodeTuple {
        let values = self
            .values
            .iter()
            .map(|(col, value)| {
                let code = segment
                    .dictionary(*col)
                    .map(|d| d.code_of(value, RoundingDirection::Exact))
                    .unwrap_or_else(|| vec![0xFF]);
                (*col, code)
            })
            .collect();
        CodeTuple { values }
    }
}

impl EvaluatableTuple for LiteralTuple {
    fn value_of(&self, column: ColumnRef) -> Option<&[u8]> {
        self.values.get(&column).map(|v| v.as_slice())
    }
}

/// A tuple backed by fixed-width code words, as the storage tier sees rows.
pub struct CodeTuple {
    values: HashMap<ColumnRef, Vec<u8>>,
}

impl EvaluatableTuple for CodeTuple {
    fn value_of(&self, column: ColumnRef) -> Option<&[u8]> {
        self.values.get(&column).map(|v| v.as_slice())
    }
}

/// A two-dimension segment: column 1 over {10, 20, 30}, column 2 over {ca, ny, wa}.
pub fn sample_segment() -> Segment {
    let mut seg = Segment::new("seg-it");
    let col1 = SegmentDictionary::new(2, vec![b"10".to_vec(), b"20".to_vec(), b"30".to_vec()])
        .expect("dictionary");
    let col2 = SegmentDictionary::new(2, vec![b"ca".to_vec(), b"ny".to_vec(), b"wa".to_vec()])
        .expect("dictionary");
    seg.add_dictionary(ColumnRef::new(1), Arc::new(col1));
    seg.add_dictionary(ColumnRef::new(2), Arc::new(col2));
    seg
}

/// Every row the sample segment can store (cross product of both dictionaries).
pub fn sample_rows() -> Vec<LiteralTuple> {
    let mut rows = Vec::new();
    for v1 in [b"10".as_slice(), b"20", b"30"] {
        for v2 in [b"ca".as_slice(), b"ny", b"wa"] {
            rows.push(LiteralTuple::new(&[(1, v1), (2, v2)]));
        }
    }
    rows
}
