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
use std::collections::HashMap;
use std::sync::Arc;

use crate::common::config;
use crate::common::ids::ColumnRef;
use crate::dict::dictionary::SegmentDictionary;

/// One sealed cube segment's view of its row-key dictionaries.
///
/// Columns without a registered dictionary are not storage-tier filterable in this
/// segment; the rewriter must neutralize comparisons on them instead of translating.
#[derive(Clone, Debug, Default)]
pub struct Segment {
    name: String,
    dicts: HashMap<ColumnRef, Arc<SegmentDictionary>>,
}

impl Segment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dicts: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_dictionary(&mut self, column: ColumnRef, dict: Arc<SegmentDictionary>) {
        self.dicts.insert(column, dict);
    }

    /// Build and register a dictionary from raw values using the configured default width.
    pub fn add_column_values(
        &mut self,
        column: ColumnRef,
        values: Vec<Vec<u8>>,
    ) -> Result<(), String> {
        let dict = SegmentDictionary::new(config::default_code_width(), values)?;
        self.add_dictionary(column, Arc::new(dict));
        Ok(())
    }

    pub fn dictionary(&self, column: ColumnRef) -> Option<&Arc<SegmentDictionary>> {
        self.dicts.get(&column)
    }

    pub fn has_column(&self, column: ColumnRef) -> bool {
        self.dicts.contains_key(&column)
    }

    pub fn code_width(&self, column: ColumnRef) -> Option<usize> {
        self.dicts.get(&column).map(|d| d.code_width())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_registry() {
        let mut seg = Segment::new("seg-2024-q1");
        assert_eq!(seg.name(), "seg-2024-q1");
        let col = ColumnRef::new(3);
        assert!(!seg.has_column(col));
        assert!(seg.dictionary(col).is_none());

        seg.add_column_values(col, vec![b"a".to_vec(), b"b".to_vec()])
            .expect("add values");
        assert!(seg.has_column(col));
        assert_eq!(seg.code_width(col), Some(4));
        assert_eq!(seg.dictionary(col).unwrap().len(), 2);
    }
}
