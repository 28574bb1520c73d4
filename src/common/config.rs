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
use crate::cubepush_config::try_config;

pub(crate) fn default_code_width() -> usize {
    try_config()
        .map(|c| c.pushdown.default_code_width)
        .unwrap_or(4)
}

pub(crate) fn max_decode_depth() -> usize {
    try_config()
        .map(|c| c.pushdown.max_decode_depth)
        .unwrap_or(512)
}
