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
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static CONFIG: OnceLock<CubepushConfig> = OnceLock::new();

fn default_log_level() -> String {
    "info".to_string()
}

pub fn init_from_path(path: impl AsRef<Path>) -> Result<&'static CubepushConfig> {
    if let Some(cfg) = CONFIG.get() {
        return Ok(cfg);
    }
    let path = path.as_ref().to_path_buf();
    let cfg = CubepushConfig::load_from_file(&path)?;
    let _ = CONFIG.set(cfg);
    Ok(CONFIG.get().expect("CONFIG set"))
}

pub fn init_from_env_or_default() -> Result<&'static CubepushConfig> {
    if let Some(cfg) = CONFIG.get() {
        return Ok(cfg);
    }
    let path = config_path_from_env_or_default()?;
    let cfg = CubepushConfig::load_from_file(&path)?;
    let _ = CONFIG.set(cfg);
    Ok(CONFIG.get().expect("CONFIG set"))
}

pub fn config() -> Result<&'static CubepushConfig> {
    init_from_env_or_default()
}

/// Non-loading accessor: returns the config only if some caller already initialized it.
/// Library code paths use this so pure operations never touch the filesystem.
pub fn try_config() -> Option<&'static CubepushConfig> {
    CONFIG.get()
}

fn config_path_from_env_or_default() -> Result<PathBuf> {
    if let Ok(p) = std::env::var("CUBEPUSH_CONFIG") {
        if !p.trim().is_empty() {
            return Ok(PathBuf::from(p));
        }
    }

    let candidates = [PathBuf::from("cubepush.toml")];
    for p in candidates {
        if p.exists() {
            return Ok(p);
        }
    }

    Err(anyhow!(
        "missing config file: set $CUBEPUSH_CONFIG or create ./cubepush.toml"
    ))
}

#[derive(Clone, Deserialize)]
pub struct CubepushConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional full tracing EnvFilter expression.
    /// If set, this takes precedence over `log_level`.
    /// Example: "cubepush=debug,cubepush::filter=trace"
    #[serde(default)]
    pub log_filter: Option<String>,

    #[serde(default)]
    pub pushdown: PushdownConfig,
}

impl CubepushConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config file: {}", path.display()))?;
        let cfg: CubepushConfig =
            toml::from_str(&s).with_context(|| format!("parse toml: {}", path.display()))?;
        Ok(cfg)
    }

    pub fn effective_log_filter(&self) -> String {
        self.log_filter
            .clone()
            .unwrap_or_else(|| self.log_level.clone())
    }
}

impl Default for CubepushConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_filter: None,
            pushdown: PushdownConfig::default(),
        }
    }
}

fn default_code_width() -> usize {
    4
}

fn default_max_decode_depth() -> usize {
    512
}

#[derive(Clone, Deserialize)]
pub struct PushdownConfig {
    /// Code-word width (bytes) used when building segment dictionaries without an
    /// explicit per-column width.
    #[serde(default = "default_code_width")]
    pub default_code_width: usize,

    /// Nesting-depth guard applied while decoding filter trees from the wire.
    #[serde(default = "default_max_decode_depth")]
    pub max_decode_depth: usize,
}

impl Default for PushdownConfig {
    fn default() -> Self {
        Self {
            default_code_width: default_code_width(),
            max_decode_depth: default_max_decode_depth(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let cfg: CubepushConfig = toml::from_str("").expect("empty config parses");
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.log_filter.is_none());
        assert_eq!(cfg.pushdown.default_code_width, 4);
        assert_eq!(cfg.pushdown.max_decode_depth, 512);
    }

    #[test]
    fn test_parse_pushdown_overrides() {
        let cfg: CubepushConfig = toml::from_str(
            r#"
log_level = "debug"

[pushdown]
default_code_width = 2
max_decode_depth = 64
"#,
        )
        .expect("config parses");
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.pushdown.default_code_width, 2);
        assert_eq!(cfg.pushdown.max_decode_depth, 64);
        assert_eq!(cfg.effective_log_filter(), "debug");
    }
}
