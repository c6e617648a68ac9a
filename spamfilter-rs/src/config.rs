use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
}

/// Which kinds of feature tokens the tokenizer emits. The four options are
/// orthogonal and combine additively; everything is on by default.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenizerConfig {
    /// Emit the word-like parts themselves
    #[serde(default = "default_true")]
    pub use_bare: bool,
    /// Emit adjacent-pair digrams plus start/end markers
    #[serde(default = "default_true")]
    pub use_digrams: bool,
    /// Emit field-path prefixed variants of parts and digrams
    #[serde(default = "default_true")]
    pub use_prefixes: bool,
    /// Emit a length token for every array
    #[serde(default = "default_true")]
    pub use_array_length: bool,
}

fn default_true() -> bool {
    true
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        TokenizerConfig {
            use_bare: true,
            use_digrams: true,
            use_prefixes: true,
            use_array_length: true,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| FilterError::Config(e.to_string()))?;

        toml::from_str(&content).map_err(|e| FilterError::Config(e.to_string()))
    }
}
