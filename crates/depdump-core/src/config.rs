use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use depdump_util::errors::DumpResult;

use crate::serializer::{SeenScope, DEFAULT_MAX_DEPTH};

/// Name of the optional configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "depdump.toml";

/// Configuration loaded from `depdump.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DumpConfig {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub traversal: TraversalConfig,
}

/// Output settings from `[output]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            pretty: default_pretty(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("build/dependencies.json")
}

fn default_pretty() -> bool {
    true
}

/// Traversal settings from `[traversal]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraversalConfig {
    #[serde(default, rename = "seen-scope")]
    pub seen_scope: SeenScope,
    /// Glob patterns selecting which groups to emit.
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default = "default_max_depth", rename = "max-depth")]
    pub max_depth: usize,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            seen_scope: SeenScope::default(),
            groups: Vec::new(),
            max_depth: default_max_depth(),
        }
    }
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl DumpConfig {
    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> DumpResult<Self> {
        toml::from_str(content).map_err(|e| {
            depdump_util::errors::DumpError::Config {
                message: format!("Failed to parse {CONFIG_FILE_NAME}: {e}"),
            }
            .into()
        })
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn from_path(path: &Path) -> DumpResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            depdump_util::errors::DumpError::Config {
                message: format!("Failed to read {}: {e}", path.display()),
            }
        })?;
        Self::parse(&content)
    }

    /// Load `depdump.toml` from `dir`, or return defaults if the file doesn't exist.
    pub fn load_or_default(dir: &Path) -> DumpResult<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            tracing::debug!("Loading configuration from {}", path.display());
            Self::from_path(&path)
        } else {
            Ok(Self::default())
        }
    }
}
