pub mod ops_dump;
pub mod ops_tree;

use std::path::{Path, PathBuf};

use depdump_core::config::DumpConfig;
use depdump_core::report::DependencyReport;
use depdump_core::serializer::{self, SeenScope, SerializeOptions};
use depdump_core::snapshot::ResolutionSnapshot;
use depdump_util::errors::DumpResult;

/// Settings shared by every operation that walks a snapshot.
#[derive(Debug, Clone, Default)]
pub struct WalkSettings {
    /// Directory relative paths are resolved against.
    pub working_dir: PathBuf,
    /// Explicit configuration file; otherwise `depdump.toml` in `working_dir`.
    pub config: Option<PathBuf>,
    /// Overrides `[traversal] seen-scope`.
    pub scope: Option<String>,
    /// Overrides `[traversal] groups` when non-empty.
    pub groups: Vec<String>,
    /// Overrides `[traversal] max-depth`.
    pub max_depth: Option<usize>,
}

impl WalkSettings {
    /// Load the configuration file and apply command-line overrides on top.
    pub fn load_config(&self) -> DumpResult<DumpConfig> {
        let mut config = match &self.config {
            Some(path) => DumpConfig::from_path(&self.resolve(path))?,
            None => DumpConfig::load_or_default(&self.working_dir)?,
        };
        if let Some(scope) = &self.scope {
            config.traversal.seen_scope = scope.parse::<SeenScope>()?;
        }
        if !self.groups.is_empty() {
            config.traversal.groups = self.groups.clone();
        }
        if let Some(max_depth) = self.max_depth {
            config.traversal.max_depth = max_depth;
        }
        Ok(config)
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }
}

/// Load `snapshot_path` and walk it according to `config`.
pub fn walk_snapshot(
    snapshot_path: &Path,
    config: &DumpConfig,
) -> DumpResult<DependencyReport> {
    let snapshot = ResolutionSnapshot::from_path(snapshot_path)?;
    if snapshot.has_cycles() {
        tracing::info!(
            "{} contains dependency cycles; repeated components are truncated",
            snapshot_path.display()
        );
    }
    let options = SerializeOptions {
        scope: config.traversal.seen_scope,
        groups: config.traversal.groups.clone(),
        max_depth: config.traversal.max_depth,
    };
    Ok(serializer::serialize(&snapshot, &options)?)
}
