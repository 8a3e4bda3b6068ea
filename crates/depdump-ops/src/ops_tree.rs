//! Operation: render a resolution snapshot as a text tree.

use std::path::PathBuf;

use depdump_util::errors::DumpResult;

use crate::{walk_snapshot, WalkSettings};

/// Options for `depdump tree`.
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    pub settings: WalkSettings,
    pub snapshot: PathBuf,
}

/// Walk the snapshot with the same truncation rules as [`crate::ops_dump::dump`]
/// and return the rendered tree.
pub fn tree(opts: &TreeOptions) -> DumpResult<String> {
    let config = opts.settings.load_config()?;
    let snapshot_path = opts.settings.resolve(&opts.snapshot);
    let report = walk_snapshot(&snapshot_path, &config)?;
    Ok(report.render_tree())
}
