//! Operation: serialize a resolution snapshot to a JSON report file.

use std::path::PathBuf;

use depdump_core::report::ReportStats;
use depdump_util::errors::{DumpError, DumpResult};
use depdump_util::fs::{write_if_changed, WriteOutcome};

use crate::{walk_snapshot, WalkSettings};

/// Options for `depdump dump`.
#[derive(Debug, Clone, Default)]
pub struct DumpOptions {
    pub settings: WalkSettings,
    /// Snapshot file to read.
    pub snapshot: PathBuf,
    /// Overrides `[output] path`.
    pub output: Option<PathBuf>,
    /// Write single-line JSON instead of the pretty-printed form.
    pub compact: bool,
}

/// What [`dump`] produced.
#[derive(Debug)]
pub struct DumpSummary {
    pub output: PathBuf,
    pub outcome: WriteOutcome,
    pub stats: ReportStats,
}

/// Walk the snapshot and write the report.
///
/// The output file is replaced atomically, and left alone entirely when it
/// already holds the same document.
pub fn dump(opts: &DumpOptions) -> DumpResult<DumpSummary> {
    let settings = &opts.settings;
    let mut config = settings.load_config()?;
    if let Some(output) = &opts.output {
        config.output.path = output.clone();
    }
    if opts.compact {
        config.output.pretty = false;
    }

    let snapshot_path = settings.resolve(&opts.snapshot);
    let report = walk_snapshot(&snapshot_path, &config)?;

    let document = if config.output.pretty {
        report.to_json_pretty()
    } else {
        report.to_json_compact()
    }
    .map_err(DumpError::Serialization)?;

    let output = settings.resolve(&config.output.path);
    let outcome = write_if_changed(&output, document.as_bytes()).map_err(DumpError::Io)?;
    let stats = report.stats();
    tracing::info!("Dumped {} to {}: {stats}", snapshot_path.display(), output.display());

    Ok(DumpSummary {
        output,
        outcome,
        stats,
    })
}
