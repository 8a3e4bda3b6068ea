//! Handler for `depdump dump`.

use std::path::PathBuf;

use miette::Result;

use depdump_ops::ops_dump::{self, DumpOptions};
use depdump_ops::WalkSettings;
use depdump_util::fs::WriteOutcome;
use depdump_util::progress;

pub fn exec(
    settings: WalkSettings,
    snapshot: PathBuf,
    output: Option<PathBuf>,
    compact: bool,
) -> Result<()> {
    let opts = DumpOptions {
        settings,
        snapshot,
        output,
        compact,
    };
    let summary = ops_dump::dump(&opts)?;

    let shown = summary
        .output
        .strip_prefix(&opts.settings.working_dir)
        .unwrap_or(summary.output.as_path())
        .display()
        .to_string();
    match summary.outcome {
        WriteOutcome::Written => {
            progress::status("Wrote", &format!("{shown} ({})", summary.stats))
        }
        WriteOutcome::UpToDate => progress::status_info("Fresh", &shown),
    }
    if summary.stats.unresolved > 0 {
        progress::status_warn(
            "Unresolved",
            &format!(
                "{} requests could not be resolved",
                summary.stats.unresolved
            ),
        );
    }
    Ok(())
}
