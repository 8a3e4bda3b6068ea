//! Command dispatch and handler modules.

mod dump;
mod tree;

use miette::Result;

use depdump_ops::WalkSettings;
use depdump_util::errors::DumpError;

use crate::cli::{Cli, Command, WalkArgs};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Dump {
            walk,
            output,
            compact,
        } => {
            let snapshot = walk.snapshot.clone();
            dump::exec(walk_settings(walk)?, snapshot, output, compact)
        }
        Command::Tree { walk } => {
            let snapshot = walk.snapshot.clone();
            tree::exec(walk_settings(walk)?, snapshot)
        }
    }
}

fn walk_settings(args: WalkArgs) -> Result<WalkSettings> {
    let working_dir = std::env::current_dir().map_err(DumpError::Io)?;
    Ok(WalkSettings {
        working_dir,
        config: args.config,
        scope: args.scope,
        groups: args.groups,
        max_depth: args.max_depth,
    })
}
