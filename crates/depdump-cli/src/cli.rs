//! CLI argument definitions for depdump.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "depdump",
    version,
    about = "Dump a resolved dependency graph as JSON",
    long_about = "depdump walks an already-resolved dependency graph snapshot, group by group, \
                  and writes it as a nested JSON document. Components reached more than once \
                  are expanded only the first time and marked `alreadySeen` afterwards."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the dependency report as JSON
    Dump {
        #[command(flatten)]
        walk: WalkArgs,
        /// Output file (default: build/dependencies.json)
        #[arg(short, long, env = "DEPDUMP_OUTPUT")]
        output: Option<PathBuf>,
        /// Write single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print the dependency report as a text tree
    Tree {
        #[command(flatten)]
        walk: WalkArgs,
    },
}

/// Arguments shared by every command that walks a snapshot.
#[derive(Args, Debug)]
pub struct WalkArgs {
    /// Resolution snapshot (JSON)
    pub snapshot: PathBuf,
    /// Visited-set scope: group, root, global
    #[arg(short, long)]
    pub scope: Option<String>,
    /// Only include groups matching this glob (repeatable)
    #[arg(short, long = "group")]
    pub groups: Vec<String>,
    /// Fail when dependencies nest deeper than this (default: 512)
    #[arg(long)]
    pub max_depth: Option<usize>,
    /// Configuration file (default: ./depdump.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn parse() -> Cli {
    Cli::parse()
}
