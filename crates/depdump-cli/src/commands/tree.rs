//! Handler for `depdump tree`.

use std::path::PathBuf;

use miette::Result;

use depdump_ops::ops_tree::{self, TreeOptions};
use depdump_ops::WalkSettings;

pub fn exec(settings: WalkSettings, snapshot: PathBuf) -> Result<()> {
    let rendered = ops_tree::tree(&TreeOptions { settings, snapshot })?;
    print!("{rendered}");
    Ok(())
}
