use std::path::{Path, PathBuf};

use clap::Args;

use crate::output::OutputMode;
use crate::tui::explore::run_explorer;

/// Arguments for `egonav explore`.
#[derive(Args, Debug)]
pub struct ExploreArgs {
    /// Graph export (JSON).
    pub dataset: PathBuf,

    /// Write logs here while the explorer owns the terminal.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Execute `egonav explore`.
pub fn run_explore(args: &ExploreArgs, config: Option<&Path>, output: OutputMode) -> anyhow::Result<()> {
    let loaded = super::load(&args.dataset, config, output)?;
    run_explorer(&loaded.dataset, loaded.index, loaded.config)
}
