use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Task board client for directors, managers and their teams.
/// Works against a JSON snapshot of the task backend.
#[derive(Parser)]
#[command(name = "tb", version, about = "Department task board client")]
pub struct Cli {
    /// Data directory (defaults to $TB_DIR or ~/.taskboard).
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Path to the snapshot file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
