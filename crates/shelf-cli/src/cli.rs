use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "shelf",
    about = "shelf: version selected parts of your filesystem",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Repository directory [default: $HOME/.shelf]
    #[arg(long, global = true)]
    pub repo: Option<PathBuf>,

    /// Canonical root every tracked path is stored relative to
    #[arg(long, global = true, default_value = "/")]
    pub root: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the repository directory
    Init,
    /// Start tracking a directory or file as a root
    Track(TrackArgs),
    /// Stage files and print the resulting hash
    Add(AddArgs),
    /// Show staging and worktree status of tracked paths
    Status(StatusArgs),
    /// Record the index as a new snapshot
    Commit(CommitArgs),
    /// Show snapshot history
    Log(LogArgs),
}

#[derive(Args)]
pub struct TrackArgs {
    pub paths: Vec<PathBuf>,
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Print one `XY path` line per path without color
    #[arg(short, long)]
    pub short: bool,
}

#[derive(Args)]
pub struct CommitArgs {
    #[arg(short, long)]
    pub message: String,
    /// Author recorded in the commit [default: $USER]
    #[arg(long)]
    pub author: Option<String>,
}

#[derive(Args)]
pub struct LogArgs {
    #[arg(long)]
    pub oneline: bool,
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}
