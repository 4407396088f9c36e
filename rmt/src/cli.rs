use clap::Parser;
use std::path::PathBuf;

/// Matches editor backup files such as `notes.txt~`.
pub const DEFAULT_PATTERN: &str = ".*~";

/// Removes all files whose names match a pattern
#[derive(Debug, Parser)]
#[command(name = "rmt", version)]
pub struct Cli {
    /// Directory to clean [default: current directory]
    pub dir: Option<PathBuf>,

    /// Walk subdirectories too
    #[arg(short, long)]
    pub recursive: bool,

    /// Ask before removing each file
    #[arg(short, long)]
    pub interactive: bool,

    /// Only print what would be removed
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Pattern a file name must match
    #[arg(short, long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Match the pattern anywhere in the name instead of the whole name
    #[arg(long)]
    pub search: bool,
}
