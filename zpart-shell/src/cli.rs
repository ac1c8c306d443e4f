//! CLI argument parsing for zpart.
//!
//! Without FILE the interactive shell starts; with FILE its lines are run in batch mode.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "zpart")]
#[command(version, about = "zpart: Create, partition, format, and mount disk images with ease.")]
pub struct Cli {
    /// The prompt string of the root shell
    #[arg(long, value_name = "STR")]
    pub root_prompt: Option<String>,

    /// The directory to keep the session log in
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// TOML config file (root_prompt, temp_dir, [timeouts])
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print mutating commands instead of running them
    #[arg(long)]
    pub dry_run: bool,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Execute script in non-interactive mode. '-' = stdin
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

impl Cli {
    /// Whether the script comes from stdin.
    pub fn script_is_stdin(&self) -> bool {
        self.file.as_deref().is_some_and(|f| f.as_os_str() == "-")
    }
}
