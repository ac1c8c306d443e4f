//! zpart shell binary support.
//!
//! Wires the CLI, config file and logging together and hands control to [`shell::Shell`].

pub mod cli;
pub mod shell;

use anyhow::{bail, Context};
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use zpart_core::config::Config;
use zpart_core::logging;
use zpart_hal::LinuxHal;

use crate::cli::Cli;
use crate::shell::Shell;

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(prompt) = &cli.root_prompt {
        config.root_prompt = prompt.clone();
    }
    if let Some(dir) = &cli.temp_dir {
        config.temp_dir = dir.clone();
    }

    logging::init(Some(&config.log_file()), cli.verbose);
    log::info!("zpart starting, temp dir {}", config.temp_dir.display());

    let hal = LinuxHal::new(config.timeouts.to_timeouts())
        .with_echo(true)
        .with_dry_run(cli.dry_run);

    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut shell = Shell::new(&hal, &config.root_prompt, stdout.lock(), stderr.lock());

    let Some(file) = &cli.file else {
        shell.cmdloop(io::stdin().lock())?;
        return Ok(());
    };

    let script = if cli.script_is_stdin() {
        let mut script = String::new();
        io::stdin()
            .read_to_string(&mut script)
            .context("failed to read script from stdin")?;
        script
    } else {
        fs::read_to_string(file)
            .with_context(|| format!("failed to read script {}", file.display()))?
    };

    let failures = shell.batch(&script)?;
    if failures > 0 {
        bail!("{} command(s) failed", failures);
    }
    Ok(())
}
