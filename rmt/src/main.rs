//! rmt: removes files whose names match a pattern, `.*~` by default.

use anyhow::Context;
use clap::Parser;
use std::io;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod error;
mod remove;

use cli::Cli;
use error::ExitCode;
use remove::{Options, Remover};

fn init_logging() {
    let filter = EnvFilter::try_from_env("RMT_LOG").unwrap_or_else(|_| EnvFilter::new("off"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let exit_code = match run() {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("rmt: {}", e);
            match e.downcast_ref::<error::Error>() {
                Some(err) => ExitCode::from(err),
                None => ExitCode::Failure,
            }
        }
    };

    std::process::exit(exit_code as i32);
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let dir = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };
    let regex = regez::compile(&cli.pattern).map_err(error::Error::from)?;
    let opts = Options {
        recursive: cli.recursive,
        interactive: cli.interactive,
        dry_run: cli.dry_run,
        search: cli.search,
    };

    let mut remover = Remover::new(regex, opts, io::stdin().lock(), io::stdout().lock());
    let summary = remover.run(&dir)?;
    info!(
        matched = summary.matched,
        deleted = summary.deleted,
        failed = summary.failed,
        "done"
    );
    Ok(())
}
