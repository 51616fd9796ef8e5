//! Binary entry point for the `axle` command line tool.
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use axle_cli::cli::{Cli, Command};
use axle_cli::commands;
use axle_cli::logging::{self, Logger};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    logging::init_subscriber(args.verbose);
    let log = Arc::new(Logger::new());

    match args.command {
        Command::Build(opts) => commands::build::run(&args.global, &opts, &log),
        Command::Check(opts) => commands::check::run(&args.global, &opts, &log),
        Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
