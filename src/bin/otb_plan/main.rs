mod cli;
mod commands;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    otb_engine::logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Forecast(args) => commands::forecast(args),
        Command::Markdown(args) => commands::markdown(args),
        Command::Monitor(args) => commands::monitor(args),
        Command::Simulate(args) => commands::simulate(args),
    }
}
