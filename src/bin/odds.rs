//! Simple program to estimate hold'em win probabilities from the command line, uses the [oddsrs::equity::cli] module.

use clap::Parser;

use oddsrs::equity::cli;

/// Entrypoint for the odds CLI program, which sets up logging (controlled by `RUST_LOG`) then parses and runs the CLI.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::try_init().ok();
    cli::Args::parse().run()
}
