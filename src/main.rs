use clap::Parser;
use desktidy::cli::{self, Cli};
use desktidy::output::OutputFormatter;
use std::process;

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Err(e) = cli::run(cli) {
        OutputFormatter::error(&e);
        process::exit(1);
    }
}
