mod cli;
mod commands;
mod logging;

use cli::{Cli, Commands};
use commands::{assign, score};

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json);

    match &cli.command {
        Commands::Assign(args) => assign::run(&cli, args),
        Commands::Score(args) => score::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
