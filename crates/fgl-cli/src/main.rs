//! CLI entrypoint for fgl.

mod check;
mod cli;
mod grammar;
mod tokens;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(2);
        }
    }
}

fn run(command: Command) -> anyhow::Result<bool> {
    match command {
        Command::Check { config, paths } => {
            let summary = check::run(config.as_deref(), &paths)?;
            Ok(summary.errors == 0)
        }
        Command::Tokens { file, lines } => tokens::run(&file, lines).map(|()| true),
        Command::Grammar { conflicts } => grammar::run(conflicts).map(|()| true),
    }
}
