//! CLI definitions for fgl.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "fgl",
    version,
    about = "Informix 4GL syntax checker",
    after_help = "Examples:\n  fgl check src/\n  fgl check --config fgl.toml main.4gl lib/*.4gl\n  fgl tokens main.4gl --lines\n  fgl grammar --conflicts"
)]
pub struct Cli {
    /// Show debug logging.
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse source files and report diagnostics.
    Check {
        /// Configuration file (default: fgl.toml in the current directory).
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Files, directories or glob patterns.
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<String>,
    },
    /// Print the tokens of a file.
    Tokens {
        /// Source file.
        file: PathBuf,
        /// Scan line by line and show the state carried between lines.
        #[arg(long)]
        lines: bool,
    },
    /// Print statistics of the built-in grammar.
    Grammar {
        /// List every resolved parser conflict.
        #[arg(long)]
        conflicts: bool,
    },
}
