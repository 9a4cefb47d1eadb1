//! CLI module for Prashna
//!
//! Provides command-line interface parsing for the `prashna` binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Prashna - ask questions about your documents, get answers in your language
#[derive(Parser, Debug)]
#[command(
    name = "prashna",
    version,
    about = "Prashna - document-grounded question answering with translated answers",
    long_about = "Indexes a directory of documents, answers questions from their content and\n\
                  translates every answer into the configured target language (Marathi by default).\n\n\
                  Run without a subcommand to start the HTTP server.",
    after_help = "EXAMPLES:\n    \
                  prashna                                  # Build the index and start the server\n    \
                  prashna index                            # Build the index and print a report\n    \
                  prashna ask \"What is the capital of Maharashtra?\"\n    \
                  prashna config --validate                # Check prashna.toml and required secrets\n    \
                  prashna --config my.toml serve           # Use a custom config file"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "prashna.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Build the index and start the HTTP server (default)
    Serve,

    /// Build the index from the source directory and print a report
    Index,

    /// Answer one question and print the answer with its translation
    Ask {
        /// The question to ask
        question: String,
    },

    /// Show configuration information
    Config {
        /// Also check that required environment variables are set
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The subcommand to run; no subcommand means `serve`.
    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Serve)
    }
}
