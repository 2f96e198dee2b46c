//! CLI argument definitions using clap
//!
//! Commands:
//! - wirequery filter --query <path> [--config <path>]
//! - wirequery plan --query <path> [--config <path>]
//! - wirequery explain --query <path> [--config <path>]
//! - wirequery functions [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// wirequery - compiles typed query chains into filter strings and request parameters
#[derive(Parser, Debug)]
#[command(name = "wirequery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the filter string of a query document
    Filter {
        /// Query document ("-" reads stdin)
        #[arg(long)]
        query: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the plan and wire parameters of a query document as JSON
    Plan {
        /// Query document ("-" reads stdin)
        #[arg(long)]
        query: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print a human-readable explain of a query document
    Explain {
        /// Query document ("-" reads stdin)
        #[arg(long)]
        query: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the registered function mappings
    Functions {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Filter { .. } => "filter",
            Command::Plan { .. } => "plan",
            Command::Explain { .. } => "explain",
            Command::Functions { .. } => "functions",
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
