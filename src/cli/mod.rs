//! CLI module for wirequery
//!
//! Provides command-line interface for:
//! - filter: Print the filter string of a query document
//! - plan: Print the plan and wire parameters as JSON
//! - explain: Print a human-readable explain
//! - functions: List registered function mappings

mod args;
mod commands;
mod document;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{explain, filter, functions, plan, run, run_command};
pub use document::{QueryDocument, QueryStep};
pub use errors::{CliError, CliResult};
pub use io::{read_input, write_response, write_text};
