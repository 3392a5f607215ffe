//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the MCP schema tooling.
#[derive(Parser)]
#[command(name = "mcpdb")]
#[command(about = "Run and inspect the MCP schema migrations")]
#[command(version)]
pub struct Cli {
    /// Database URL (postgres://... or sqlite:...)
    #[arg(long = "database-url", env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
