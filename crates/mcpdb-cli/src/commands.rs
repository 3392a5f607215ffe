//! Main commands enum and migration subcommands.

use clap::Subcommand;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Apply, revert or list schema migrations
    Migrate {
        #[command(subcommand)]
        command: MigrateCommand,
    },

    /// Check the live schema against the entity descriptors (SQLite only)
    Verify,

    /// Show resolved paths for the data directory and database file
    Paths,
}

/// Migration subcommands.
#[derive(Subcommand)]
pub enum MigrateCommand {
    /// Apply pending migrations
    Up {
        /// Stop after this version instead of applying everything
        #[arg(long)]
        to: Option<i64>,
    },

    /// Revert the most recent migration
    Down {
        /// Revert every migration newer than this version (0 reverts all)
        #[arg(long)]
        to: Option<i64>,
    },

    /// List every known migration and whether it is applied
    Status,
}
