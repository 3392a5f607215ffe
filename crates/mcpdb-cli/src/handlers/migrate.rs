//! Migrate command handlers.

use mcpdb_db::{AppliedMigration, MigrationState};

use crate::bootstrap::CliContext;
use crate::commands::MigrateCommand;
use crate::error::CliError;

/// Execute a migrate subcommand.
pub async fn execute(ctx: &CliContext, command: MigrateCommand) -> Result<(), CliError> {
    match command {
        MigrateCommand::Up { to } => up(ctx, to).await,
        MigrateCommand::Down { to } => down(ctx, to).await,
        MigrateCommand::Status => status(ctx).await,
    }
}

async fn up(ctx: &CliContext, to: Option<i64>) -> Result<(), CliError> {
    let applied = match to {
        Some(target) => ctx.pool.migrate_to(&ctx.migrator, target).await?,
        None => ctx.pool.migrate(&ctx.migrator).await?,
    };

    if applied.is_empty() {
        println!("Database is up to date.");
    } else {
        print_list("Applied", &applied);
    }
    Ok(())
}

async fn down(ctx: &CliContext, to: Option<i64>) -> Result<(), CliError> {
    let reverted = match to {
        Some(target) => ctx.pool.revert_to(&ctx.migrator, target).await?,
        None => ctx
            .pool
            .revert_last(&ctx.migrator)
            .await?
            .into_iter()
            .collect(),
    };

    if reverted.is_empty() {
        println!("Nothing to revert.");
    } else {
        print_list("Reverted", &reverted);
    }
    Ok(())
}

async fn status(ctx: &CliContext) -> Result<(), CliError> {
    let status = ctx.pool.migration_status(&ctx.migrator).await?;

    println!("{:<15} {:<8} Name", "Version", "State");
    for entry in status {
        let state = match entry.state {
            MigrationState::Applied => "applied",
            MigrationState::Pending => "pending",
        };
        println!("{:<15} {:<8} {}", entry.version, state, entry.name);
    }
    Ok(())
}

fn print_list(verb: &str, migrations: &[AppliedMigration]) {
    println!("{verb} {} migration(s):", migrations.len());
    for migration in migrations {
        println!("  {} {}", migration.version, migration.name);
    }
}
