//! CLI entry point - the composition root.
//!
//! Parses arguments, installs logging, bootstraps the database context and
//! dispatches to the handlers. Errors are printed once and mapped to an exit
//! code.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use mcpdb_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Some(command) = cli.command else {
        // No command provided - show help
        Cli::command()
            .print_help()
            .map_err(|e| CliError::General(e.to_string()))?;
        return Ok(());
    };

    match command {
        Commands::Paths => handlers::paths::execute(cli.database_url.as_deref()),
        Commands::Migrate { command } => {
            let ctx = bootstrap(&CliConfig::resolve(cli.database_url.as_deref())?).await?;
            let result = handlers::migrate::execute(&ctx, command).await;
            ctx.pool.close().await;
            result
        }
        Commands::Verify => {
            let ctx = bootstrap(&CliConfig::resolve(cli.database_url.as_deref())?).await?;
            let result = handlers::verify::execute(&ctx).await;
            ctx.pool.close().await;
            result
        }
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables before clap reads DATABASE_URL
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}
