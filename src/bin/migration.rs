use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use mallboard_api as api;

#[derive(Parser)]
#[command(name = "migration", about = "Apply or inspect mallboard database migrations", version)]
struct Cli {
    #[arg(
        long,
        help = "Database URL; defaults to the configured APP__DATABASE_URL"
    )]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Apply every pending migration (default)
    Up,
    /// List migrations not yet applied
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = api::config::load_config().context("failed to load configuration")?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    let database_url = cli.database_url.unwrap_or_else(|| cfg.database_url.clone());
    info!("Connecting to database");
    let db = api::db::establish_connection(&database_url)
        .await
        .context("failed to connect to the database")?;

    match cli.command.unwrap_or(Command::Up) {
        Command::Up => {
            api::db::run_migrations(&db).await?;
            info!("Migration completed successfully");
        }
        Command::Status => {
            let pending = api::db::pending_migrations(&db).await?;
            if pending.is_empty() {
                println!("No pending migrations");
            } else {
                for name in pending {
                    println!("pending: {}", name);
                }
            }
        }
    }

    Ok(())
}
