//! Commerce Service - maintenance CLI for the commerce resource repositories.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commerce_service_lib::MigrateAction;

#[derive(Parser)]
#[command(name = "commerce-service")]
#[command(about = "Commerce resource repositories: migrations, jobs and upkeep")]
struct Cli {
    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database migration commands
    Migrate {
        #[command(subcommand)]
        action: MigrateCommands,
    },
    /// Background job commands
    Jobs {
        #[command(subcommand)]
        action: JobsCommands,
    },
    /// Shortcode maintenance
    Shortcodes {
        #[command(subcommand)]
        action: ShortcodeCommands,
    },
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[derive(Subcommand)]
enum JobsCommands {
    /// Start the SMS worker
    Work,
}

#[derive(Subcommand)]
enum ShortcodeCommands {
    /// Release reservations held by expired shortcodes
    PurgeExpired,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Migrate { action } => {
            let migrate_action = match action {
                MigrateCommands::Up => MigrateAction::Up,
                MigrateCommands::Down => MigrateAction::Down,
                MigrateCommands::Status => MigrateAction::Status,
                MigrateCommands::Fresh => MigrateAction::Fresh,
            };
            commerce_service_lib::run_migrations(migrate_action).await?;
        }
        Commands::Jobs {
            action: JobsCommands::Work,
        } => {
            commerce_service_lib::run_sms_worker().await?;
        }
        Commands::Shortcodes {
            action: ShortcodeCommands::PurgeExpired,
        } => {
            commerce_service_lib::purge_expired_shortcodes().await?;
        }
    }

    Ok(())
}
