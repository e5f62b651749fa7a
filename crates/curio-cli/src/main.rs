mod history;
mod process;


use clap::{Parser, Subcommand};

use crate::process::EnrichFlags;

#[derive(Debug, Parser)]
#[command(name = "curio")]
#[command(about = "Bookmark enrichment command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Enrich specific bookmarks by id
    Process {
        /// Bookmark ids to enrich
        #[arg(required = true)]
        ids: Vec<String>,

        #[command(flatten)]
        flags: EnrichFlags,
    },
    /// Enrich every unsorted bookmark that is not yet classified
    ProcessAll {
        #[command(flatten)]
        flags: EnrichFlags,
    },
    /// Show recent enrichment runs
    History {
        /// Maximum number of runs to show
        #[arg(long, default_value = "20")]
        limit: u32,

        /// Only show runs containing at least one failed item
        #[arg(long)]
        failed_only: bool,
    },
    /// Database utilities
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

/// Sub-commands available under `db`.
#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Verify database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("no command given; try `curio --help`");
        return Ok(());
    };

    let config = curio_core::load_app_config()?;
    let pool_config = curio_db::PoolConfig::from_app_config(&config);
    let pool = curio_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Process { ids, flags } => {
            process::run_process(&pool, &config, &ids, &flags).await
        }
        Commands::ProcessAll { flags } => process::run_process_all(&pool, &config, &flags).await,
        Commands::History { limit, failed_only } => {
            history::run_history(&pool, limit, failed_only).await
        }
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            curio_db::ping(&pool).await?;
            println!("database ok");
            Ok(())
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let applied = curio_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
            Ok(())
        }
    }
}
