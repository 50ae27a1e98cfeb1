use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dotabowl::config::AppConfig;
use dotabowl::ingest::{ImportSummary, Importer};
use dotabowl::storage::{Store, StoreError, TableCounts};

#[derive(Parser)]
#[command(name = "dotabowl")]
#[command(about = "Incremental Dota match importer and analytics dashboard")]
#[command(version)]
struct Cli {
    /// Path to configuration file (defaults are used when it does not exist)
    #[arg(long, default_value = "./dotabowl.toml")]
    config: PathBuf,

    /// Database file path (overrides the config file)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import new or changed match files
    Import {
        /// Directory containing match files (overrides the config file)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Start the dashboard API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show row counts for every table
    Stats,

    /// Delete ALL rows from the database
    Clean {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Create the database schema
    InitDb {
        /// Delete and recreate an existing database file
        #[arg(long)]
        recreate: bool,

        /// Skip the confirmation prompt when recreating
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting dotabowl v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Import { dir } => {
            let dir = dir.unwrap_or_else(|| config.match_data_dir.clone());
            let mut store = Store::connect(&config.database_path)?;

            let summary = Importer::new(&mut store)
                .with_extension(&config.file_extension)
                .import_all(&dir)
                .with_context(|| format!("Import from {:?} failed", dir))?;

            print_summary(&summary);
            print_counts(&store.table_counts()?);
            println!("\nSafe to re-run: only new or changed files are processed.");
        }
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let store = Store::connect(&config.database_path)?;
            store.ensure_schema()?;
            let state =
                dotabowl::api::state::AppState::new(store, config.server.cors_origin.clone());
            let app = dotabowl::api::build_router(state);

            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Dashboard: http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Stats => {
            let store = Store::open_existing(&config.database_path)?;
            print_counts(&store.table_counts()?);
        }
        Commands::Clean { yes } => {
            let mut store = match Store::open_existing(&config.database_path) {
                Ok(store) => store,
                Err(StoreError::MissingDatabase(path)) => {
                    println!("Database file not found at {:?}. Nothing to clean.", path);
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };
            store.ensure_schema()?;

            if !yes && !confirm("This will DELETE ALL DATA in the database. Continue? (y/N): ")? {
                println!("Operation cancelled. Database unchanged.");
                return Ok(());
            }

            println!("Cleaning database {:?}...", config.database_path);
            let remaining = store.clear_all()?;
            println!("\nRow counts after cleaning:");
            print_counts(&remaining);
            if remaining.total() == 0 {
                println!("Database is clean and ready for fresh imports.");
            } else {
                println!("Some data may still remain.");
            }
        }
        Commands::InitDb { recreate, yes } => {
            let path = &config.database_path;
            if path.exists() && recreate {
                if !yes
                    && !confirm("Recreate the database? This will DELETE all data! (y/N): ")?
                {
                    println!("Operation cancelled. Database unchanged.");
                    return Ok(());
                }
                std::fs::remove_file(path)
                    .with_context(|| format!("Failed to remove {:?}", path))?;
                tracing::info!("Removed existing database {:?}", path);
            }

            let store = Store::connect(path)?;
            store.ensure_schema()?;
            let tables = store.table_names()?;
            println!("Database ready at {:?} with {} tables:", path, tables.len());
            for table in tables {
                println!("  - {}", table);
            }
        }
    }

    Ok(())
}

/// Ask a yes/no question on stdin. Anything but `y`/`yes` is a no.
fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(dotabowl::is_affirmative(&answer))
}

fn print_summary(summary: &ImportSummary) {
    println!("\n=== Import Summary ===");
    println!("Imported:         {}", summary.imported);
    println!("Already present:  {}", summary.already_present);
    println!("Skipped:          {}", summary.skipped);
    println!("Failed:           {}", summary.failed);
    println!("Total files:      {}", summary.found);
    if !summary.failures.is_empty() {
        println!("\nFailures (retried on the next run):");
        for failure in &summary.failures {
            println!("  - {}", failure);
        }
    }
}

fn print_counts(counts: &TableCounts) {
    println!("\n=== Database Statistics ===");
    println!("Matches:              {}", counts.matches);
    println!("Players:              {}", counts.players);
    println!("Player match records: {}", counts.player_match_stats);
    println!("Processed files:      {}", counts.processed_files);
}
