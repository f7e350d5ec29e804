//! Operator CLI for the asset brain database.
//!
//! Every command prints a single JSON document on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use asset_brain::{bootstrap, config::Config, domains::query::QueryEngine, kernel::PgRecordStore};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "asset_cli")]
#[command(about = "Asset brain maintenance and query CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run schema migrations
    Migrate,

    /// Run migrations and load the sample portfolio if the database is empty
    Seed,

    /// Answer a question the same way POST /api/query does
    Ask {
        query: String,
        /// Date to measure lease windows from (YYYY-MM-DD), defaults to today (UTC)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

#[derive(Serialize)]
struct Response {
    success: bool,
    message: String,
}

fn output<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate => cmd_migrate().await,
        Commands::Seed => cmd_seed().await,
        Commands::Ask { query, today } => cmd_ask(&query, today).await,
    }
}

async fn get_pool() -> Result<PgPool> {
    let config = Config::from_env()?;
    PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

async fn cmd_migrate() -> Result<()> {
    let pool = get_pool().await?;
    bootstrap::run_migrations(&pool).await?;
    output(&Response {
        success: true,
        message: "Migrations complete".to_string(),
    })
}

async fn cmd_seed() -> Result<()> {
    let pool = get_pool().await?;
    bootstrap::run_migrations(&pool).await?;
    let seeded = bootstrap::seed_sample_data(&pool).await?;
    let message = if seeded {
        "Sample data loaded"
    } else {
        "Properties already present, nothing seeded"
    };
    output(&Response {
        success: true,
        message: message.to_string(),
    })
}

async fn cmd_ask(query: &str, today: Option<NaiveDate>) -> Result<()> {
    let pool = get_pool().await?;
    let engine = QueryEngine::new(Arc::new(PgRecordStore::new(pool)));
    let answer = match today {
        Some(today) => engine.answer_query_on(query, today).await?,
        None => engine.answer_query(query).await?,
    };
    output(&answer)
}
