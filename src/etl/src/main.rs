//! Pick'em ETL
//!
//! Scrapes league schedules, game pages and team pages into flat tables
//! and an optional SQLite database.

mod cli;
mod config;
mod error;
mod geocode;
mod league;
mod output;
mod pipeline;
mod report;
mod retry;
mod schedule;
mod scraper;
mod storage;
#[cfg(test)]
mod testing;
mod transform;
mod types;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pickem_etl=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Extract {
            league,
            year,
            weeks,
            start,
            end,
            output,
            db,
            format,
        } => cli::run_extract(league, year, weeks, start, end, output, db, format),
        Commands::Schema { db } => cli::run_schema(db),
    }
}
