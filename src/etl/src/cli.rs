//! CLI commands for pickem-etl.
//!
//! `extract` runs one or more leagues over a period and writes the tables;
//! `schema` creates an empty database.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::geocode::MapsCoGeocoder;
use crate::league::{LeagueSelection, Period};
use crate::output::{self, OutputFormat};
use crate::pipeline::{ExtractionRun, Pipeline};
use crate::report::{RunReport, TracingReporter};
use crate::scraper::HttpFetcher;
use crate::storage::{Repository, Table};

#[derive(Parser)]
#[command(name = "pickem-etl")]
#[command(version, about = "Pick'em ETL: schedules, teams and venues", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract games, teams and locations for one or more leagues
    Extract {
        /// Leagues to extract (cfb, nfl, mlb, nba, or all)
        #[arg(short, long, value_delimiter = ',', required = true)]
        league: Vec<LeagueSelection>,

        /// Season year (week-indexed leagues)
        #[arg(short, long)]
        year: Option<i32>,

        /// Number of weeks to walk, starting at week 1
        #[arg(short, long)]
        weeks: Option<u32>,

        /// First schedule date, YYYY-MM-DD (date-indexed leagues)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last schedule date, inclusive
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Output directory override
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// SQLite database to upsert into
        #[arg(long)]
        db: Option<PathBuf>,

        /// Output formats (csv, json)
        #[arg(short, long, value_delimiter = ',')]
        format: Vec<String>,
    },

    /// Create the database tables
    Schema {
        /// SQLite database path
        #[arg(long)]
        db: PathBuf,
    },
}

/// Run the extraction for every selected league and write the tables.
#[allow(clippy::too_many_arguments)]
pub fn run_extract(
    league: Vec<LeagueSelection>,
    year: Option<i32>,
    weeks: Option<u32>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    output_dir: Option<PathBuf>,
    db: Option<PathBuf>,
    format: Vec<String>,
) -> anyhow::Result<()> {
    let mut config = AppConfig::load()?;

    // Checked before anything is fetched
    let leagues = crate::league::expand(&league);
    let periods = Period::for_leagues(&leagues, year, weeks, start, end)?;

    if let Some(dir) = output_dir {
        config.output.dir = dir.to_string_lossy().to_string();
    }
    if let Some(path) = db {
        config.output.database = Some(path.to_string_lossy().to_string());
    }
    if !format.is_empty() {
        config.output.formats = format
            .iter()
            .map(|f| f.parse::<OutputFormat>())
            .collect::<anyhow::Result<Vec<_>>>()?;
    }
    if config.geocode.api_key.is_empty() {
        warn!("No geocode API key configured (PICKEM_GEOCODE__API_KEY)");
    }

    let fetcher = HttpFetcher::new(&config.http.user_agent, config.http.timeout())
        .context("Failed to build page client")?;
    let limiter = config.http.limiter();
    let geocoder = MapsCoGeocoder::new(
        HttpFetcher::new(&config.http.user_agent, config.http.timeout())
            .context("Failed to build geocode client")?,
        &config.geocode.base_url,
        &config.geocode.api_key,
        config.geocode.limiter(),
    );
    let reporter = TracingReporter::new();

    let pipeline = Pipeline::new(
        &fetcher,
        &limiter,
        &geocoder,
        &config.geocode.overrides,
        config.geocode.retry(),
        &reporter,
    );
    let runs: Vec<ExtractionRun> = periods
        .iter()
        .map(|(league, period)| pipeline.full_extract(*league, period))
        .collect();

    output::write_tables(
        Path::new(&config.output.dir),
        &runs,
        &config.output.formats,
    )?;

    if let Some(path) = &config.output.database {
        let mut repo = Repository::new(Path::new(path))?;
        for run in &runs {
            repo.save_run(run)?;
            for table in Table::ALL {
                let stored = repo.get_count(table, run.league)?;
                info!("{} {} rows stored: {}", run.league, table.name(), stored);
            }
        }
    }

    if runs.iter().all(|run| run.report.is_clean()) {
        info!("Run complete");
    } else {
        warn!("Run complete with problems");
    }
    let reports: BTreeMap<&str, &RunReport> = runs
        .iter()
        .map(|run| (run.league.code(), &run.report))
        .collect();
    println!("{}", serde_json::to_string_pretty(&reports)?);

    Ok(())
}

/// Create the tables in `db` if missing.
pub fn run_schema(db: PathBuf) -> anyhow::Result<()> {
    Repository::new(&db)?;
    info!("Schema ready at {}", db.display());
    Ok(())
}
