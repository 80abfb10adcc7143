//! Flat-file tables: CSV through polars, JSON through serde_json.
//!
//! Every table of a run is written to a temporary sibling first. Only when
//! all of them are complete are they renamed into place. A table that is
//! replaced is kept as a backup until the last rename succeeds, so a failed
//! run puts the previous tables back and deletes everything it staged.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

use crate::pipeline::ExtractionRun;
use crate::schedule::{self, ScheduleEntry};
use crate::types::{BoxScore, GameRecord, LocationRecord, TeamRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => anyhow::bail!("unknown output format `{}` (expected csv or json)", other),
        }
    }
}

fn side_scores(
    games: &[GameRecord],
    side: fn(&GameRecord) -> &BoxScore,
    part: fn(&BoxScore) -> u32,
) -> Vec<u32> {
    games.iter().map(|g| part(side(g))).collect()
}

fn away(game: &GameRecord) -> &BoxScore {
    &game.away_box_score
}

fn home(game: &GameRecord) -> &BoxScore {
    &game.home_box_score
}

/// Games as a DataFrame, one column per scalar field
pub fn games_frame(games: &[GameRecord]) -> PolarsResult<DataFrame> {
    df!(
        "league" => games.iter().map(|g| g.league.code()).collect::<Vec<_>>(),
        "game_id" => games.iter().map(|g| g.game_id.as_str()).collect::<Vec<_>>(),
        "away_team_id" => games.iter().map(|g| g.away_team_id.as_str()).collect::<Vec<_>>(),
        "home_team_id" => games.iter().map(|g| g.home_team_id.as_str()).collect::<Vec<_>>(),
        "location_id" => games.iter().map(|g| g.location_id).collect::<Vec<_>>(),
        "venue_name" => games.iter().map(|g| g.venue_name.as_str()).collect::<Vec<_>>(),
        "venue_location" => games.iter().map(|g| g.venue_location.as_str()).collect::<Vec<_>>(),
        "game_date" => games.iter().map(|g| g.game_date.as_str()).collect::<Vec<_>>(),
        "game_time" => games.iter().map(|g| g.game_time.as_str()).collect::<Vec<_>>(),
        "away_q1" => side_scores(games, away, |b| b.q1),
        "away_q2" => side_scores(games, away, |b| b.q2),
        "away_q3" => side_scores(games, away, |b| b.q3),
        "away_q4" => side_scores(games, away, |b| b.q4),
        "away_overtime" => side_scores(games, away, |b| b.overtime),
        "away_total" => side_scores(games, away, |b| b.total),
        "home_q1" => side_scores(games, home, |b| b.q1),
        "home_q2" => side_scores(games, home, |b| b.q2),
        "home_q3" => side_scores(games, home, |b| b.q3),
        "home_q4" => side_scores(games, home, |b| b.q4),
        "home_overtime" => side_scores(games, home, |b| b.overtime),
        "home_total" => side_scores(games, home, |b| b.total),
        "tv_coverage" => games.iter().map(|g| g.tv_coverage.as_str()).collect::<Vec<_>>(),
        "betting_line" => games.iter().map(|g| g.betting_line.as_str()).collect::<Vec<_>>(),
        "betting_over_under" => games.iter().map(|g| g.betting_over_under.as_str()).collect::<Vec<_>>(),
        "stadium_capacity" => games.iter().map(|g| g.stadium_capacity).collect::<Vec<_>>(),
        "attendance" => games.iter().map(|g| g.attendance).collect::<Vec<_>>(),
        "away_win_pct" => games.iter().map(|g| g.away_win_pct).collect::<Vec<_>>(),
        "home_win_pct" => games.iter().map(|g| g.home_win_pct).collect::<Vec<_>>(),
        "degraded" => games.iter().map(|g| g.degraded).collect::<Vec<_>>(),
    )
}

pub fn teams_frame(teams: &[TeamRecord]) -> PolarsResult<DataFrame> {
    df!(
        "league" => teams.iter().map(|t| t.league.code()).collect::<Vec<_>>(),
        "team_id" => teams.iter().map(|t| t.team_id.as_str()).collect::<Vec<_>>(),
        "name" => teams.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        "mascot" => teams.iter().map(|t| t.mascot.as_str()).collect::<Vec<_>>(),
        "logo_url" => teams.iter().map(|t| t.logo_url.as_str()).collect::<Vec<_>>(),
        "conference_name" => teams.iter().map(|t| t.conference_name.as_str()).collect::<Vec<_>>(),
        "conference_record" => teams.iter().map(|t| t.conference_record.as_str()).collect::<Vec<_>>(),
        "overall_record" => teams.iter().map(|t| t.overall_record.as_str()).collect::<Vec<_>>(),
        "conference_wins" => teams.iter().map(|t| t.conference_wins).collect::<Vec<_>>(),
        "conference_losses" => teams.iter().map(|t| t.conference_losses).collect::<Vec<_>>(),
        "conference_ties" => teams.iter().map(|t| t.conference_ties).collect::<Vec<_>>(),
        "overall_wins" => teams.iter().map(|t| t.overall_wins).collect::<Vec<_>>(),
        "overall_losses" => teams.iter().map(|t| t.overall_losses).collect::<Vec<_>>(),
        "overall_ties" => teams.iter().map(|t| t.overall_ties).collect::<Vec<_>>(),
        "degraded" => teams.iter().map(|t| t.degraded).collect::<Vec<_>>(),
    )
}

pub fn locations_frame(locations: &[LocationRecord]) -> PolarsResult<DataFrame> {
    df!(
        "league" => locations.iter().map(|l| l.league.code()).collect::<Vec<_>>(),
        "location_id" => locations.iter().map(|l| l.location_id).collect::<Vec<_>>(),
        "venue_name" => locations.iter().map(|l| l.venue_name.as_str()).collect::<Vec<_>>(),
        "raw_location" => locations.iter().map(|l| l.raw_location.as_str()).collect::<Vec<_>>(),
        "city" => locations.iter().map(|l| l.city.as_str()).collect::<Vec<_>>(),
        "state" => locations.iter().map(|l| l.state.as_str()).collect::<Vec<_>>(),
        "stadium_capacity" => locations.iter().map(|l| l.stadium_capacity).collect::<Vec<_>>(),
        "latitude" => locations.iter().map(|l| l.latitude).collect::<Vec<_>>(),
        "longitude" => locations.iter().map(|l| l.longitude).collect::<Vec<_>>(),
    )
}

#[derive(Clone, Copy)]
enum Side {
    Away,
    Home,
}

fn team_column<T>(
    entries: &[ScheduleEntry<'_>],
    side: Side,
    value: impl Fn(&TeamRecord) -> T,
) -> Vec<Option<T>> {
    entries
        .iter()
        .map(|e| match side {
            Side::Away => e.away_team,
            Side::Home => e.home_team,
        })
        .map(|team| team.map(&value))
        .collect()
}

fn location_column<T>(
    entries: &[ScheduleEntry<'_>],
    value: impl Fn(&LocationRecord) -> Option<T>,
) -> Vec<Option<T>> {
    entries
        .iter()
        .map(|e| e.location.and_then(&value))
        .collect()
}

/// Merged schedule with team and location attributes flattened into columns.
///
/// Joins that found nothing are null.
pub fn schedule_frame(entries: &[ScheduleEntry<'_>]) -> PolarsResult<DataFrame> {
    let game = |value: fn(&GameRecord) -> String| {
        entries.iter().map(|e| value(e.game)).collect::<Vec<_>>()
    };
    let score = |value: fn(&GameRecord) -> u32| {
        entries.iter().map(|e| value(e.game)).collect::<Vec<_>>()
    };

    df!(
        "league" => game(|g| g.league.code().to_string()),
        "game_id" => game(|g| g.game_id.clone()),
        "game_date" => game(|g| g.game_date.clone()),
        "game_time" => game(|g| g.game_time.clone()),
        "away_team_id" => game(|g| g.away_team_id.clone()),
        "away_team_name" => team_column(entries, Side::Away, |t| t.name.clone()),
        "away_team_mascot" => team_column(entries, Side::Away, |t| t.mascot.clone()),
        "away_team_logo" => team_column(entries, Side::Away, |t| t.logo_url.clone()),
        "away_team_conference" => team_column(entries, Side::Away, |t| t.conference_name.clone()),
        "away_team_conference_wins" => team_column(entries, Side::Away, |t| t.conference_wins),
        "away_team_conference_losses" => team_column(entries, Side::Away, |t| t.conference_losses),
        "away_team_conference_ties" => team_column(entries, Side::Away, |t| t.conference_ties),
        "away_team_overall_wins" => team_column(entries, Side::Away, |t| t.overall_wins),
        "away_team_overall_losses" => team_column(entries, Side::Away, |t| t.overall_losses),
        "away_team_overall_ties" => team_column(entries, Side::Away, |t| t.overall_ties),
        "home_team_id" => game(|g| g.home_team_id.clone()),
        "home_team_name" => team_column(entries, Side::Home, |t| t.name.clone()),
        "home_team_mascot" => team_column(entries, Side::Home, |t| t.mascot.clone()),
        "home_team_logo" => team_column(entries, Side::Home, |t| t.logo_url.clone()),
        "home_team_conference" => team_column(entries, Side::Home, |t| t.conference_name.clone()),
        "home_team_conference_wins" => team_column(entries, Side::Home, |t| t.conference_wins),
        "home_team_conference_losses" => team_column(entries, Side::Home, |t| t.conference_losses),
        "home_team_conference_ties" => team_column(entries, Side::Home, |t| t.conference_ties),
        "home_team_overall_wins" => team_column(entries, Side::Home, |t| t.overall_wins),
        "home_team_overall_losses" => team_column(entries, Side::Home, |t| t.overall_losses),
        "home_team_overall_ties" => team_column(entries, Side::Home, |t| t.overall_ties),
        "away_total" => score(|g| g.away_box_score.total),
        "home_total" => score(|g| g.home_box_score.total),
        "location_id" => score(|g| g.location_id),
        "venue_name" => game(|g| g.venue_name.clone()),
        "city" => location_column(entries, |l| Some(l.city.clone())),
        "state" => location_column(entries, |l| Some(l.state.clone())),
        "latitude" => location_column(entries, |l| l.latitude),
        "longitude" => location_column(entries, |l| l.longitude),
        "tv_coverage" => game(|g| g.tv_coverage.clone()),
        "betting_line" => game(|g| g.betting_line.clone()),
        "betting_over_under" => game(|g| g.betting_over_under.clone()),
    )
}

fn write_csv(file: &mut File, mut df: DataFrame) -> Result<()> {
    CsvWriter::new(file)
        .include_header(true)
        .finish(&mut df)
        .context("failed to write CSV")?;
    Ok(())
}

fn write_json<T: Serialize>(file: &mut File, records: &[T]) -> Result<()> {
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records).context("failed to write JSON")?;
    writer.flush()?;
    Ok(())
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

fn temp_path(path: &Path) -> PathBuf {
    sibling(path, ".tmp")
}

fn backup_path(path: &Path) -> PathBuf {
    sibling(path, ".bak")
}

type TableWriter<'a> = Box<dyn FnOnce(&mut File) -> Result<()> + 'a>;

/// A table moved into place, with the file it replaced
struct Promoted {
    path: PathBuf,
    backup: Option<PathBuf>,
}

/// Move `tmp` onto `path`, setting any existing table aside first
fn promote(tmp: &Path, path: &Path) -> Result<Promoted> {
    let backup = if path.is_file() {
        let backup = backup_path(path);
        fs::rename(path, &backup)
            .with_context(|| format!("failed to set aside {}", path.display()))?;
        Some(backup)
    } else {
        None
    };

    if let Err(e) = fs::rename(tmp, path) {
        if let Some(backup) = &backup {
            let _ = fs::rename(backup, path);
        }
        return Err(e).with_context(|| format!("failed to move {} into place", path.display()));
    }

    Ok(Promoted {
        path: path.to_path_buf(),
        backup,
    })
}

/// Put back what `promote` replaced, newest first
fn roll_back(promoted: &[Promoted]) {
    for table in promoted.iter().rev() {
        let restored = match &table.backup {
            Some(backup) => fs::rename(backup, &table.path),
            None => fs::remove_file(&table.path),
        };
        if let Err(e) = restored {
            warn!("Could not restore {}: {}", table.path.display(), e);
        }
    }
}

/// Stage every table, then move them all into place or none of them
fn write_all(tables: Vec<(PathBuf, TableWriter<'_>)>) -> Result<Vec<PathBuf>> {
    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(tables.len());

    for (path, write) in tables {
        let tmp = temp_path(&path);
        let result: Result<()> = (|| {
            let mut file = File::create(&tmp)
                .with_context(|| format!("failed to create {}", tmp.display()))?;
            write(&mut file)?;
            file.sync_all()?;
            Ok(())
        })();

        staged.push((tmp, path));
        if let Err(e) = result {
            for (tmp, _) in &staged {
                let _ = fs::remove_file(tmp);
            }
            return Err(e);
        }
    }

    let mut promoted: Vec<Promoted> = Vec::with_capacity(staged.len());
    for (position, (tmp, path)) in staged.iter().enumerate() {
        match promote(tmp, path) {
            Ok(table) => promoted.push(table),
            Err(e) => {
                for (tmp, _) in &staged[position..] {
                    let _ = fs::remove_file(tmp);
                }
                roll_back(&promoted);
                return Err(e);
            }
        }
    }

    for table in &promoted {
        if let Some(backup) = &table.backup {
            let _ = fs::remove_file(backup);
        }
    }
    Ok(promoted.into_iter().map(|table| table.path).collect())
}

fn push_format<'a, T: Serialize + 'a>(
    tables: &mut Vec<(PathBuf, TableWriter<'a>)>,
    path: PathBuf,
    format: OutputFormat,
    frame: impl FnOnce() -> PolarsResult<DataFrame>,
    records: &'a [T],
) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            let df = frame()?;
            tables.push((path, Box::new(move |f: &mut File| write_csv(f, df))));
        }
        OutputFormat::Json => {
            tables.push((path, Box::new(move |f: &mut File| write_json(f, records))));
        }
    }
    Ok(())
}

/// Write every run's games, teams, and locations plus the merged schedule,
/// in each requested format.
///
/// The schedule is `{league}_schedule` for a single run and `all_schedule`
/// when several leagues ran together.
pub fn write_tables(
    dir: &Path,
    runs: &[ExtractionRun],
    formats: &[OutputFormat],
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let path = |prefix: &str, table: &str, format: OutputFormat| {
        dir.join(format!("{}_{}.{}", prefix, table, format.extension()))
    };
    let entries = schedule::join(runs);
    let schedule_prefix = match runs {
        [run] => run.league.code().to_ascii_lowercase(),
        _ => "all".to_string(),
    };

    let mut tables: Vec<(PathBuf, TableWriter<'_>)> = Vec::new();
    for &format in formats {
        for run in runs {
            let prefix = run.league.code().to_ascii_lowercase();
            push_format(&mut tables, path(&prefix, "games", format), format, || games_frame(&run.games), &run.games)?;
            push_format(&mut tables, path(&prefix, "teams", format), format, || teams_frame(&run.teams), &run.teams)?;
            push_format(
                &mut tables,
                path(&prefix, "locations", format),
                format,
                || locations_frame(&run.locations),
                &run.locations,
            )?;
        }
        push_format(
            &mut tables,
            path(&schedule_prefix, "schedule", format),
            format,
            || schedule_frame(&entries),
            &entries,
        )?;
    }

    let written = write_all(tables)?;
    for path in &written {
        info!("Wrote {}", path.display());
    }
    Ok(written)
}
