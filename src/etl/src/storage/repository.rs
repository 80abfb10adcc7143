//! SQLite repository for extracted games, teams, and locations

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Transaction};
use std::path::Path;
use tracing::info;

use super::schema::create_tables;
use crate::league::League;
use crate::pipeline::ExtractionRun;
use crate::types::{GameRecord, LocationRecord, TeamRecord};

/// Row counts written by one `save_run`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub games: usize,
    pub teams: usize,
    pub locations: usize,
}

/// Repository for extraction output
pub struct Repository {
    conn: Connection,
}

impl Repository {
    /// Create a new repository, initializing the database if needed
    pub fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let conn = Connection::open(db_path).context("Failed to open database")?;
        create_tables(&conn)?;

        Ok(Self { conn })
    }

    /// Create an in-memory repository (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        create_tables(&conn)?;
        Ok(Self { conn })
    }

    /// Upsert a whole run in one transaction
    pub fn save_run(&mut self, run: &ExtractionRun) -> Result<SaveSummary> {
        let tx = self.conn.transaction()?;

        for game in &run.games {
            insert_game(&tx, game)?;
        }
        for team in &run.teams {
            insert_team(&tx, team)?;
        }
        for location in &run.locations {
            insert_location(&tx, location)?;
        }

        tx.commit().context("Failed to commit extraction run")?;

        let summary = SaveSummary {
            games: run.games.len(),
            teams: run.teams.len(),
            locations: run.locations.len(),
        };
        info!(
            "Saved {} games, {} teams, {} locations",
            summary.games, summary.teams, summary.locations
        );
        Ok(summary)
    }

    // ==================== Query Operations ====================

    /// Rows stored for a league in `table`
    pub fn get_count(&self, table: Table, league: League) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE league = ?1", table.name());
        let count = self
            .conn
            .query_row(&sql, [league.code()], |row| row.get(0))?;
        Ok(count)
    }

    /// Games of a league, ordered by date then id
    #[cfg(test)]
    pub fn get_games(&self, league: League) -> Result<Vec<GameRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT game_id, away_team_id, home_team_id, location_id, venue_name,
                   venue_location, scheduled_time, game_date, game_time,
                   away_q1, away_q2, away_q3, away_q4, away_overtime, away_total,
                   home_q1, home_q2, home_q3, home_q4, home_overtime, home_total,
                   tv_coverage, betting_line, betting_over_under, stadium_capacity,
                   attendance, away_win_pct, home_win_pct, degraded
            FROM games
            WHERE league = ?1
            ORDER BY game_date, game_id
            "#,
        )?;

        let games = stmt
            .query_map([league.code()], |row| game_from_row(league, row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(games)
    }

    #[cfg(test)]
    pub fn get_team(&self, league: League, team_id: &str) -> Result<Option<TeamRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT name, mascot, logo_url, conference_name, conference_record,
                   overall_record, conference_wins, conference_losses, conference_ties,
                   overall_wins, overall_losses, overall_ties, degraded
            FROM teams
            WHERE league = ?1 AND team_id = ?2
            "#,
        )?;

        let mut rows = stmt.query_map(params![league.code(), team_id], |row| {
            Ok(TeamRecord {
                team_id: team_id.to_string(),
                league,
                name: row.get(0)?,
                mascot: row.get(1)?,
                logo_url: row.get(2)?,
                conference_name: row.get(3)?,
                conference_record: row.get(4)?,
                overall_record: row.get(5)?,
                conference_wins: row.get(6)?,
                conference_losses: row.get(7)?,
                conference_ties: row.get(8)?,
                overall_wins: row.get(9)?,
                overall_losses: row.get(10)?,
                overall_ties: row.get(11)?,
                degraded: row.get(12)?,
            })
        })?;

        let team = rows.next().transpose()?;
        Ok(team)
    }

    #[cfg(test)]
    pub fn get_locations(&self, league: League) -> Result<Vec<LocationRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT location_id, venue_name, raw_location, city, state,
                   stadium_capacity, latitude, longitude
            FROM locations
            WHERE league = ?1
            ORDER BY location_id
            "#,
        )?;

        let locations = stmt
            .query_map([league.code()], |row| {
                Ok(LocationRecord {
                    location_id: row.get(0)?,
                    league,
                    venue_name: row.get(1)?,
                    raw_location: row.get(2)?,
                    city: row.get(3)?,
                    state: row.get(4)?,
                    stadium_capacity: row.get(5)?,
                    latitude: row.get(6)?,
                    longitude: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(locations)
    }
}

/// Tables that can be counted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Games,
    Teams,
    Locations,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Games, Table::Teams, Table::Locations];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Games => "games",
            Table::Teams => "teams",
            Table::Locations => "locations",
        }
    }
}

// ==================== Insert Operations ====================

fn insert_game(tx: &Transaction<'_>, game: &GameRecord) -> Result<()> {
    let away = &game.away_box_score;
    let home = &game.home_box_score;
    tx.execute(
        r#"
        INSERT OR REPLACE INTO games
        (league, game_id, away_team_id, home_team_id, location_id, venue_name,
         venue_location, scheduled_time, game_date, game_time,
         away_q1, away_q2, away_q3, away_q4, away_overtime, away_total,
         home_q1, home_q2, home_q3, home_q4, home_overtime, home_total,
         tv_coverage, betting_line, betting_over_under, stadium_capacity,
         attendance, away_win_pct, home_win_pct, degraded)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30)
        "#,
        params![
            game.league.code(),
            game.game_id,
            game.away_team_id,
            game.home_team_id,
            game.location_id,
            game.venue_name,
            game.venue_location,
            game.scheduled_time,
            game.game_date,
            game.game_time,
            away.q1,
            away.q2,
            away.q3,
            away.q4,
            away.overtime,
            away.total,
            home.q1,
            home.q2,
            home.q3,
            home.q4,
            home.overtime,
            home.total,
            game.tv_coverage,
            game.betting_line,
            game.betting_over_under,
            game.stadium_capacity,
            game.attendance,
            game.away_win_pct,
            game.home_win_pct,
            game.degraded,
        ],
    )
    .with_context(|| format!("Failed to save game {}", game.game_id))?;
    Ok(())
}

fn insert_team(tx: &Transaction<'_>, team: &TeamRecord) -> Result<()> {
    tx.execute(
        r#"
        INSERT OR REPLACE INTO teams
        (league, team_id, name, mascot, logo_url, conference_name,
         conference_record, overall_record, conference_wins, conference_losses,
         conference_ties, overall_wins, overall_losses, overall_ties, degraded)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        "#,
        params![
            team.league.code(),
            team.team_id,
            team.name,
            team.mascot,
            team.logo_url,
            team.conference_name,
            team.conference_record,
            team.overall_record,
            team.conference_wins,
            team.conference_losses,
            team.conference_ties,
            team.overall_wins,
            team.overall_losses,
            team.overall_ties,
            team.degraded,
        ],
    )
    .with_context(|| format!("Failed to save team {}", team.team_id))?;
    Ok(())
}

fn insert_location(tx: &Transaction<'_>, location: &LocationRecord) -> Result<()> {
    tx.execute(
        r#"
        INSERT OR REPLACE INTO locations
        (league, location_id, venue_name, raw_location, city, state,
         stadium_capacity, latitude, longitude)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            location.league.code(),
            location.location_id,
            location.venue_name,
            location.raw_location,
            location.city,
            location.state,
            location.stadium_capacity,
            location.latitude,
            location.longitude,
        ],
    )
    .with_context(|| format!("Failed to save location {}", location.location_id))?;
    Ok(())
}

#[cfg(test)]
fn box_score(row: &rusqlite::Row<'_>, first: usize) -> rusqlite::Result<crate::types::BoxScore> {
    Ok(crate::types::BoxScore {
        q1: row.get(first)?,
        q2: row.get(first + 1)?,
        q3: row.get(first + 2)?,
        q4: row.get(first + 3)?,
        overtime: row.get(first + 4)?,
        total: row.get(first + 5)?,
    })
}

#[cfg(test)]
fn game_from_row(league: League, row: &rusqlite::Row<'_>) -> rusqlite::Result<GameRecord> {
    Ok(GameRecord {
        game_id: row.get(0)?,
        league,
        away_team_id: row.get(1)?,
        home_team_id: row.get(2)?,
        location_id: row.get(3)?,
        venue_name: row.get(4)?,
        venue_location: row.get(5)?,
        scheduled_time: row.get(6)?,
        game_date: row.get(7)?,
        game_time: row.get(8)?,
        away_box_score: box_score(row, 9)?,
        home_box_score: box_score(row, 15)?,
        tv_coverage: row.get(21)?,
        betting_line: row.get(22)?,
        betting_over_under: row.get(23)?,
        stadium_capacity: row.get(24)?,
        attendance: row.get(25)?,
        away_win_pct: row.get(26)?,
        home_win_pct: row.get(27)?,
        degraded: row.get(28)?,
    })
}
