//! SQLite schema for extracted schedule data
//!
//! Tables:
//! - games: One row per game, box scores flattened into columns
//! - teams: One row per team
//! - locations: One row per distinct venue, with coordinates when known
//!
//! Every table is keyed by league plus the record's natural or surrogate id,
//! so re-running an extraction replaces rows rather than duplicating them.

use rusqlite::{Connection, Result};

/// Create all tables in the database
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS games (
            league TEXT NOT NULL,
            game_id TEXT NOT NULL,
            away_team_id TEXT NOT NULL,
            home_team_id TEXT NOT NULL,
            location_id INTEGER NOT NULL,
            venue_name TEXT NOT NULL,
            venue_location TEXT NOT NULL,
            scheduled_time TEXT NOT NULL,
            game_date TEXT NOT NULL,
            game_time TEXT NOT NULL,
            away_q1 INTEGER NOT NULL,
            away_q2 INTEGER NOT NULL,
            away_q3 INTEGER NOT NULL,
            away_q4 INTEGER NOT NULL,
            away_overtime INTEGER NOT NULL,
            away_total INTEGER NOT NULL,
            home_q1 INTEGER NOT NULL,
            home_q2 INTEGER NOT NULL,
            home_q3 INTEGER NOT NULL,
            home_q4 INTEGER NOT NULL,
            home_overtime INTEGER NOT NULL,
            home_total INTEGER NOT NULL,
            tv_coverage TEXT NOT NULL,
            betting_line TEXT NOT NULL,
            betting_over_under TEXT NOT NULL,
            stadium_capacity INTEGER NOT NULL,
            attendance INTEGER NOT NULL,
            away_win_pct REAL NOT NULL,
            home_win_pct REAL NOT NULL,
            degraded INTEGER NOT NULL,
            updated_at TEXT DEFAULT (datetime('now')),
            PRIMARY KEY (league, game_id)
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS teams (
            league TEXT NOT NULL,
            team_id TEXT NOT NULL,
            name TEXT NOT NULL,
            mascot TEXT NOT NULL,
            logo_url TEXT NOT NULL,
            conference_name TEXT NOT NULL,
            conference_record TEXT NOT NULL,
            overall_record TEXT NOT NULL,
            conference_wins INTEGER NOT NULL,
            conference_losses INTEGER NOT NULL,
            conference_ties INTEGER NOT NULL,
            overall_wins INTEGER NOT NULL,
            overall_losses INTEGER NOT NULL,
            overall_ties INTEGER NOT NULL,
            degraded INTEGER NOT NULL,
            updated_at TEXT DEFAULT (datetime('now')),
            PRIMARY KEY (league, team_id)
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS locations (
            league TEXT NOT NULL,
            location_id INTEGER NOT NULL,
            venue_name TEXT NOT NULL,
            raw_location TEXT NOT NULL,
            city TEXT NOT NULL,
            state TEXT NOT NULL,
            stadium_capacity INTEGER NOT NULL,
            latitude REAL,
            longitude REAL,
            updated_at TEXT DEFAULT (datetime('now')),
            PRIMARY KEY (league, location_id)
        )
        "#,
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_games_date ON games(league, game_date)",
        [],
    )?;

    Ok(())
}
