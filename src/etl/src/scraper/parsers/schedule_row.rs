//! Schedule row parser.

use crate::league::League;
use crate::scraper::assembler::{assemble, Assembled};
use crate::scraper::manifest;
use crate::scraper::walker::RowFragment;

/// Keys read from one schedule row
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScheduleRow {
    pub game_id: String,
    pub away_team_id: String,
    pub home_team_id: String,
}

/// Parser for schedule table rows
pub struct ScheduleRowParser;

impl ScheduleRowParser {
    /// Parse a row; `None` when the row has no game id to key on
    pub fn parse(row: &RowFragment, league: League) -> Option<(ScheduleRow, Assembled)> {
        let document = row.document();
        let assembled = assemble(document.root_element(), &manifest::for_league(league).schedule_row);

        if !assembled.found("game_id") {
            return None;
        }

        let parsed = ScheduleRow {
            game_id: assembled.text("game_id"),
            away_team_id: assembled.text("away_team_id"),
            home_team_id: assembled.text("home_team_id"),
        };
        Some((parsed, assembled))
    }
}
