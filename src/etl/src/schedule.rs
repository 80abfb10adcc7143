//! Merged schedule: every game with its teams and venue attached.

use serde::Serialize;
use std::collections::HashMap;

use crate::league::League;
use crate::pipeline::ExtractionRun;
use crate::types::{GameRecord, LocationRecord, TeamRecord};

/// One game joined with both teams and its location.
///
/// A side whose team or location was not extracted is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleEntry<'a> {
    #[serde(flatten)]
    pub game: &'a GameRecord,
    pub away_team: Option<&'a TeamRecord>,
    pub home_team: Option<&'a TeamRecord>,
    pub location: Option<&'a LocationRecord>,
}

/// Left-join games on `(league, team_id)` and `(league, location_id)`
pub fn join(runs: &[ExtractionRun]) -> Vec<ScheduleEntry<'_>> {
    let teams: HashMap<(League, &str), &TeamRecord> = runs
        .iter()
        .flat_map(|run| &run.teams)
        .map(|team| ((team.league, team.team_id.as_str()), team))
        .collect();
    let locations: HashMap<(League, u32), &LocationRecord> = runs
        .iter()
        .flat_map(|run| &run.locations)
        .map(|location| ((location.league, location.location_id), location))
        .collect();

    runs.iter()
        .flat_map(|run| &run.games)
        .map(|game| ScheduleEntry {
            game,
            away_team: teams.get(&(game.league, game.away_team_id.as_str())).copied(),
            home_team: teams.get(&(game.league, game.home_team_id.as_str())).copied(),
            location: locations.get(&(game.league, game.location_id)).copied(),
        })
        .collect()
}
