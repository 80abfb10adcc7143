//! Record types produced by an extraction run.
//!
//! Every field is populated: strings default to empty, numbers to zero.
//! Latitude and longitude are the only optional values, since a venue
//! that could not be geocoded has no meaningful zero.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::league::League;

/// Quarter-by-quarter score for one side of a game.
///
/// A game that has not been played is the all-zero score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxScore {
    pub q1: u32,
    pub q2: u32,
    pub q3: u32,
    pub q4: u32,
    pub overtime: u32,
    pub total: u32,
}

impl BoxScore {
    #[cfg(test)]
    pub fn is_zero(&self) -> bool {
        *self == BoxScore::default()
    }
}

/// One scheduled game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: String,
    pub league: League,
    pub away_team_id: String,
    pub home_team_id: String,
    pub venue_name: String,
    pub venue_location: String,
    /// Surrogate id of the game's `LocationRecord`
    pub location_id: u32,
    /// Raw "8:00 PM, September 7, 2024" text as shown on the game page
    pub scheduled_time: String,
    /// ISO date split out of `scheduled_time`
    pub game_date: String,
    pub game_time: String,
    pub away_box_score: BoxScore,
    pub home_box_score: BoxScore,
    pub tv_coverage: String,
    pub betting_line: String,
    pub betting_over_under: String,
    pub stadium_capacity: u32,
    pub attendance: u32,
    pub away_win_pct: f64,
    pub home_win_pct: f64,
    pub degraded: bool,
}

impl GameRecord {
    /// Empty record for a game id; every field at its default
    pub fn new(league: League, game_id: &str) -> Self {
        Self {
            game_id: game_id.to_string(),
            league,
            away_team_id: String::new(),
            home_team_id: String::new(),
            venue_name: String::new(),
            venue_location: String::new(),
            location_id: 0,
            scheduled_time: String::new(),
            game_date: String::new(),
            game_time: String::new(),
            away_box_score: BoxScore::default(),
            home_box_score: BoxScore::default(),
            tv_coverage: String::new(),
            betting_line: String::new(),
            betting_over_under: String::new(),
            stadium_capacity: 0,
            attendance: 0,
            away_win_pct: 0.0,
            home_win_pct: 0.0,
            degraded: false,
        }
    }

    /// Natural key of the game's venue
    pub fn location_key(&self) -> LocationKey {
        LocationKey {
            venue_name: self.venue_name.clone(),
            raw_location: self.venue_location.clone(),
        }
    }
}

/// One team, keyed by the id embedded in its page links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub team_id: String,
    pub league: League,
    pub name: String,
    pub mascot: String,
    pub logo_url: String,
    pub conference_name: String,
    pub conference_record: String,
    pub overall_record: String,
    pub conference_wins: u32,
    pub conference_losses: u32,
    pub conference_ties: u32,
    pub overall_wins: u32,
    pub overall_losses: u32,
    pub overall_ties: u32,
    pub degraded: bool,
}

impl TeamRecord {
    pub fn new(league: League, team_id: &str, logo_url: String) -> Self {
        Self {
            team_id: team_id.to_string(),
            league,
            name: String::new(),
            mascot: String::new(),
            logo_url,
            conference_name: String::new(),
            conference_record: String::new(),
            overall_record: String::new(),
            conference_wins: 0,
            conference_losses: 0,
            conference_ties: 0,
            overall_wins: 0,
            overall_losses: 0,
            overall_ties: 0,
            degraded: false,
        }
    }

    pub fn set_conference(&mut self, record: WinLoss) {
        self.conference_wins = record.wins;
        self.conference_losses = record.losses;
        self.conference_ties = record.ties;
    }

    pub fn set_overall(&mut self, record: WinLoss) {
        self.overall_wins = record.wins;
        self.overall_losses = record.losses;
        self.overall_ties = record.ties;
    }
}

/// A win-loss(-tie) record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WinLoss {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl WinLoss {
    /// Parse "10-3" or "10-6-1". Anything else is None.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.trim().split('-').map(|p| p.trim().parse::<u32>());
        let wins = parts.next()?.ok()?;
        let losses = parts.next()?.ok()?;
        let ties = match parts.next() {
            Some(ties) => ties.ok()?,
            None => 0,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self { wins, losses, ties })
    }
}

impl fmt::Display for WinLoss {
    /// "W-L", or "W-L-T" when there are ties
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ties == 0 {
            write!(f, "{}-{}", self.wins, self.losses)
        } else {
            write!(f, "{}-{}-{}", self.wins, self.losses, self.ties)
        }
    }
}

/// Compound natural key of a venue
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationKey {
    pub venue_name: String,
    pub raw_location: String,
}

/// One distinct venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// 1-based, assigned in first-seen order
    pub location_id: u32,
    pub league: League,
    pub venue_name: String,
    pub raw_location: String,
    pub city: String,
    pub state: String,
    pub stadium_capacity: u32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationRecord {
    /// Build from a game's venue fields, splitting "City, ST" into parts
    pub fn from_game(location_id: u32, game: &GameRecord) -> Self {
        let (city, state) = split_location(&game.venue_location);
        Self {
            location_id,
            league: game.league,
            venue_name: game.venue_name.clone(),
            raw_location: game.venue_location.clone(),
            city,
            state,
            stadium_capacity: game.stadium_capacity,
            latitude: None,
            longitude: None,
        }
    }

    pub fn is_geocoded(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Human-readable label for logs
    pub fn label(&self) -> String {
        match (self.venue_name.is_empty(), self.raw_location.is_empty()) {
            (false, false) => format!("{}, {}", self.venue_name, self.raw_location),
            (false, true) => self.venue_name.clone(),
            (true, false) => self.raw_location.clone(),
            (true, true) => format!("location {}", self.location_id),
        }
    }
}

/// Split "Provo, UT" into ("Provo", "UT"); missing parts are empty
pub fn split_location(raw: &str) -> (String, String) {
    let mut parts = raw.split(',').map(str::trim);
    let city = parts.next().unwrap_or_default().to_string();
    let state = parts.next().unwrap_or_default().to_string();
    (city, state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_location() {
        assert_eq!(
            split_location("Provo, UT "),
            ("Provo".to_string(), "UT".to_string())
        );
        assert_eq!(
            split_location("USAF Academy"),
            ("USAF Academy".to_string(), String::new())
        );
        assert_eq!(split_location(""), (String::new(), String::new()));
    }

    #[test]
    fn test_new_game_is_fully_defaulted() {
        let game = GameRecord::new(League::Cfb, "401520281");
        assert_eq!(game.game_id, "401520281");
        assert!(game.away_box_score.is_zero());
        assert!(game.home_box_score.is_zero());
        assert_eq!(game.location_id, 0);
        assert!(!game.degraded);
    }

    #[test]
    fn test_location_from_game() {
        let mut game = GameRecord::new(League::Cfb, "1");
        game.venue_name = "LaVell Edwards Stadium".into();
        game.venue_location = "Provo, UT".into();
        game.stadium_capacity = 63_470;

        let location = LocationRecord::from_game(4, &game);
        assert_eq!(location.location_id, 4);
        assert_eq!(location.city, "Provo");
        assert_eq!(location.state, "UT");
        assert_eq!(location.stadium_capacity, 63_470);
        assert!(!location.is_geocoded());
        assert_eq!(location.label(), "LaVell Edwards Stadium, Provo, UT");
    }

    #[test]
    fn test_parse_win_loss() {
        assert_eq!(WinLoss::parse("7-1"), Some(WinLoss { wins: 7, losses: 1, ties: 0 }));
        assert_eq!(WinLoss::parse(" 10-6-1 "), Some(WinLoss { wins: 10, losses: 6, ties: 1 }));
        assert_eq!(WinLoss::parse(""), None);
        assert_eq!(WinLoss::parse("7"), None);
        assert_eq!(WinLoss::parse("7-x"), None);
        assert_eq!(WinLoss::parse("1-2-3-4"), None);
    }

    #[test]
    fn test_win_loss_display() {
        assert_eq!(WinLoss { wins: 10, losses: 6, ties: 1 }.to_string(), "10-6-1");
        assert_eq!(WinLoss::default().to_string(), "0-0");
    }

    #[test]
    fn test_league_serializes_as_code() {
        let team = TeamRecord::new(League::Nfl, "kc", String::new());
        let json = serde_json::to_string(&team).unwrap();
        assert!(json.contains("\"league\":\"NFL\""));
    }
}
