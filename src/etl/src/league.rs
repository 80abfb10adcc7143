//! Leagues and schedule periods.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Supported leagues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum League {
    Cfb,
    Nfl,
    Mlb,
    Nba,
}

/// How a league's schedule pages are indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleIndex {
    Week,
    Date,
}

impl League {
    pub const ALL: [League; 4] = [League::Cfb, League::Nfl, League::Mlb, League::Nba];

    /// Upper-case code used in tables and file names ("CFB")
    pub fn code(&self) -> &'static str {
        match self {
            League::Cfb => "CFB",
            League::Nfl => "NFL",
            League::Mlb => "MLB",
            League::Nba => "NBA",
        }
    }

    /// Path segment on the source site
    pub fn sport_path(&self) -> &'static str {
        match self {
            League::Cfb => "college-football",
            League::Nfl => "nfl",
            League::Mlb => "mlb",
            League::Nba => "nba",
        }
    }

    /// Path segment of the logo CDN
    pub fn logo_path(&self) -> &'static str {
        match self {
            League::Cfb => "ncaa",
            League::Nfl => "nfl",
            League::Mlb => "mlb",
            League::Nba => "nba",
        }
    }

    pub fn schedule_index(&self) -> ScheduleIndex {
        match self {
            League::Cfb | League::Nfl => ScheduleIndex::Week,
            League::Mlb | League::Nba => ScheduleIndex::Date,
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for League {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cfb" | "ncaaf" | "college-football" => Ok(League::Cfb),
            "nfl" => Ok(League::Nfl),
            "mlb" => Ok(League::Mlb),
            "nba" => Ok(League::Nba),
            other => Err(ConfigError::UnknownLeague(other.to_string())),
        }
    }
}

/// One `--league` value: a single league or every league
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeagueSelection {
    All,
    One(League),
}

impl FromStr for LeagueSelection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(LeagueSelection::All);
        }
        s.parse().map(LeagueSelection::One)
    }
}

/// Distinct leagues named by `selections`, in the order first named
pub fn expand(selections: &[LeagueSelection]) -> Vec<League> {
    let mut leagues: Vec<League> = Vec::new();
    for selection in selections {
        let named: &[League] = match selection {
            LeagueSelection::All => &League::ALL,
            LeagueSelection::One(league) => std::slice::from_ref(league),
        };
        for league in named {
            if !leagues.contains(league) {
                leagues.push(*league);
            }
        }
    }
    leagues
}

/// The span of schedule pages to walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Period {
    /// Weeks `1..=count` of a season
    Weeks { year: i32, count: u32 },
    /// Every calendar day from `start` to `end` inclusive
    Dates { start: NaiveDate, end: NaiveDate },
}

/// One schedule page within a period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKey {
    Week { year: i32, week: u32 },
    Date(NaiveDate),
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageKey::Week { year, week } => write!(f, "{} week {}", year, week),
            PageKey::Date(date) => write!(f, "{}", date),
        }
    }
}

impl Period {
    /// Validate the requested span against the league's schedule layout
    pub fn for_league(
        league: League,
        year: Option<i32>,
        weeks: Option<u32>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, ConfigError> {
        match league.schedule_index() {
            ScheduleIndex::Week => {
                if start.is_some() || end.is_some() {
                    return Err(ConfigError::PeriodMismatch {
                        league: league.to_string(),
                        expected: "week",
                        given: "date range",
                    });
                }
                let (Some(year), Some(count)) = (year, weeks) else {
                    return Err(ConfigError::MissingPeriod(
                        league.to_string(),
                        "--year and --weeks",
                    ));
                };
                if count == 0 {
                    return Err(ConfigError::ZeroWeeks);
                }
                Ok(Period::Weeks { year, count })
            }
            ScheduleIndex::Date => {
                if weeks.is_some() {
                    return Err(ConfigError::PeriodMismatch {
                        league: league.to_string(),
                        expected: "date",
                        given: "week count",
                    });
                }
                let (Some(start), Some(end)) = (start, end) else {
                    return Err(ConfigError::MissingPeriod(
                        league.to_string(),
                        "--start and --end",
                    ));
                };
                if start > end {
                    return Err(ConfigError::InvertedRange {
                        start: start.to_string(),
                        end: end.to_string(),
                    });
                }
                Ok(Period::Dates { start, end })
            }
        }
    }

    /// Periods for every league of a run, all validated before any fetch.
    ///
    /// With several leagues, week-indexed ones take `year`/`weeks` and
    /// date-indexed ones take `start`/`end`; a single league must be given
    /// exactly its own kind.
    pub fn for_leagues(
        leagues: &[League],
        year: Option<i32>,
        weeks: Option<u32>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<(League, Self)>, ConfigError> {
        if let [league] = leagues {
            return Ok(vec![(*league, Self::for_league(*league, year, weeks, start, end)?)]);
        }

        leagues
            .iter()
            .map(|&league| {
                let period = match league.schedule_index() {
                    ScheduleIndex::Week => Self::for_league(league, year, weeks, None, None)?,
                    ScheduleIndex::Date => Self::for_league(league, None, None, start, end)?,
                };
                Ok((league, period))
            })
            .collect()
    }

    /// All pages of the period, in order
    pub fn pages(&self) -> Vec<PageKey> {
        match *self {
            Period::Weeks { year, count } => (1..=count)
                .map(|week| PageKey::Week { year, week })
                .collect(),
            Period::Dates { start, end } => {
                let mut pages = Vec::new();
                let mut day = start;
                while day <= end {
                    pages.push(PageKey::Date(day));
                    day += Duration::days(1);
                }
                pages
            }
        }
    }
}
