//! Per-league field manifests.
//!
//! League differences live here as data. Parsers look fields up by name, so
//! the field names below are shared across leagues.

use super::field::{convert, nth, step, Capture, Converter, FieldDefault, FieldDescriptor, Step};
use crate::league::League;

/// Ordered field list for one entity type
#[derive(Debug, Clone, Copy)]
pub struct Manifest {
    pub entity: &'static str,
    pub fields: &'static [FieldDescriptor],
}

impl Manifest {
    #[cfg(test)]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// How a league's box-score table maps onto `BoxScore`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreColumns {
    /// Quarter columns 1-4, optional overtime columns, then a total
    Quarters,
    /// Innings are not kept; only the runs total is read
    RunsOnly,
}

/// Where the box-score table sits and how to read it
#[derive(Debug, Clone, Copy)]
pub struct BoxScoreLayout {
    pub table: &'static [Step],
    pub columns: ScoreColumns,
    pub total_labels: &'static [&'static str],
}

/// Where the standings row sits on a team page
#[derive(Debug, Clone, Copy)]
pub struct StandingsLayout {
    pub section: &'static [Step],
    pub rows: &'static str,
    pub team_anchor: &'static str,
    pub bold_class: &'static str,
    pub manifest: Manifest,
}

/// Everything league-specific about parsing
#[derive(Debug, Clone, Copy)]
pub struct LeagueManifests {
    pub schedule_row: Manifest,
    pub game: Manifest,
    pub team: Manifest,
    pub box_score: BoxScoreLayout,
    pub standings: StandingsLayout,
}

pub fn for_league(league: League) -> &'static LeagueManifests {
    match league {
        League::Cfb => &CFB,
        League::Nfl => &NFL,
        League::Mlb => &MLB,
        League::Nba => &NBA,
    }
}

/// Fallback selectors for schedule row containers, most specific first
pub const SCHEDULE_ROWS: &[&str] = &[
    ".ScheduleTables .Table__TBODY tr",
    ".Table__Scroller table tbody tr",
    "table tbody tr",
];

const fn href(descriptor: FieldDescriptor, team_id: Converter) -> FieldDescriptor {
    descriptor.capture(Capture::Attr("href")).convert(team_id)
}

// Schedule row: away team, home team, result/time cell with the game link

const ROW_GAME_LINK: &[Step] = &[nth("td", 2), step("a[href]")];
const ROW_AWAY_LINK: &[Step] = &[nth("td", 0), step("a[href*='/team/']")];
const ROW_HOME_LINK: &[Step] = &[nth("td", 1), step("a[href*='/team/']")];

const fn schedule_row(team_id: Converter) -> [FieldDescriptor; 3] {
    [
        href(FieldDescriptor::text("game_id", ROW_GAME_LINK), convert::game_id).required(),
        href(FieldDescriptor::text("away_team_id", ROW_AWAY_LINK), team_id).required(),
        href(FieldDescriptor::text("home_team_id", ROW_HOME_LINK), team_id).required(),
    ]
}

static CFB_ROW_FIELDS: [FieldDescriptor; 3] = schedule_row(convert::team_id_numeric);
static PRO_ROW_FIELDS: [FieldDescriptor; 3] = schedule_row(convert::team_id_abbrev);

// Game page

const AWAY_LINK: &[Step] = &[
    step(".Gamestrip__Team--away"),
    step(".Gamestrip__TeamContainer a[href]"),
];
const HOME_LINK: &[Step] = &[
    step(".Gamestrip__Team--home"),
    step(".Gamestrip__TeamContainer a[href]"),
];
const VENUE: &[Step] = &[step("section.GameInfo"), step(".GameInfo__Location__Name")];
const LOCATION: &[Step] = &[step("section.GameInfo"), step(".Location__Text")];
const TIMESTAMP: &[Step] = &[step("section.GameInfo"), step(".GameInfo__Meta"), nth("span", 0)];
const TV: &[Step] = &[step("section.GameInfo"), step(".GameInfo__Meta"), nth("span", 1)];
const LINE: &[Step] = &[step("section.GameInfo"), step(".GameInfo__BettingItem.line")];
const OVER_UNDER: &[Step] = &[step("section.GameInfo"), step(".GameInfo__BettingItem.ou")];
const CAPACITY: &[Step] = &[step("section.GameInfo"), step(".Attendance__Capacity")];
const ATTENDANCE: &[Step] = &[step("section.GameInfo"), step(".Attendance__Numbers")];
const AWAY_PCT: &[Step] = &[step(".matchupPredictor"), step(".matchupPredictor__teamValue--b")];
const HOME_PCT: &[Step] = &[step(".matchupPredictor"), step(".matchupPredictor__teamValue--a")];

const fn game(team_id: Converter) -> [FieldDescriptor; 12] {
    [
        href(FieldDescriptor::text("away_team_id", AWAY_LINK), team_id).required(),
        href(FieldDescriptor::text("home_team_id", HOME_LINK), team_id).required(),
        FieldDescriptor::text("venue_name", VENUE),
        FieldDescriptor::text("venue_location", LOCATION),
        FieldDescriptor::text("scheduled_time", TIMESTAMP),
        FieldDescriptor::text("tv_coverage", TV),
        FieldDescriptor::text("betting_line", LINE),
        FieldDescriptor::text("betting_over_under", OVER_UNDER),
        FieldDescriptor::integer("stadium_capacity", CAPACITY),
        FieldDescriptor::integer("attendance", ATTENDANCE),
        FieldDescriptor::integer("away_win_pct", AWAY_PCT).convert(convert::percentage),
        FieldDescriptor::integer("home_win_pct", HOME_PCT).convert(convert::percentage),
    ]
}

static CFB_GAME_FIELDS: [FieldDescriptor; 12] = game(convert::team_id_numeric);
static PRO_GAME_FIELDS: [FieldDescriptor; 12] = game(convert::team_id_abbrev);

const BOX_SCORE_TABLE: &[Step] = &[
    step(".Gamestrip__Overview"),
    step(".Gamestrip__Table"),
    step("table"),
];

// Team page

const TEAM_NAME: &[Step] = &[
    step(".ClubhouseHeader__Main"),
    step("h1.ClubhouseHeader__Name"),
    nth("span.flex span", 0),
];
const TEAM_MASCOT: &[Step] = &[
    step(".ClubhouseHeader__Main"),
    step("h1.ClubhouseHeader__Name"),
    nth("span.flex span", 1),
];
const CONFERENCE: &[Step] = &[
    step("section.TeamStandings"),
    step(".Card__Header__Title__Wrapper h3"),
];

static TEAM_FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor::text("name", TEAM_NAME).required(),
    FieldDescriptor::text("mascot", TEAM_MASCOT),
    FieldDescriptor::text("conference_name", CONFERENCE),
];

// Standings row, applied to the team's own row only

const CELL_1: &[Step] = &[nth("td", 1)];
const CELL_2: &[Step] = &[nth("td", 2)];
const CELL_3: &[Step] = &[nth("td", 3)];

static CFB_STANDINGS_FIELDS: [FieldDescriptor; 2] = [
    FieldDescriptor::text("conference_record", CELL_1)
        .convert(convert::record)
        .default_to(FieldDefault::Literal("0-0")),
    FieldDescriptor::text("overall_record", CELL_2)
        .convert(convert::record)
        .default_to(FieldDefault::Literal("0-0")),
];

static PRO_STANDINGS_FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor::integer("wins", CELL_1).convert(convert::score),
    FieldDescriptor::integer("losses", CELL_2).convert(convert::score),
    FieldDescriptor::integer("ties", CELL_3).convert(convert::score),
];

const STANDINGS_SECTION: &[Step] = &[step("section.TeamStandings")];

const fn standings(fields: &'static [FieldDescriptor]) -> StandingsLayout {
    StandingsLayout {
        section: STANDINGS_SECTION,
        rows: "tbody tr",
        team_anchor: "a",
        bold_class: "fw-bold",
        manifest: Manifest { entity: "standings", fields },
    }
}

const QUARTERS: BoxScoreLayout = BoxScoreLayout {
    table: BOX_SCORE_TABLE,
    columns: ScoreColumns::Quarters,
    total_labels: &["T"],
};

static CFB: LeagueManifests = LeagueManifests {
    schedule_row: Manifest { entity: "schedule row", fields: &CFB_ROW_FIELDS },
    game: Manifest { entity: "game", fields: &CFB_GAME_FIELDS },
    team: Manifest { entity: "team", fields: &TEAM_FIELDS },
    box_score: QUARTERS,
    standings: standings(&CFB_STANDINGS_FIELDS),
};

static NFL: LeagueManifests = LeagueManifests {
    schedule_row: Manifest { entity: "schedule row", fields: &PRO_ROW_FIELDS },
    game: Manifest { entity: "game", fields: &PRO_GAME_FIELDS },
    team: Manifest { entity: "team", fields: &TEAM_FIELDS },
    box_score: QUARTERS,
    standings: standings(&PRO_STANDINGS_FIELDS),
};

static NBA: LeagueManifests = LeagueManifests {
    schedule_row: Manifest { entity: "schedule row", fields: &PRO_ROW_FIELDS },
    game: Manifest { entity: "game", fields: &PRO_GAME_FIELDS },
    team: Manifest { entity: "team", fields: &TEAM_FIELDS },
    box_score: QUARTERS,
    standings: standings(&PRO_STANDINGS_FIELDS),
};

static MLB: LeagueManifests = LeagueManifests {
    schedule_row: Manifest { entity: "schedule row", fields: &PRO_ROW_FIELDS },
    game: Manifest { entity: "game", fields: &PRO_GAME_FIELDS },
    team: Manifest { entity: "team", fields: &TEAM_FIELDS },
    box_score: BoxScoreLayout {
        table: BOX_SCORE_TABLE,
        columns: ScoreColumns::RunsOnly,
        total_labels: &["R"],
    },
    standings: standings(&PRO_STANDINGS_FIELDS),
};

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    fn all_steps(manifest: &Manifest) -> Vec<&'static str> {
        manifest
            .fields
            .iter()
            .flat_map(|f| f.path.iter().map(|s| s.selector))
            .collect()
    }

    #[test]
    fn test_every_selector_parses() {
        for league in League::ALL {
            let m = for_league(league);
            for manifest in [m.schedule_row, m.game, m.team, m.standings.manifest] {
                for selector in all_steps(&manifest) {
                    assert!(
                        Selector::parse(selector).is_ok(),
                        "{} {}: `{}`",
                        league,
                        manifest.entity,
                        selector
                    );
                }
            }
            for selector in SCHEDULE_ROWS {
                assert!(Selector::parse(selector).is_ok());
            }
        }
    }

    #[test]
    fn test_field_names_unique() {
        for league in League::ALL {
            let m = for_league(league);
            for manifest in [m.schedule_row, m.game, m.team, m.standings.manifest] {
                let mut names: Vec<_> = manifest.fields.iter().map(|f| f.name).collect();
                let total = names.len();
                names.sort();
                names.dedup();
                assert_eq!(names.len(), total, "{} {}", league, manifest.entity);
            }
        }
    }

    #[test]
    fn test_league_differences_are_data() {
        assert_eq!(for_league(League::Mlb).box_score.columns, ScoreColumns::RunsOnly);
        assert_eq!(for_league(League::Nfl).box_score.columns, ScoreColumns::Quarters);
        assert!(for_league(League::Cfb).standings.manifest.field("conference_record").is_some());
        assert!(for_league(League::Nfl).standings.manifest.field("conference_record").is_none());
        assert!(for_league(League::Cfb).game.field("away_team_id").unwrap().required);
    }
}
