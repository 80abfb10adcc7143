//! Full extraction for one league and period.
//!
//! Schedule rows are walked first, then every distinct game page, then every
//! distinct team page. Locations are collected from the games and geocoded
//! last. Nothing in here fails the run: a page that cannot be fetched turns
//! into a degraded record and an event on the reporter.

use tracing::{debug, info};

use crate::geocode::{GeocodeOverride, Geocoder, LocationEnricher};
use crate::league::{League, Period};
use crate::report::{Event, Reporter, RunReport, Tally};
use crate::retry::RetryConfig;
use crate::scraper::manifest::{self, Manifest};
use crate::scraper::parsers::{GameParser, ScheduleRow, ScheduleRowParser, TeamParser};
use crate::scraper::{game_url, team_url, EntityDeduplicator, PageFetcher, RateLimiter, ScheduleWalker};
use crate::transform;
use crate::types::{GameRecord, LocationKey, LocationRecord, TeamRecord};

/// Everything one run produced
#[derive(Debug, Clone)]
pub struct ExtractionRun {
    pub league: League,
    pub games: Vec<GameRecord>,
    pub teams: Vec<TeamRecord>,
    pub locations: Vec<LocationRecord>,
    pub report: RunReport,
}

/// Collaborators for a run
pub struct Pipeline<'a, F: PageFetcher, G: Geocoder> {
    fetcher: &'a F,
    limiter: &'a RateLimiter,
    geocoder: &'a G,
    overrides: &'a [GeocodeOverride],
    retry: RetryConfig,
    reporter: &'a dyn Reporter,
}

impl<'a, F: PageFetcher, G: Geocoder> Pipeline<'a, F, G> {
    pub fn new(
        fetcher: &'a F,
        limiter: &'a RateLimiter,
        geocoder: &'a G,
        overrides: &'a [GeocodeOverride],
        retry: RetryConfig,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            fetcher,
            limiter,
            geocoder,
            overrides,
            retry,
            reporter,
        }
    }

    pub fn full_extract(&self, league: League, period: &Period) -> ExtractionRun {
        let tally = Tally::new(self.reporter);

        let rows = self.schedule_rows(league, period, &tally);
        info!("{} distinct {} games on the schedule", rows.len(), league);

        let mut games: Vec<GameRecord> = rows
            .iter()
            .map(|row| self.game(league, row, &tally))
            .collect();

        let locations = assign_locations(&mut games);
        let mut teams = self.teams(league, &games, &tally);

        let enricher =
            LocationEnricher::new(self.geocoder, self.overrides, self.retry.clone(), &tally);
        let locations = enricher.enrich(locations);

        transform::games(&mut games);
        transform::teams(&mut teams);

        let report = tally.into_report();
        info!(
            "{}: {} games, {} teams, {} locations ({} pages skipped, {} rows skipped, {} degraded)",
            league,
            games.len(),
            teams.len(),
            locations.len(),
            report.pages_skipped,
            report.rows_skipped,
            report.degraded_records
        );

        ExtractionRun {
            league,
            games,
            teams,
            locations,
            report,
        }
    }

    /// Distinct schedule rows by game id, first sighting wins
    fn schedule_rows(&self, league: League, period: &Period, reporter: &dyn Reporter) -> Vec<ScheduleRow> {
        let walker = ScheduleWalker::new(self.fetcher, self.limiter, reporter);
        let mut unique: EntityDeduplicator<String, ScheduleRow> = EntityDeduplicator::new();

        for fragment in walker.walk(league, period) {
            let Some((row, assembled)) = ScheduleRowParser::parse(&fragment, league) else {
                reporter.record(Event::RowSkipped {
                    url: fragment.url.clone(),
                    index: fragment.index,
                });
                continue;
            };

            if unique.contains(&row.game_id) {
                debug!("Game {} already seen, skipping row on {}", row.game_id, fragment.page);
                continue;
            }
            assembled.report(&row.game_id, reporter);
            unique.observe(row.game_id.clone(), |_| row);
        }

        unique.finalize()
    }

    fn game(&self, league: League, row: &ScheduleRow, reporter: &dyn Reporter) -> GameRecord {
        let url = game_url(league, &row.game_id);
        self.limiter.acquire();

        match self.fetcher.fetch(&url, &[]) {
            Ok(html) => {
                let (game, assembled) = GameParser::parse(&html, league, row);
                assembled.report(&row.game_id, reporter);
                game
            }
            Err(e) => {
                reporter.record(Event::PageUnavailable {
                    url,
                    reason: e.to_string(),
                });
                let manifests = manifest::for_league(league);
                reporter.record(Event::RecordDegraded {
                    entity: manifests.game.entity,
                    key: row.game_id.clone(),
                    fields: required_fields(&manifests.game),
                });
                GameParser::from_row(league, row)
            }
        }
    }

    /// One record per team id, in first-seen order across all games
    fn teams(&self, league: League, games: &[GameRecord], reporter: &dyn Reporter) -> Vec<TeamRecord> {
        let mut teams: EntityDeduplicator<String, TeamRecord> = EntityDeduplicator::new();

        let ids = games
            .iter()
            .flat_map(|g| [&g.away_team_id, &g.home_team_id])
            .filter(|id| !id.is_empty());

        for id in ids {
            if teams.contains(id) {
                continue;
            }
            let team = self.team(league, id, reporter);
            teams.observe(id.clone(), |_| team);
        }

        teams.finalize()
    }

    fn team(&self, league: League, team_id: &str, reporter: &dyn Reporter) -> TeamRecord {
        let url = team_url(league, team_id);
        self.limiter.acquire();

        match self.fetcher.fetch(&url, &[]) {
            Ok(html) => {
                let (team, assembled) = TeamParser::parse(&html, league, team_id);
                assembled.report(team_id, reporter);
                team
            }
            Err(e) => {
                reporter.record(Event::PageUnavailable {
                    url,
                    reason: e.to_string(),
                });
                let manifests = manifest::for_league(league);
                reporter.record(Event::RecordDegraded {
                    entity: manifests.team.entity,
                    key: team_id.to_string(),
                    fields: required_fields(&manifests.team),
                });
                TeamParser::placeholder(league, team_id)
            }
        }
    }
}

fn required_fields(manifest: &Manifest) -> Vec<&'static str> {
    manifest
        .fields
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name)
        .collect()
}

/// Deduplicate venues and point each game at its location
fn assign_locations(games: &mut [GameRecord]) -> Vec<LocationRecord> {
    let mut locations: EntityDeduplicator<LocationKey, LocationRecord> = EntityDeduplicator::new();

    for game in games.iter_mut() {
        let key = game.location_key();
        let location_id = match locations.surrogate_of(&key) {
            Some(id) => id,
            None => {
                let seen: &GameRecord = game;
                locations
                    .observe(key, |id| LocationRecord::from_game(id, seen))
                    .location_id
            }
        };
        game.location_id = location_id;
    }

    locations.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::league::PageKey;
    use crate::report::MemoryReporter;
    use crate::scraper::schedule_url;
    use crate::testing::{StaticFetcher, StaticGeocoder};

    fn schedule_page(rows: &[(&str, &str, &str)]) -> String {
        let body: String = rows
            .iter()
            .map(|(away, home, game)| {
                format!(
                    r#"<tr class="Table__TR">
<td><a href="/college-football/team/_/id/{away}/away">Away</a></td>
<td><a href="/college-football/team/_/id/{home}/home">Home</a></td>
<td><a href="/college-football/game/_/gameId/{game}/slug">Final</a></td>
</tr>"#
                )
            })
            .collect();
        format!(
            r#"<html><body><div class="ScheduleTables"><table><tbody class="Table__TBODY">{}</tbody></table></div></body></html>"#,
            body
        )
    }

    fn game_page(away: &str, home: &str, venue: &str, location: &str) -> String {
        format!(
            r#"<html><body>
<div class="Gamestrip">
  <div class="Gamestrip__Team--away"><div class="Gamestrip__TeamContainer"><a href="/college-football/team/_/id/{away}/a">A</a></div></div>
  <div class="Gamestrip__Overview"><div class="Gamestrip__Table"><table>
    <thead><tr><th></th><th>1</th><th>2</th><th>3</th><th>4</th><th>T</th></tr></thead>
    <tbody>
      <tr><td>A</td><td>0</td><td>7</td><td>7</td><td>4</td><td>18</td></tr>
      <tr><td>H</td><td>0</td><td>3</td><td>7</td><td>5</td><td>15</td></tr>
    </tbody>
  </table></div></div>
  <div class="Gamestrip__Team--home"><div class="Gamestrip__TeamContainer"><a href="/college-football/team/_/id/{home}/h">H</a></div></div>
</div>
<section class="Card GameInfo">
  <div class="GameInfo__Location__Name">{venue}</div>
  <span class="Location__Text">{location}</span>
  <div class="GameInfo__Meta"><span>7:30 PM, September 6, 2024</span><span>ESPN</span></div>
  <div class="GameInfo__BettingItem line">Line: BYU -2.5</div>
  <div class="GameInfo__BettingItem ou">Over/Under: 54.5</div>
  <div class="Attendance__Capacity">Capacity: 63,470</div>
  <div class="Attendance__Numbers">Attendance: 61,000</div>
</section>
<div class="matchupPredictor">
  <div class="matchupPredictor__teamValue--b">41.7%</div>
  <div class="matchupPredictor__teamValue--a">58.3%</div>
</div>
</body></html>"#
        )
    }

    fn team_page(name: &str, mascot: &str) -> String {
        format!(
            r#"<html><body><div class="ClubhouseHeader__Main">
<h1 class="ClubhouseHeader__Name"><span class="flex"><span>{name}</span><span>{mascot}</span></span></h1>
</div></body></html>"#
        )
    }

    fn week(week: u32) -> String {
        schedule_url(League::Cfb, &PageKey::Week { year: 2024, week })
    }

    fn two_weeks() -> Period {
        Period::Weeks { year: 2024, count: 2 }
    }

    #[test]
    fn test_team_on_two_pages_is_fetched_once() {
        let fetcher = StaticFetcher::new()
            .page(&week(1), &schedule_page(&[("228", "61", "1001")]))
            .page(&week(2), &schedule_page(&[("2", "228", "1002")]))
            .page(&game_url(League::Cfb, "1001"), &game_page("228", "61", "Mercedes-Benz Stadium", "Atlanta, GA"))
            .page(&game_url(League::Cfb, "1002"), &game_page("2", "228", "Memorial Stadium", "Clemson, SC"))
            .page(&team_url(League::Cfb, "228"), &team_page("Clemson", "Tigers"))
            .page(&team_url(League::Cfb, "61"), &team_page("Georgia", "Bulldogs"))
            .page(&team_url(League::Cfb, "2"), &team_page("Auburn", "Tigers"));
        let geocoder = StaticGeocoder::new();
        let reporter = MemoryReporter::new();
        let limiter = RateLimiter::disabled();
        let pipeline = Pipeline::new(&fetcher, &limiter, &geocoder, &[], RetryConfig::immediate(0), &reporter);

        let run = pipeline.full_extract(League::Cfb, &two_weeks());

        let ids: Vec<&str> = run.teams.iter().map(|t| t.team_id.as_str()).collect();
        assert_eq!(ids, vec!["228", "61", "2"]);
        let clemson_fetches = fetcher
            .requests()
            .iter()
            .filter(|url| **url == team_url(League::Cfb, "228"))
            .count();
        assert_eq!(clemson_fetches, 1);
        assert_eq!(run.teams[0].name, "Clemson");
    }

    #[test]
    fn test_end_to_end() {
        let fetcher = StaticFetcher::new()
            .page(
                &week(1),
                &schedule_page(&[("252", "2567", "2001"), ("349", "2006", "2002")]),
            )
            .failing(&week(2), FetchError::Status(404))
            .page(&game_url(League::Cfb, "2001"), &game_page("252", "2567", "LaVell Edwards Stadium", "Provo, UT "))
            .page(&team_url(League::Cfb, "252"), &team_page("BYU", "Cougars"))
            .page(&team_url(League::Cfb, "2567"), &team_page("SMU", "Mustangs"))
            .page(&team_url(League::Cfb, "349"), &team_page("Army", "Black Knights"));
        let geocoder = StaticGeocoder::new().found("LaVell Edwards Stadium", 40.257, -111.654);
        let reporter = MemoryReporter::new();
        let limiter = RateLimiter::disabled();
        let pipeline = Pipeline::new(&fetcher, &limiter, &geocoder, &[], RetryConfig::immediate(0), &reporter);

        let run = pipeline.full_extract(League::Cfb, &two_weeks());

        assert_eq!(run.league, League::Cfb);
        assert_eq!(run.games.len(), 2);
        let played = &run.games[0];
        assert_eq!(played.game_id, "2001");
        assert_eq!(played.away_box_score.total, 18);
        assert_eq!(played.home_box_score.q4, 5);
        assert_eq!(played.game_date, "2024-09-06");
        assert_eq!(played.game_time, "7:30 PM");
        assert_eq!(played.betting_line, "BYU -2.5");
        assert_eq!(played.stadium_capacity, 63_470);
        assert_eq!(played.location_id, 1);
        assert!(!played.degraded);

        // No game page: kept from the schedule row alone
        let missing = &run.games[1];
        assert_eq!(missing.game_id, "2002");
        assert_eq!(missing.away_team_id, "349");
        assert_eq!(missing.home_team_id, "2006");
        assert!(missing.degraded);
        assert_eq!(missing.location_id, 2);

        assert_eq!(run.locations.len(), 2);
        assert_eq!(run.locations[0].city, "Provo");
        assert_eq!(run.locations[0].state, "UT");
        assert_eq!(run.locations[0].latitude, Some(40.257));
        assert_eq!(run.locations[1].latitude, None);

        // Team 2006 has no page
        assert_eq!(run.teams.len(), 4);
        let placeholder = run.teams.iter().find(|t| t.team_id == "2006").unwrap();
        assert!(placeholder.degraded);
        assert!(placeholder.logo_url.ends_with("/ncaa/500/2006.png"));

        assert_eq!(run.report.pages_skipped, 3);
        assert_eq!(run.report.degraded_records, 2);
        assert_eq!(run.report.enrichment_failures, 1);
        assert_eq!(run.report.rows_skipped, 0);
        assert_eq!(run.report, reporter.summary());
    }

    #[test]
    fn test_team_records_are_split() {
        let clemson = r#"<html><body><div class="ClubhouseHeader__Main">
<h1 class="ClubhouseHeader__Name"><span class="flex"><span>Clemson</span><span>Tigers</span></span></h1>
</div>
<section class="Card TeamStandings">
  <div class="Card__Header__Title__Wrapper"><h3>2024 ACC Standings</h3></div>
  <table><tbody>
    <tr><td><a href="/college-football/team/_/id/228/clemson-tigers">Clemson</a></td><td>7-1</td><td>10-3</td></tr>
  </tbody></table>
</section></body></html>"#;
        let fetcher = StaticFetcher::new()
            .page(&week(1), &schedule_page(&[("228", "61", "4001")]))
            .page(&team_url(League::Cfb, "228"), clemson);
        let geocoder = StaticGeocoder::new();
        let reporter = MemoryReporter::new();
        let limiter = RateLimiter::disabled();
        let pipeline = Pipeline::new(&fetcher, &limiter, &geocoder, &[], RetryConfig::immediate(0), &reporter);

        let run = pipeline.full_extract(League::Cfb, &Period::Weeks { year: 2024, count: 1 });

        let team = &run.teams[0];
        assert_eq!(team.conference_record, "7-1");
        assert_eq!((team.conference_wins, team.conference_losses, team.conference_ties), (7, 1, 0));
        assert_eq!((team.overall_wins, team.overall_losses, team.overall_ties), (10, 3, 0));
        // the placeholder for team 61 keeps zero counts
        assert_eq!(run.teams[1].overall_wins, 0);
    }

    #[test]
    fn test_rows_without_game_id_are_skipped() {
        let page = r#"<html><body><div class="ScheduleTables"><table><tbody class="Table__TBODY">
<tr><td>TBD</td><td>TBD</td><td>Postponed</td></tr>
</tbody></table></div></body></html>"#;
        let fetcher = StaticFetcher::new().page(&week(1), page);
        let geocoder = StaticGeocoder::new();
        let reporter = MemoryReporter::new();
        let limiter = RateLimiter::disabled();
        let pipeline = Pipeline::new(&fetcher, &limiter, &geocoder, &[], RetryConfig::immediate(0), &reporter);

        let run = pipeline.full_extract(League::Cfb, &Period::Weeks { year: 2024, count: 1 });
        assert!(run.games.is_empty());
        assert!(run.teams.is_empty());
        assert_eq!(run.report.rows_skipped, 1);
    }

    #[test]
    fn test_duplicate_game_ids_collapse() {
        let fetcher = StaticFetcher::new()
            .page(&week(1), &schedule_page(&[("252", "2567", "3001")]))
            .page(&week(2), &schedule_page(&[("252", "2567", "3001")]));
        let geocoder = StaticGeocoder::new();
        let reporter = MemoryReporter::new();
        let limiter = RateLimiter::disabled();
        let pipeline = Pipeline::new(&fetcher, &limiter, &geocoder, &[], RetryConfig::immediate(0), &reporter);

        let run = pipeline.full_extract(League::Cfb, &two_weeks());
        assert_eq!(run.games.len(), 1);
        let game_fetches = fetcher
            .requests()
            .iter()
            .filter(|url| url.contains("gameId=3001"))
            .count();
        assert_eq!(game_fetches, 1);
    }

    #[test]
    fn test_assign_locations() {
        let mut a = GameRecord::new(League::Cfb, "1");
        a.venue_name = "Rose Bowl".into();
        a.venue_location = "Pasadena, CA".into();
        let mut b = a.clone();
        b.game_id = "2".into();
        let c = GameRecord::new(League::Cfb, "3");

        let mut games = vec![a, b, c];
        let locations = assign_locations(&mut games);

        assert_eq!(locations.len(), 2);
        assert_eq!(games[0].location_id, 1);
        assert_eq!(games[1].location_id, 1);
        assert_eq!(games[2].location_id, 2);
        assert_eq!(locations[1].venue_name, "");
    }
}
