//! Game page parser.

use scraper::Html;

use super::schedule_row::ScheduleRow;
use crate::league::League;
use crate::scraper::assembler::{assemble, assemble_box_scores, Assembled};
use crate::scraper::manifest;
use crate::types::GameRecord;

/// Parser for game pages
pub struct GameParser;

impl GameParser {
    /// Parse a game page. Team refs the page lacks come from the schedule row.
    pub fn parse(html: &str, league: League, row: &ScheduleRow) -> (GameRecord, Assembled) {
        let document = Html::parse_document(html);
        let manifests = manifest::for_league(league);

        let mut assembled = assemble(document.root_element(), &manifests.game);
        assembled.fallback("away_team_id", &row.away_team_id);
        assembled.fallback("home_team_id", &row.home_team_id);

        let (away_box_score, home_box_score) =
            assemble_box_scores(document.root_element(), &manifests.box_score);

        let game = GameRecord {
            away_team_id: assembled.text("away_team_id"),
            home_team_id: assembled.text("home_team_id"),
            venue_name: assembled.text("venue_name"),
            venue_location: assembled.text("venue_location"),
            scheduled_time: assembled.text("scheduled_time"),
            away_box_score,
            home_box_score,
            tv_coverage: assembled.text("tv_coverage"),
            betting_line: assembled.text("betting_line"),
            betting_over_under: assembled.text("betting_over_under"),
            stadium_capacity: assembled.int("stadium_capacity"),
            attendance: assembled.int("attendance"),
            away_win_pct: assembled.float("away_win_pct"),
            home_win_pct: assembled.float("home_win_pct"),
            degraded: assembled.degraded,
            ..GameRecord::new(league, &row.game_id)
        };

        (game, assembled)
    }

    /// Degraded record for a game whose page could not be fetched
    pub fn from_row(league: League, row: &ScheduleRow) -> GameRecord {
        GameRecord {
            away_team_id: row.away_team_id.clone(),
            home_team_id: row.home_team_id.clone(),
            degraded: true,
            ..GameRecord::new(league, &row.game_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<div class="Gamestrip relative overflow-hidden college-football Gamestrip--xl Gamestrip--post bb">
  <div class="Gamestrip__Team--away">
    <div class="Gamestrip__TeamContainer"><div class="Gamestrip__InfoLogo">
      <a href="https://www.espn.com/college-football/team/_/id/252/byu-cougars">BYU</a>
    </div></div>
  </div>
  <div class="Gamestrip__Overview">
    <div class="Gamestrip__Table"><div class="Table__Scroller">
      <table class="Table">
        <thead class="Table__THEAD"><tr><th></th><th>1</th><th>2</th><th>3</th><th>4</th><th>T</th></tr></thead>
        <tbody class="Table__TBODY">
          <tr><td>BYU</td><td>0</td><td>7</td><td>7</td><td>4</td><td>18</td></tr>
          <tr><td>SMU</td><td>0</td><td>3</td><td>7</td><td>5</td><td>15</td></tr>
        </tbody>
      </table>
    </div></div>
  </div>
  <div class="Gamestrip__Team--home">
    <div class="Gamestrip__TeamContainer"><div class="Gamestrip__InfoLogo">
      <a href="https://www.espn.com/college-football/team/_/id/2567/smu-mustangs">SMU</a>
    </div></div>
  </div>
</div>
<div class="matchupPredictor">
  <div class="matchupPredictor__teamValue--b">41.7%</div>
  <div class="matchupPredictor__teamValue--a">58.3%</div>
</div>
<section class="Card GameInfo">
  <div class="GameInfo__Location__Name">Gerald J. Ford Stadium</div>
  <span class="Location__Text">Dallas, TX</span>
  <div class="GameInfo__Meta"><span>7:30 PM, September 6, 2024</span><span>ESPN</span></div>
  <div class="GameInfo__BettingItem line">Line: SMU -2.5</div>
  <div class="GameInfo__BettingItem ou">Over/Under: 54.5</div>
  <div class="Attendance__Capacity">Capacity: 32,000</div>
  <div class="Attendance__Numbers">Attendance: 33,416</div>
</section>
</body>
</html>"#;

    const UNPLAYED_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<div class="Gamestrip">
  <div class="Gamestrip__Team--away"><div class="Gamestrip__TeamContainer"></div></div>
  <div class="Gamestrip__Team--home"><div class="Gamestrip__TeamContainer"></div></div>
</div>
<section class="Card GameInfo">
  <div class="GameInfo__Location__Name">Falcon Stadium</div>
  <div class="GameInfo__Meta"><span>Noon, November 2, 2024</span></div>
</section>
</body>
</html>"#;

    fn row() -> ScheduleRow {
        ScheduleRow {
            game_id: "401636602".into(),
            away_team_id: "252".into(),
            home_team_id: "2567".into(),
        }
    }

    #[test]
    fn test_parse_game() {
        let (game, assembled) = GameParser::parse(SAMPLE_HTML, League::Cfb, &row());

        assert_eq!(game.game_id, "401636602");
        assert_eq!(game.away_team_id, "252");
        assert_eq!(game.home_team_id, "2567");
        assert_eq!(game.venue_name, "Gerald J. Ford Stadium");
        assert_eq!(game.venue_location, "Dallas, TX");
        assert_eq!(game.scheduled_time, "7:30 PM, September 6, 2024");
        assert_eq!(game.tv_coverage, "ESPN");
        assert_eq!(game.betting_line, "Line: SMU -2.5");
        assert_eq!(game.betting_over_under, "Over/Under: 54.5");
        assert_eq!(game.stadium_capacity, 32_000);
        assert_eq!(game.attendance, 33_416);
        assert!((game.away_win_pct - 41.7).abs() < 1e-9);
        assert!((game.home_win_pct - 58.3).abs() < 1e-9);
        assert_eq!(game.away_box_score.total, 18);
        assert_eq!(game.home_box_score.q4, 5);
        assert!(!game.degraded);
        assert!(assembled.failed.is_empty());
    }

    #[test]
    fn test_unplayed_game_uses_row_refs_and_defaults() {
        let (game, assembled) = GameParser::parse(UNPLAYED_HTML, League::Cfb, &row());

        assert_eq!(game.away_team_id, "252");
        assert_eq!(game.home_team_id, "2567");
        assert!(!game.degraded);
        assert!(game.away_box_score.is_zero());
        assert!(game.home_box_score.is_zero());
        assert_eq!(game.venue_name, "Falcon Stadium");
        assert_eq!(game.venue_location, "");
        assert_eq!(game.tv_coverage, "");
        assert_eq!(game.attendance, 0);
        assert_eq!(game.home_win_pct, 0.0);
        assert!(assembled.failed.contains(&"betting_line"));
        assert!(!assembled.failed.contains(&"away_team_id"));
    }

    #[test]
    fn test_missing_refs_everywhere_is_degraded() {
        let empty_row = ScheduleRow {
            game_id: "1".into(),
            ..Default::default()
        };
        let (game, assembled) = GameParser::parse(UNPLAYED_HTML, League::Cfb, &empty_row);
        assert!(game.degraded);
        assert_eq!(assembled.missing_required, vec!["away_team_id", "home_team_id"]);
    }

    #[test]
    fn test_from_row() {
        let game = GameParser::from_row(League::Nfl, &row());
        assert!(game.degraded);
        assert_eq!(game.away_team_id, "252");
        assert_eq!(game.venue_name, "");
        assert!(game.away_box_score.is_zero());
    }
}
