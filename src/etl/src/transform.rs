//! Derived fields, applied once extraction is complete.

use chrono::NaiveDate;

use crate::types::{GameRecord, TeamRecord, WinLoss};

/// Date formats seen in game timestamps
const DATE_FORMATS: [&str; 2] = ["%B %d, %Y", "%b %d, %Y"];

/// Split "8:00 PM, September 7, 2024" into ("8:00 PM", "2024-09-07").
///
/// The date is empty when it cannot be parsed.
pub fn split_timestamp(raw: &str) -> (String, String) {
    let raw = raw.trim();
    let Some((time, date)) = raw.split_once(',') else {
        return (raw.to_string(), String::new());
    };

    let date = date.trim();
    let iso = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    (time.trim().to_string(), iso)
}

/// Drop a leading "Label:" or "Label " from a scraped value
pub fn strip_label(raw: &str, label: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.strip_prefix(label) {
        Some(rest) if rest.starts_with(|c: char| c == ':' || c.is_whitespace()) => {
            rest.trim_start_matches(':').trim().to_string()
        }
        _ => trimmed.to_string(),
    }
}

/// Fill game date and time and tidy scraped labels
pub fn games(games: &mut [GameRecord]) {
    for game in games.iter_mut() {
        let (time, date) = split_timestamp(&game.scheduled_time);
        game.game_time = time;
        game.game_date = date;
        game.venue_location = game.venue_location.trim().to_string();
        game.betting_line = strip_label(&game.betting_line, "Line");
        game.betting_over_under = strip_label(&game.betting_over_under, "Over/Under");
    }
}

/// Split "W-L(-T)" records into counts. Unparseable records keep their counts.
pub fn teams(teams: &mut [TeamRecord]) {
    for team in teams.iter_mut() {
        if let Some(record) = WinLoss::parse(&team.conference_record) {
            team.set_conference(record);
        }
        if let Some(record) = WinLoss::parse(&team.overall_record) {
            team.set_overall(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::League;

    #[test]
    fn test_split_timestamp() {
        assert_eq!(
            split_timestamp("8:00 PM, September 7, 2024"),
            ("8:00 PM".to_string(), "2024-09-07".to_string())
        );
        assert_eq!(
            split_timestamp("Noon, Nov 2, 2024"),
            ("Noon".to_string(), "2024-11-02".to_string())
        );
        assert_eq!(split_timestamp("TBD"), ("TBD".to_string(), String::new()));
        assert_eq!(
            split_timestamp("7:00 PM, sometime"),
            ("7:00 PM".to_string(), String::new())
        );
        assert_eq!(split_timestamp(""), (String::new(), String::new()));
    }

    #[test]
    fn test_strip_label() {
        assert_eq!(strip_label("Line: SMU -2.5", "Line"), "SMU -2.5");
        assert_eq!(strip_label("Over/Under: 54.5 ", "Over/Under"), "54.5");
        assert_eq!(strip_label("EVEN", "Line"), "EVEN");
        assert_eq!(strip_label("", "Line"), "");
        assert_eq!(strip_label("Line SMU -2.5", "Line"), "SMU -2.5");
        assert_eq!(strip_label("Lineup TBD", "Line"), "Lineup TBD");
        assert_eq!(strip_label("Line", "Line"), "Line");
    }

    #[test]
    fn test_transform_teams_splits_records() {
        let mut clemson = TeamRecord::new(League::Cfb, "228", String::new());
        clemson.conference_record = "7-1".into();
        clemson.overall_record = "10-3".into();
        let mut chiefs = TeamRecord::new(League::Nfl, "kc", String::new());
        chiefs.overall_record = "10-6-1".into();
        let mut unknown = TeamRecord::new(League::Cfb, "349", String::new());
        unknown.overall_record = "n/a".into();

        let mut all = vec![clemson, chiefs, unknown];
        teams(&mut all);

        let c = &all[0];
        assert_eq!((c.conference_wins, c.conference_losses, c.conference_ties), (7, 1, 0));
        assert_eq!((c.overall_wins, c.overall_losses, c.overall_ties), (10, 3, 0));
        let k = &all[1];
        assert_eq!((k.overall_wins, k.overall_losses, k.overall_ties), (10, 6, 1));
        assert_eq!((k.conference_wins, k.conference_losses), (0, 0));
        let u = &all[2];
        assert_eq!((u.overall_wins, u.overall_losses, u.overall_ties), (0, 0, 0));
        assert_eq!(u.overall_record, "n/a");
    }

    #[test]
    fn test_transform_games() {
        let mut game = GameRecord::new(League::Cfb, "1");
        game.scheduled_time = "7:30 PM, September 6, 2024".into();
        game.venue_location = "Dallas, TX ".into();
        game.betting_line = "Line: SMU -2.5".into();

        let mut all = vec![game];
        games(&mut all);
        assert_eq!(all[0].game_time, "7:30 PM");
        assert_eq!(all[0].game_date, "2024-09-06");
        assert_eq!(all[0].venue_location, "Dallas, TX");
        assert_eq!(all[0].betting_line, "SMU -2.5");
        assert_eq!(all[0].betting_over_under, "");
    }
}
