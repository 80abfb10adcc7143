//! Web scraper module for ESPN schedule, game, and team pages
//!
//! Provides page fetching, schedule walking, and manifest-driven parsing.

pub mod assembler;
pub mod dedup;
pub mod fetcher;
pub mod field;
pub mod manifest;
pub mod parsers;
pub mod rate_limiter;
pub mod walker;

pub use dedup::EntityDeduplicator;
pub use fetcher::{HttpFetcher, PageFetcher};
pub use rate_limiter::RateLimiter;
pub use walker::ScheduleWalker;

use crate::league::{League, PageKey};

/// Base URLs
pub const BASE_URL: &str = "https://www.espn.com";
pub const LOGO_URL: &str = "https://a.espncdn.com/combiner/i?img=/i/teamlogos";

/// Build schedule page URL
pub fn schedule_url(league: League, page: &PageKey) -> String {
    match page {
        PageKey::Week { year, week } => format!(
            "{}/{}/schedule/_/week/{}/year/{}/",
            BASE_URL,
            league.sport_path(),
            week,
            year
        ),
        PageKey::Date(date) => format!(
            "{}/{}/schedule/_/date/{}",
            BASE_URL,
            league.sport_path(),
            date.format("%Y%m%d")
        ),
    }
}

/// Build game page URL
pub fn game_url(league: League, game_id: &str) -> String {
    format!("{}/{}/game?gameId={}", BASE_URL, league.sport_path(), game_id)
}

/// Build team page URL
pub fn team_url(league: League, team_id: &str) -> String {
    match league {
        League::Cfb => format!("{}/college-football/team/_/id/{}", BASE_URL, team_id),
        _ => format!("{}/{}/team/_/name/{}", BASE_URL, league.sport_path(), team_id),
    }
}

/// Build team logo URL
pub fn logo_url(league: League, team_id: &str) -> String {
    format!("{}/{}/500/{}.png", LOGO_URL, league.logo_path(), team_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_schedule_urls() {
        assert_eq!(
            schedule_url(League::Cfb, &PageKey::Week { year: 2024, week: 3 }),
            "https://www.espn.com/college-football/schedule/_/week/3/year/2024/"
        );
        let day = NaiveDate::from_ymd_opt(2024, 8, 5).unwrap();
        assert_eq!(
            schedule_url(League::Mlb, &PageKey::Date(day)),
            "https://www.espn.com/mlb/schedule/_/date/20240805"
        );
    }

    #[test]
    fn test_entity_urls() {
        assert_eq!(
            game_url(League::Nfl, "401671789"),
            "https://www.espn.com/nfl/game?gameId=401671789"
        );
        assert_eq!(
            team_url(League::Cfb, "228"),
            "https://www.espn.com/college-football/team/_/id/228"
        );
        assert_eq!(team_url(League::Nba, "bos"), "https://www.espn.com/nba/team/_/name/bos");
        assert_eq!(
            logo_url(League::Cfb, "228"),
            "https://a.espncdn.com/combiner/i?img=/i/teamlogos/ncaa/500/228.png"
        );
    }
}
