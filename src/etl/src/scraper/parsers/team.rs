//! Team page parser.

use scraper::{ElementRef, Html, Selector};

use crate::league::League;
use crate::scraper::assembler::{assemble, Assembled};
use crate::scraper::field::descend;
use crate::scraper::manifest::{self, StandingsLayout};
use crate::scraper::logo_url;
use crate::types::{TeamRecord, WinLoss};

/// Parser for team clubhouse pages
pub struct TeamParser;

impl TeamParser {
    /// Parse a team page: header fields, then the team's own standings row
    pub fn parse(html: &str, league: League, team_id: &str) -> (TeamRecord, Assembled) {
        let document = Html::parse_document(html);
        let manifests = manifest::for_league(league);

        let assembled = assemble(document.root_element(), &manifests.team);
        let mut team = TeamRecord {
            name: assembled.text("name"),
            mascot: assembled.text("mascot"),
            conference_name: assembled.text("conference_name"),
            degraded: assembled.degraded,
            ..TeamRecord::new(league, team_id, logo_url(league, team_id))
        };

        let standings = &manifests.standings;
        let row = Self::find_standings_row(document.root_element(), standings, &team.name);
        let records = row.map(|row| assemble(row, &standings.manifest));

        match league {
            League::Cfb => {
                team.conference_record = records
                    .as_ref()
                    .map(|r| r.text("conference_record"))
                    .unwrap_or_else(|| "0-0".to_string());
                team.overall_record = records
                    .as_ref()
                    .map(|r| r.text("overall_record"))
                    .unwrap_or_else(|| "0-0".to_string());
            }
            _ => {
                let record = records
                    .as_ref()
                    .map(|r| WinLoss {
                        wins: r.int("wins"),
                        losses: r.int("losses"),
                        ties: r.int("ties"),
                    })
                    .unwrap_or_default();
                team.overall_record = record.to_string();
                team.set_overall(record);
            }
        }

        (team, assembled)
    }

    /// Degraded record for a team whose page could not be fetched
    pub fn placeholder(league: League, team_id: &str) -> TeamRecord {
        TeamRecord {
            degraded: true,
            ..TeamRecord::new(league, team_id, logo_url(league, team_id))
        }
    }

    /// The standings row whose team link names this team or is bolded
    fn find_standings_row<'a>(
        page: ElementRef<'a>,
        layout: &StandingsLayout,
        team_name: &str,
    ) -> Option<ElementRef<'a>> {
        let section = descend(page, layout.section)?;
        let rows = Selector::parse(layout.rows).ok()?;
        let anchor = Selector::parse(layout.team_anchor).ok()?;

        section.select(&rows).find(|row| {
            row.select(&anchor).next().is_some_and(|a| {
                let text = a.text().collect::<String>();
                (!team_name.is_empty() && text.trim() == team_name)
                    || a.value().classes().any(|c| c == layout.bold_class)
            })
        })
    }
}
