//! Schedule page walking.
//!
//! A walk fetches the period's pages one at a time and yields every schedule
//! row it finds. A page that cannot be fetched, or has no rows, is reported
//! and skipped.

use scraper::{Html, Selector};
use std::collections::VecDeque;
use tracing::{debug, info};

use super::fetcher::PageFetcher;
use super::manifest::SCHEDULE_ROWS;
use super::rate_limiter::RateLimiter;
use super::schedule_url;
use crate::league::{League, PageKey, Period};
use crate::report::{Event, Reporter};

/// One schedule row, detached from the page it came from
#[derive(Debug, Clone, PartialEq)]
pub struct RowFragment {
    pub page: PageKey,
    /// Position of the row on its page
    pub index: usize,
    pub url: String,
    /// Outer HTML of the `<tr>`
    pub html: String,
}

impl RowFragment {
    /// Parse the row back into a document.
    ///
    /// The row is wrapped in a table body since a bare `<tr>` is dropped by
    /// the HTML parser.
    pub fn document(&self) -> Html {
        Html::parse_fragment(&format!("<table><tbody>{}</tbody></table>", self.html))
    }
}

/// Fetches schedule pages for a league
pub struct ScheduleWalker<'a, F: PageFetcher> {
    fetcher: &'a F,
    limiter: &'a RateLimiter,
    reporter: &'a dyn Reporter,
}

impl<'a, F: PageFetcher> ScheduleWalker<'a, F> {
    pub fn new(fetcher: &'a F, limiter: &'a RateLimiter, reporter: &'a dyn Reporter) -> Self {
        Self {
            fetcher,
            limiter,
            reporter,
        }
    }

    /// Lazily walk every page of `period`. Each call starts from scratch.
    pub fn walk(&self, league: League, period: &Period) -> Walk<'_, 'a, F> {
        let pages = period.pages();
        info!("Walking {} {} schedule pages", pages.len(), league);
        Walk {
            walker: self,
            league,
            pages: pages.into_iter(),
            buffer: VecDeque::new(),
        }
    }

    /// Fetch one page and split it into rows
    fn load(&self, league: League, page: PageKey) -> Vec<RowFragment> {
        let url = schedule_url(league, &page);
        self.limiter.acquire();

        let body = match self.fetcher.fetch(&url, &[]) {
            Ok(body) => body,
            Err(e) => {
                self.reporter.record(Event::PageUnavailable {
                    url,
                    reason: e.to_string(),
                });
                return Vec::new();
            }
        };

        let Some(rows) = schedule_rows(&body) else {
            self.reporter.record(Event::PageUnavailable {
                url,
                reason: "no schedule rows found".to_string(),
            });
            return Vec::new();
        };

        debug!("{}: {} rows", page, rows.len());
        rows.into_iter()
            .enumerate()
            .map(|(index, html)| RowFragment {
                page,
                index,
                url: url.clone(),
                html,
            })
            .collect()
    }
}

/// Outer HTML of every schedule row, using the first selector that matches
pub fn schedule_rows(body: &str) -> Option<Vec<String>> {
    let document = Html::parse_document(body);
    for sel_str in SCHEDULE_ROWS {
        if let Ok(selector) = Selector::parse(sel_str) {
            let rows: Vec<String> = document.select(&selector).map(|row| row.html()).collect();
            if !rows.is_empty() {
                return Some(rows);
            }
        }
    }
    None
}

/// Iterator over the rows of a walk, in page order then document order
pub struct Walk<'w, 'a, F: PageFetcher> {
    walker: &'w ScheduleWalker<'a, F>,
    league: League,
    pages: std::vec::IntoIter<PageKey>,
    buffer: VecDeque<RowFragment>,
}

impl<F: PageFetcher> Iterator for Walk<'_, '_, F> {
    type Item = RowFragment;

    fn next(&mut self) -> Option<RowFragment> {
        loop {
            if let Some(row) = self.buffer.pop_front() {
                return Some(row);
            }
            let page = self.pages.next()?;
            self.buffer.extend(self.walker.load(self.league, page));
        }
    }
}
