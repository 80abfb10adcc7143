//! In-memory collaborators for tests.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::FetchError;
use crate::geocode::{Coordinates, Geocoder, GeoQuery};
use crate::scraper::fetcher::PageFetcher;

/// Serves canned pages by URL; unknown URLs are 404
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, Result<String, FetchError>>,
    requests: RefCell<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn failing(mut self, url: &str, error: FetchError) -> Self {
        self.pages.insert(url.to_string(), Err(error));
        self
    }

    /// Every URL requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl PageFetcher for StaticFetcher {
    fn fetch(&self, url: &str, _headers: &[(&str, &str)]) -> Result<String, FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }
}

/// Answers geocode queries from a table keyed by `GeoQuery::q`
#[derive(Default)]
pub struct StaticGeocoder {
    answers: HashMap<String, Vec<Result<Option<Coordinates>, FetchError>>>,
    calls: RefCell<Vec<GeoQuery>>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn found(self, q: &str, lat: f64, lon: f64) -> Self {
        self.respond(q, Ok(Some(Coordinates { lat, lon })))
    }

    /// Queue one response for `q`; the last queued response repeats
    pub fn respond(mut self, q: &str, response: Result<Option<Coordinates>, FetchError>) -> Self {
        self.answers.entry(q.to_string()).or_default().push(response);
        self
    }

    pub fn calls(&self) -> Vec<GeoQuery> {
        self.calls.borrow().clone()
    }
}

impl Geocoder for StaticGeocoder {
    fn geocode(&self, query: &GeoQuery) -> Result<Option<Coordinates>, FetchError> {
        let attempt = self
            .calls
            .borrow()
            .iter()
            .filter(|call| call.q == query.q)
            .count();
        self.calls.borrow_mut().push(query.clone());

        match self.answers.get(&query.q) {
            Some(responses) if !responses.is_empty() => {
                let index = attempt.min(responses.len() - 1);
                responses[index].clone()
            }
            _ => Ok(None),
        }
    }
}
