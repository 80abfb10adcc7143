//! Latitude and longitude for deduplicated locations.

use std::collections::HashMap;
use tracing::{debug, info};

use super::{Coordinates, GeoQuery, GeocodeOverride, Geocoder};
use crate::error::FetchError;
use crate::report::{Event, Reporter};
use crate::retry::{retry_when, RetryConfig};
use crate::types::LocationRecord;

/// Outcome of one distinct query, shared by every location that asks it
type Lookup = Result<Option<Coordinates>, String>;

pub struct LocationEnricher<'a, G: Geocoder> {
    geocoder: &'a G,
    overrides: &'a [GeocodeOverride],
    retry: RetryConfig,
    reporter: &'a dyn Reporter,
}

impl<'a, G: Geocoder> LocationEnricher<'a, G> {
    pub fn new(
        geocoder: &'a G,
        overrides: &'a [GeocodeOverride],
        retry: RetryConfig,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            geocoder,
            overrides,
            retry,
            reporter,
        }
    }

    /// Query for a location, most specific tier first
    pub fn query_for(&self, location: &LocationRecord) -> Option<GeoQuery> {
        let replaced = self.overrides.iter().find(|o| {
            o.matches.eq_ignore_ascii_case(location.city.trim())
                || o.matches.eq_ignore_ascii_case(location.venue_name.trim())
        });
        if let Some(o) = replaced {
            return Some(GeoQuery::venue(&o.query, "", ""));
        }

        if !location.venue_name.is_empty() {
            return Some(GeoQuery::venue(&location.venue_name, &location.city, &location.state));
        }
        if !location.city.is_empty() || !location.state.is_empty() {
            return Some(GeoQuery::place(&location.city, &location.state));
        }
        None
    }

    /// Fill coordinates where possible. Failures leave them unset.
    pub fn enrich(&self, mut locations: Vec<LocationRecord>) -> Vec<LocationRecord> {
        let mut lookups: HashMap<GeoQuery, Lookup> = HashMap::new();

        for location in &mut locations {
            let Some(query) = self.query_for(location) else {
                self.reporter.record(Event::EnrichmentFailure {
                    location: location.label(),
                    reason: "no venue name or city/state to query".to_string(),
                });
                continue;
            };

            let lookup = lookups
                .entry(query)
                .or_insert_with_key(|query| self.lookup(query))
                .clone();

            match lookup {
                Ok(Some(coords)) => {
                    debug!("{} -> {}, {}", location.label(), coords.lat, coords.lon);
                    location.latitude = Some(coords.lat);
                    location.longitude = Some(coords.lon);
                }
                Ok(None) => self.reporter.record(Event::EnrichmentFailure {
                    location: location.label(),
                    reason: "no match".to_string(),
                }),
                Err(reason) => self.reporter.record(Event::EnrichmentFailure {
                    location: location.label(),
                    reason,
                }),
            }
        }

        let geocoded = locations.iter().filter(|l| l.is_geocoded()).count();
        info!(
            "Geocoded {}/{} locations with {} lookups",
            geocoded,
            locations.len(),
            lookups.len()
        );
        locations
    }

    fn lookup(&self, query: &GeoQuery) -> Lookup {
        retry_when(&self.retry, "geocode", FetchError::is_retryable, || {
            self.geocoder.geocode(query)
        })
        .map_err(|e| e.to_string())
    }
}
