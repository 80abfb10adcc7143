//! Venue geocoding.
//!
//! `Geocoder` is the forward-geocoding collaborator; `LocationEnricher`
//! decides what to ask it and fills in coordinates.

pub mod client;
pub mod enricher;

pub use client::MapsCoGeocoder;
pub use enricher::LocationEnricher;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// One forward-geocode request. Empty parts are left out of the request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct GeoQuery {
    pub q: String,
    pub city: String,
    pub state: String,
}

impl GeoQuery {
    pub fn venue(venue: &str, city: &str, state: &str) -> Self {
        Self {
            q: venue.to_string(),
            city: city.to_string(),
            state: state.to_string(),
        }
    }

    pub fn place(city: &str, state: &str) -> Self {
        Self::venue("", city, state)
    }
}

/// Replacement query for venues the geocoder cannot resolve by city.
///
/// `matches` is compared case-insensitively against the location's city and
/// venue name; on a hit the query becomes `query` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeOverride {
    pub matches: String,
    pub query: String,
}

/// Forward geocoding. `Ok(None)` means the query matched nothing.
pub trait Geocoder {
    fn geocode(&self, query: &GeoQuery) -> Result<Option<Coordinates>, FetchError>;
}
