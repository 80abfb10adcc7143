//! geocode.maps.co forward-geocoding client.

use reqwest::Url;
use serde::Deserialize;

use super::{Coordinates, GeoQuery, Geocoder};
use crate::error::FetchError;
use crate::scraper::fetcher::PageFetcher;
use crate::scraper::rate_limiter::RateLimiter;

pub const DEFAULT_BASE_URL: &str = "https://geocode.maps.co/search";

/// One search hit; coordinates arrive as strings
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Geocoder backed by the maps.co search API
pub struct MapsCoGeocoder<F: PageFetcher> {
    fetcher: F,
    base_url: String,
    api_key: String,
    limiter: RateLimiter,
}

impl<F: PageFetcher> MapsCoGeocoder<F> {
    pub fn new(fetcher: F, base_url: &str, api_key: &str, limiter: RateLimiter) -> Self {
        Self {
            fetcher,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            limiter,
        }
    }

    /// Request URL for a query, skipping empty parameters
    pub fn search_url(&self, query: &GeoQuery) -> Result<Url, FetchError> {
        let params = [
            ("q", query.q.as_str()),
            ("city", query.city.as_str()),
            ("state", query.state.as_str()),
            ("api_key", self.api_key.as_str()),
        ];
        Url::parse_with_params(
            &self.base_url,
            params.iter().filter(|(_, value)| !value.is_empty()),
        )
        .map_err(|e| FetchError::Transport(format!("invalid geocode url: {}", e)))
    }
}

/// First hit of a search response, if any
pub fn parse_search(body: &str) -> Result<Option<Coordinates>, FetchError> {
    let places: Vec<Place> =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    let Some(place) = places.first() else {
        return Ok(None);
    };

    let lat = place.lat.trim().parse::<f64>();
    let lon = place.lon.trim().parse::<f64>();
    match (lat, lon) {
        (Ok(lat), Ok(lon)) => Ok(Some(Coordinates { lat, lon })),
        _ => Err(FetchError::Decode(format!(
            "bad coordinates `{}`, `{}`",
            place.lat, place.lon
        ))),
    }
}

impl<F: PageFetcher> Geocoder for MapsCoGeocoder<F> {
    fn geocode(&self, query: &GeoQuery) -> Result<Option<Coordinates>, FetchError> {
        let url = self.search_url(query)?;
        self.limiter.acquire();
        let body = self.fetcher.fetch(url.as_str(), &[("Accept", "application/json")])?;
        parse_search(&body)
    }
}
