//! Page fetching over blocking HTTP.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

use crate::error::FetchError;

/// Source of raw page bodies
pub trait PageFetcher {
    fn fetch(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, FetchError>;
}

impl<F: PageFetcher + ?Sized> PageFetcher for &F {
    fn fetch(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, FetchError> {
        (**self).fetch(url, headers)
    }
}

/// Blocking HTTP client with a fixed user agent and timeout
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, FetchError> {
        debug!("GET {}", url);
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send()?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .text()
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticFetcher;

    #[test]
    fn test_client_builds() {
        assert!(HttpFetcher::new("pickem-etl/0.1", Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_fetch_through_reference() {
        let fetcher = StaticFetcher::new().page("https://example.test/a", "<html></html>");
        let by_ref = &fetcher;
        assert_eq!(by_ref.fetch("https://example.test/a", &[]).unwrap(), "<html></html>");
        assert_eq!(
            by_ref.fetch("https://example.test/b", &[]),
            Err(FetchError::Status(404))
        );
        assert_eq!(fetcher.requests(), vec!["https://example.test/a", "https://example.test/b"]);
    }
}
