use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, instrument, warn};

use crate::{
    WeatherError,
    model::{OwCurrentResponse, WeatherQuery, WeatherResult},
};

use super::WeatherFetcher;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
/// `WeatherResult` stores Celsius, so the unit system is not configurable.
pub const UNITS: &str = "metric";

/// Everything the fetcher needs besides the query itself.
#[derive(Debug, Clone)]
pub struct OpenWeatherConfig {
    pub api_key: String,
    pub units: String,
    pub base_url: String,
}

impl OpenWeatherConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            units: UNITS.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Fetches current conditions from the OpenWeatherMap `weather` endpoint.
///
/// Every call issues exactly one GET; nothing is cached or retried.
#[derive(Debug, Clone)]
pub struct OpenWeatherFetcher {
    config: OpenWeatherConfig,
    http: Client,
}

impl OpenWeatherFetcher {
    pub fn new(config: OpenWeatherConfig) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self { config, http })
    }

    /// Build the request URL for `query`. Fails without touching the network.
    pub fn request_url(&self, query: &WeatherQuery) -> Result<Url, WeatherError> {
        let endpoint = format!("{}/weather", self.config.base_url.trim_end_matches('/'));
        let mut url = Url::parse(&endpoint)
            .map_err(|e| WeatherError::InvalidUrl(format!("{endpoint}: {e}")))?;

        if url.cannot_be_a_base() {
            return Err(WeatherError::InvalidUrl(endpoint));
        }

        {
            let mut pairs = url.query_pairs_mut();
            match query {
                WeatherQuery::ByCity(name) => {
                    pairs.append_pair("q", name);
                }
                WeatherQuery::ByCoordinates { latitude, longitude } => {
                    pairs
                        .append_pair("lat", &latitude.to_string())
                        .append_pair("lon", &longitude.to_string());
                }
            }
            pairs
                .append_pair("appid", &self.config.api_key)
                .append_pair("units", &self.config.units);
        }

        Ok(url)
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherFetcher {
    #[instrument(skip(self), fields(query = %query))]
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherResult, WeatherError> {
        let url = self.request_url(query)?;
        debug!(endpoint = %url.path(), "Fetching current weather");

        let res = self.http.get(url).send().await.map_err(|e| {
            let err = WeatherError::from(e);
            warn!(error = %err, "OpenWeather request failed");
            err
        })?;

        let status = res.status();
        let body = res.text().await.map_err(WeatherError::from)?;

        let parsed: OwCurrentResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(%status, error = %e, "Failed to parse OpenWeather response");
            if status.is_success() {
                WeatherError::Decoding(e.to_string())
            } else {
                WeatherError::Decoding(format!("HTTP {status}: {}", truncate_body(&body)))
            }
        })?;

        Ok(parsed.into())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(base_url: &str) -> OpenWeatherFetcher {
        OpenWeatherFetcher::new(OpenWeatherConfig {
            base_url: base_url.to_string(),
            ..OpenWeatherConfig::new("KEY")
        })
        .expect("client builds")
    }

    fn query_value(url: &Url, key: &str) -> Option<String> {
        url.query_pairs().find(|(k, _)| k == key).map(|(_, v)| v.into_owned())
    }

    #[test]
    fn city_query_is_url_encoded() {
        let url = fetcher(DEFAULT_BASE_URL)
            .request_url(&WeatherQuery::by_city("São Paulo & Co"))
            .expect("valid url");

        assert_eq!(url.path(), "/data/2.5/weather");
        assert_eq!(query_value(&url, "q").as_deref(), Some("São Paulo & Co"));
        assert!(!url.as_str().contains(' '));
        assert_eq!(query_value(&url, "appid").as_deref(), Some("KEY"));
        assert_eq!(query_value(&url, "units").as_deref(), Some("metric"));
    }

    #[test]
    fn coordinate_query_uses_decimal_degrees() {
        let url = fetcher(DEFAULT_BASE_URL)
            .request_url(&WeatherQuery::by_coordinates(33.749, -84.388))
            .expect("valid url");

        assert_eq!(query_value(&url, "lat").as_deref(), Some("33.749"));
        assert_eq!(query_value(&url, "lon").as_deref(), Some("-84.388"));
        assert_eq!(query_value(&url, "q"), None);
    }

    #[test]
    fn malformed_base_url_is_invalid_url() {
        let err = fetcher("not a url")
            .request_url(&WeatherQuery::by_city("Atlanta"))
            .unwrap_err();
        assert!(matches!(err, WeatherError::InvalidUrl(_)));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
