use crate::{
    Config, WeatherError, WeatherQuery, WeatherResult,
    fetcher::openweather::{OpenWeatherConfig, OpenWeatherFetcher, UNITS},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Turns one query into one weather result.
///
/// Implementations must not share mutable state between calls; the app may run
/// several fetches at once.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherResult, WeatherError>;
}

/// Construct the OpenWeather fetcher from config, injecting the credential and
/// the fixed unit system.
pub fn fetcher_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherFetcher>> {
    let fetcher = OpenWeatherFetcher::new(openweather_config(config)?)?;
    Ok(Arc::new(fetcher))
}

fn openweather_config(config: &Config) -> anyhow::Result<OpenWeatherConfig> {
    Ok(OpenWeatherConfig {
        api_key: config.api_key()?.to_owned(),
        units: UNITS.to_string(),
        base_url: config.base_url.clone(),
    })
}
