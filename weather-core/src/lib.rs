//! Core library for the `weather` app.
//!
//! This crate defines:
//! - The weather-fetch pipeline (query → request → typed result or error)
//! - View-models that own one fetch each and publish its outcome
//! - The navigation coordinator switching between search and detail screens
//! - The in-memory icon cache and the icon loader on top of it
//! - Configuration, the last-searched-city store and the location source
//!
//! It is used by `weather-cli`, which renders the screens in a terminal.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod icon;
pub mod image_cache;
pub mod last_city;
pub mod location;
pub mod model;
pub mod navigation;
pub mod view_model;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{IconError, WeatherError};
pub use fetcher::{WeatherFetcher, fetcher_from_config, openweather::OpenWeatherFetcher};
pub use icon::IconLoader;
pub use image_cache::ImageCache;
pub use last_city::LastCityStore;
pub use location::{ConfiguredLocation, LocationError, LocationSource};
pub use model::{Coordinates, WeatherQuery, WeatherResult};
pub use navigation::{NavigationCoordinator, Screen};
pub use view_model::{FetchState, WeatherViewModel};
