use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// A geographic coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// What to look up: a city name or a coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    ByCity(String),
    ByCoordinates { latitude: f64, longitude: f64 },
}

impl WeatherQuery {
    pub fn by_city(name: impl Into<String>) -> Self {
        Self::ByCity(name.into())
    }

    pub fn by_coordinates(latitude: f64, longitude: f64) -> Self {
        Self::ByCoordinates { latitude, longitude }
    }

    /// Rejects queries that can never produce a request: a blank city name, or
    /// a coordinate that is NaN/infinite (a missing component).
    pub fn validate(&self) -> Result<(), WeatherError> {
        match self {
            Self::ByCity(name) if !name.trim().is_empty() => Ok(()),
            Self::ByCoordinates { latitude, longitude }
                if latitude.is_finite() && longitude.is_finite() =>
            {
                Ok(())
            }
            _ => Err(WeatherError::InvalidQuery),
        }
    }
}

impl std::fmt::Display for WeatherQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByCity(name) => write!(f, "city '{name}'"),
            Self::ByCoordinates { latitude, longitude } => write!(f, "({latitude}, {longitude})"),
        }
    }
}

/// Current conditions for one location, as shown on the detail screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub name: String,
    pub temperature_celsius: f64,
    pub humidity_percent: i64,
    /// `None` when the API returned no condition entry.
    pub condition_icon: Option<String>,
    pub condition_description: Option<String>,
    pub observed_at: Option<DateTime<Utc>>,
}

impl WeatherResult {
    /// Icon CDN URL for this result's condition, if it has one.
    pub fn icon_url(&self, icon_base_url: &str) -> Option<String> {
        self.condition_icon
            .as_deref()
            .map(|icon| icon_url(icon_base_url, icon))
    }

    /// Description with the first letter of every word upper-cased.
    pub fn description_capitalized(&self) -> String {
        self.condition_description
            .as_deref()
            .map(capitalize_words)
            .unwrap_or_default()
    }
}

pub fn icon_url(icon_base_url: &str, icon: &str) -> String {
    format!("{}/{icon}@2x.png", icon_base_url.trim_end_matches('/'))
}

fn capitalize_words(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// Wire shape of the current-weather endpoint.

#[derive(Debug, Deserialize)]
pub(crate) struct OwMain {
    pub(crate) temp: f64,
    pub(crate) humidity: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwCondition {
    pub(crate) icon: String,
    pub(crate) description: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwCurrentResponse {
    pub(crate) name: String,
    pub(crate) main: OwMain,
    #[serde(default)]
    pub(crate) weather: Vec<OwCondition>,
    #[serde(default)]
    pub(crate) dt: Option<i64>,
}

impl From<OwCurrentResponse> for WeatherResult {
    fn from(parsed: OwCurrentResponse) -> Self {
        let condition = parsed.weather.into_iter().next();
        let (condition_icon, condition_description) = match condition {
            Some(c) => (Some(c.icon), Some(c.description)),
            None => (None, None),
        };

        Self {
            name: parsed.name,
            temperature_celsius: parsed.main.temp,
            humidity_percent: parsed.main.humidity,
            condition_icon,
            condition_description,
            observed_at: parsed.dt.and_then(|ts| DateTime::from_timestamp(ts, 0)),
        }
    }
}
