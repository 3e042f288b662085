use std::fmt::Debug;

use async_trait::async_trait;
use thiserror::Error;

use crate::{Config, model::Coordinates};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location access is restricted or denied.")]
    Denied,

    #[error("{0}")]
    Unavailable(String),
}

/// Source of the device's current position.
#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, LocationError>;
}

/// Location taken from the `[location]` table of the config file. Without one,
/// access is treated as denied.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredLocation {
    coordinates: Option<Coordinates>,
}

impl ConfiguredLocation {
    pub fn new(coordinates: Option<Coordinates>) -> Self {
        Self { coordinates }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.location)
    }
}

#[async_trait]
impl LocationSource for ConfiguredLocation {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        let coords = self.coordinates.ok_or(LocationError::Denied)?;

        if !(-90.0..=90.0).contains(&coords.latitude) || !(-180.0..=180.0).contains(&coords.longitude) {
            return Err(LocationError::Unavailable(format!(
                "Configured location ({}, {}) is out of range",
                coords.latitude, coords.longitude
            )));
        }

        Ok(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_location_is_denied() {
        let err = ConfiguredLocation::default().locate().await.unwrap_err();
        assert_eq!(err, LocationError::Denied);
        assert_eq!(err.to_string(), "Location access is restricted or denied.");
    }

    #[tokio::test]
    async fn configured_location_is_returned() {
        let mut cfg = Config::default();
        cfg.location = Some(Coordinates::new(33.749, -84.388));

        let coords = ConfiguredLocation::from_config(&cfg).locate().await.expect("configured");
        assert_eq!(coords, Coordinates::new(33.749, -84.388));
    }

    #[tokio::test]
    async fn out_of_range_location_is_unavailable() {
        let source = ConfiguredLocation::new(Some(Coordinates::new(91.0, 0.0)));
        let err = source.locate().await.unwrap_err();
        assert!(matches!(err, LocationError::Unavailable(_)));
    }
}
