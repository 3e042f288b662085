use thiserror::Error;

/// Why a weather fetch failed. Terminal: a failed fetch is never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// The query was blank or incomplete; no request was attempted.
    #[error("Please enter a valid city name.")]
    InvalidQuery,

    /// The query could not be turned into a request URL.
    #[error("The URL provided is invalid: {0}")]
    InvalidUrl(String),

    /// Transport-level failure; carries the transport's own message.
    #[error("{0}")]
    Network(String),

    /// The response body did not have the expected shape.
    #[error("Failed to decode weather data: {0}")]
    Decoding(String),

    #[error("An unknown error occurred.")]
    Unknown,
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key.
        let err = err.without_url();
        if err.is_builder() {
            WeatherError::InvalidUrl(err.to_string())
        } else if err.is_decode() {
            WeatherError::Decoding(err.to_string())
        } else if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
            WeatherError::Network(err.to_string())
        } else {
            WeatherError::Unknown
        }
    }
}

/// Why an icon download failed. Nothing is cached on failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IconError {
    #[error("Icon request failed: {0}")]
    Request(String),

    #[error("Icon request returned HTTP {0}")]
    Status(u16),

    #[error("Icon response is not an image (content type: {0})")]
    NotAnImage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_error_surfaces_transport_message() {
        let err = WeatherError::Network("Failed to fetch weather".into());
        assert_eq!(err.to_string(), "Failed to fetch weather");
    }

    #[test]
    fn invalid_query_has_user_facing_message() {
        assert_eq!(WeatherError::InvalidQuery.to_string(), "Please enter a valid city name.");
    }
}
