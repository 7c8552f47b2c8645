use thiserror::Error;

use crate::constants::API_KEY_ENV;

/// Failures between accepting a tool call and holding a forecast record.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("{} environment variable is not set", API_KEY_ENV)]
    MissingApiKey,

    #[error("upstream rejected the API key (401)")]
    Unauthorized,

    #[error("no forecast for this location (404)")]
    NotFound,

    #[error("upstream rate limit exceeded (429)")]
    RateLimited,

    #[error("upstream rejected the request parameters (400)")]
    BadRequest,

    #[error("upstream request failed with status {0}")]
    Status(u16),

    #[error("upstream request timed out")]
    Timeout,

    #[error("could not connect to upstream")]
    Connect,

    #[error("unexpected {0}")]
    Unclassified(String),
}

impl ForecastError {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ForecastError::Unauthorized,
            404 => ForecastError::NotFound,
            429 => ForecastError::RateLimited,
            400 => ForecastError::BadRequest,
            other => ForecastError::Status(other),
        }
    }

    /// Short name used in logs.
    pub fn category(&self) -> &'static str {
        match self {
            ForecastError::MissingApiKey => "configuration",
            ForecastError::Unauthorized => "auth",
            ForecastError::NotFound => "not_found",
            ForecastError::RateLimited => "rate_limited",
            ForecastError::BadRequest => "bad_request",
            ForecastError::Status(_) => "status",
            ForecastError::Timeout => "timeout",
            ForecastError::Connect => "connect",
            ForecastError::Unclassified(_) => "unclassified",
        }
    }

    /// The fixed text returned to the MCP client in place of a forecast.
    pub fn user_message(&self) -> String {
        match self {
            ForecastError::MissingApiKey => {
                format!("Error: {API_KEY_ENV} environment variable is not set")
            }
            ForecastError::Unauthorized => format!(
                "Error: API key invalid or missing. Please check the {API_KEY_ENV} environment variable is set correctly."
            ),
            ForecastError::NotFound => "Error: Weather data not available for this location. The coordinates may be invalid or outside the service area.".to_string(),
            ForecastError::RateLimited => "Error: Rate limit exceeded. Please wait a few moments before making more requests.".to_string(),
            ForecastError::BadRequest => "Error: Invalid request parameters. Please check that latitude and longitude are valid decimal degrees.".to_string(),
            ForecastError::Status(status) => {
                format!("Error: API request failed with status {status}. Please try again later.")
            }
            ForecastError::Timeout => "Error: Request timed out. The Met Office API may be experiencing issues. Please try again.".to_string(),
            ForecastError::Connect => "Error: Could not connect to Met Office API. Please check your internet connection.".to_string(),
            ForecastError::Unclassified(kind) => {
                format!("Error: Unexpected error occurred: {kind}. Please try again.")
            }
        }
    }
}

impl From<reqwest::Error> for ForecastError {
    fn from(err: reqwest::Error) -> Self {
        // A connect timeout reports both; it counts as a timeout.
        if err.is_timeout() {
            ForecastError::Timeout
        } else if err.is_connect() {
            ForecastError::Connect
        } else if let Some(status) = err.status() {
            ForecastError::from_status(status.as_u16())
        } else if err.is_decode() {
            ForecastError::Unclassified("DecodeError".to_string())
        } else {
            ForecastError::Unclassified("RequestError".to_string())
        }
    }
}
