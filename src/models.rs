use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ============================================================================
// Met Office DataHub Models
// ============================================================================

/// GeoJSON FeatureCollection returned by the site-specific endpoints.
///
/// The document is kept exactly as the upstream sent it (key order, number
/// literals, nulls), so the JSON response format hands it back unchanged.
/// Rendering goes through the typed [`Feature`] and [`TimeStepEntry`] views.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ForecastRecord(Map<String, Value>);

impl ForecastRecord {
    /// The feature that gets rendered; the upstream sends at most one.
    pub fn primary_feature(&self) -> Option<Feature<'_>> {
        self.0
            .get("features")?
            .as_array()?
            .first()
            .map(|value| Feature { value })
    }

    /// Keeps the first `count` entries of the primary feature's time series.
    /// Returns false when there is no time series to cut.
    pub fn truncate_time_series(&mut self, count: usize) -> bool {
        let series = self
            .0
            .get_mut("features")
            .and_then(Value::as_array_mut)
            .and_then(|features| features.first_mut())
            .and_then(|feature| feature.pointer_mut("/properties/timeSeries"))
            .and_then(Value::as_array_mut);

        match series {
            Some(series) => {
                series.truncate(count);
                true
            }
            None => false,
        }
    }
}

/// Read-only view of one GeoJSON feature.
#[derive(Debug, Clone, Copy)]
pub struct Feature<'a> {
    value: &'a Value,
}

impl Feature<'_> {
    /// `(latitude, longitude)` from `[longitude, latitude, altitude]`, if the
    /// geometry carries at least two numeric coordinates.
    pub fn location(&self) -> Option<(f64, f64)> {
        let coordinates = self.value.pointer("/geometry/coordinates")?.as_array()?;
        match coordinates.as_slice() {
            [longitude, latitude, ..] => Some((latitude.as_f64()?, longitude.as_f64()?)),
            _ => None,
        }
    }

    pub fn time_series(&self) -> Vec<TimeStepEntry> {
        self.value
            .pointer("/properties/timeSeries")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().map(TimeStepEntry::from_value).collect())
            .unwrap_or_default()
    }
}

/// One reported value, as the upstream wrote it (number or string).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Reading(Value);

impl Reading {
    pub fn as_i64(&self) -> Option<i64> {
        self.0.as_i64()
    }
}

impl From<Value> for Reading {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(text) => f.write_str(text),
            other => write!(f, "{other}"),
        }
    }
}

/// One forecast period. Every reading is optional: `None` means the
/// upstream did not report it (or reported `null`) for this period.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeStepEntry {
    #[serde(default)]
    pub time: Option<Reading>,
    #[serde(default)]
    pub screen_temperature: Option<Reading>,
    #[serde(default)]
    pub feels_like_temperature: Option<Reading>,
    #[serde(rename = "windSpeed10m", default)]
    pub wind_speed: Option<Reading>,
    #[serde(rename = "windDirectionFrom10m", default)]
    pub wind_direction: Option<Reading>,
    #[serde(rename = "totalPrecipAmount", default)]
    pub precipitation: Option<Reading>,
    #[serde(rename = "screenRelativeHumidity", default)]
    pub humidity: Option<Reading>,
    #[serde(default)]
    pub visibility: Option<Reading>,
    #[serde(default)]
    pub mslp: Option<Reading>,
    #[serde(default)]
    pub uv_index: Option<Reading>,
    #[serde(default)]
    pub significant_weather_code: Option<Reading>,
}

impl TimeStepEntry {
    /// Reads the known fields of one `timeSeries` item. Anything that is not
    /// an object yields an entry with nothing reported.
    pub fn from_value(value: &Value) -> Self {
        Self::deserialize(value).unwrap_or_default()
    }
}

/// Forecast cadence, one per tool and upstream endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Hourly,
    ThreeHourly,
    Daily,
}

impl Granularity {
    /// Path segment appended to the DataHub base URL
    pub fn endpoint(&self) -> &'static str {
        match self {
            Granularity::Hourly => "hourly",
            Granularity::ThreeHourly => "three-hourly",
            Granularity::Daily => "daily",
        }
    }

    /// Label used in the markdown header
    pub fn label(&self) -> &'static str {
        match self {
            Granularity::Hourly => "Hourly",
            Granularity::ThreeHourly => "3-Hourly",
            Granularity::Daily => "Daily",
        }
    }
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

/// Output format for tool responses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Human-readable report
    #[default]
    Markdown,
    /// Machine-readable GeoJSON
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct WeatherForecastInput {
    /// Latitude in decimal degrees (e.g., 51.5074 for London, 40.7128 for New York)
    pub latitude: f64,
    /// Longitude in decimal degrees (e.g., -0.1278 for London, -74.0060 for New York)
    pub longitude: f64,
    /// Output format: 'markdown' for human-readable or 'json' for machine-readable
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl WeatherForecastInput {
    /// Checks coordinate ranges, returning the message to report on failure.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err("Latitude must be between -90 and 90 degrees");
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err("Longitude must be between -180 and 180 degrees");
        }
        Ok(())
    }
}
