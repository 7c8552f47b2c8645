use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::constants::{CHARACTER_LIMIT, MARKDOWN_ENTRY_LIMIT};
use crate::models::{ForecastRecord, Granularity, ResponseFormat, TimeStepEntry};
use crate::truncation::{serialize_within_budget, truncate_markdown, RenderedOutput};

/// Formats a forecast for the requested output format, within the response budget
pub fn format_response(
    record: &ForecastRecord,
    granularity: Granularity,
    format: ResponseFormat,
) -> RenderedOutput {
    format_response_within(record, granularity, format, CHARACTER_LIMIT)
}

/// Same as [`format_response`] with an explicit character budget
pub fn format_response_within(
    record: &ForecastRecord,
    granularity: Granularity,
    format: ResponseFormat,
    budget: usize,
) -> RenderedOutput {
    match format {
        ResponseFormat::Markdown => {
            truncate_markdown(format_forecast_markdown(record, granularity.label()), budget)
        }
        ResponseFormat::Json => serialize_within_budget(record, budget),
    }
}

/// Formats a Met Office forecast into a markdown report.
///
/// Only the first [`MARKDOWN_ENTRY_LIMIT`] periods are rendered; a closing
/// note points at the JSON format when more were returned.
pub fn format_forecast_markdown(record: &ForecastRecord, forecast_type: &str) -> String {
    let Some(feature) = record.primary_feature() else {
        return "No weather data available.".to_string();
    };

    let mut lines: Vec<String> = Vec::new();

    if let Some((latitude, longitude)) = feature.location() {
        lines.push(format!("# Weather Forecast ({forecast_type})"));
        lines.push(format!("**Location:** {latitude:.4}\u{00b0}N, {longitude:.4}\u{00b0}E"));
        lines.push(String::new());
    }

    let time_series = feature.time_series();
    if time_series.is_empty() {
        return "No forecast data available.".to_string();
    }

    lines.push(format!("**Forecast periods:** {}", time_series.len()));
    lines.push(String::new());

    for entry in time_series.iter().take(MARKDOWN_ENTRY_LIMIT) {
        push_entry(&mut lines, entry);
        lines.push(String::new());
    }

    if time_series.len() > MARKDOWN_ENTRY_LIMIT {
        lines.push(format!(
            "*Showing first {MARKDOWN_ENTRY_LIMIT} of {} forecast periods. Use JSON format for complete data.*",
            time_series.len()
        ));
    }

    lines.join("\n")
}

fn push_entry(lines: &mut Vec<String>, entry: &TimeStepEntry) {
    let heading = entry
        .time
        .as_ref()
        .map(|time| format_timestamp(&time.to_string()))
        .unwrap_or_else(|| "Unknown time".to_string());
    lines.push(format!("## {heading}"));

    if let Some(temp) = &entry.screen_temperature {
        lines.push(format!("- **Temperature:** {temp}\u{00b0}C"));
    }
    if let Some(feels) = &entry.feels_like_temperature {
        lines.push(format!("- **Feels Like:** {feels}\u{00b0}C"));
    }
    if let Some(speed) = &entry.wind_speed {
        let direction = entry
            .wind_direction
            .as_ref()
            .map(|dir| dir.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        lines.push(format!("- **Wind:** {speed} m/s from {direction}\u{00b0}"));
    }
    if let Some(precip) = &entry.precipitation {
        lines.push(format!("- **Precipitation:** {precip} mm"));
    }
    if let Some(humidity) = &entry.humidity {
        lines.push(format!("- **Humidity:** {humidity}%"));
    }
    if let Some(visibility) = &entry.visibility {
        lines.push(format!("- **Visibility:** {visibility} m"));
    }
    if let Some(pressure) = &entry.mslp {
        lines.push(format!("- **Pressure:** {pressure} Pa"));
    }
    if let Some(uv) = &entry.uv_index {
        lines.push(format!("- **UV Index:** {uv}"));
    }
    if let Some(code) = &entry.significant_weather_code {
        match code.as_i64().and_then(weather_code_to_description) {
            Some(desc) => lines.push(format!("- **Weather Code:** {code} ({desc})")),
            None => lines.push(format!("- **Weather Code:** {code}")),
        }
    }
}

/// Converts an ISO 8601 timestamp to `YYYY-MM-DD HH:MM UTC`.
///
/// Accepts the DataHub's minute-precision form (`2024-01-15T14:00Z`) as
/// well as full RFC 3339. Offsets are converted to UTC, naive values are
/// taken as UTC. Anything unparseable is returned as-is.
pub fn format_timestamp(timestamp: &str) -> String {
    match parse_timestamp(timestamp) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => timestamp.to_string(),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let offset_form = match raw.strip_suffix('Z') {
        Some(stem) => format!("{stem}+00:00"),
        None => raw.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&offset_form) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(&offset_form, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    // Naive and date-only forms are still ISO 8601; the upstream contract
    // only promises ISO 8601, so they are read as UTC rather than echoed.
    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Converts a Met Office significant weather code to a description
fn weather_code_to_description(code: i64) -> Option<&'static str> {
    let desc = match code {
        -1 => "Trace rain",
        0 => "Clear night",
        1 => "Sunny day",
        2 => "Partly cloudy (night)",
        3 => "Partly cloudy (day)",
        5 => "Mist",
        6 => "Fog",
        7 => "Cloudy",
        8 => "Overcast",
        9 => "Light rain shower (night)",
        10 => "Light rain shower (day)",
        11 => "Drizzle",
        12 => "Light rain",
        13 => "Heavy rain shower (night)",
        14 => "Heavy rain shower (day)",
        15 => "Heavy rain",
        16 => "Sleet shower (night)",
        17 => "Sleet shower (day)",
        18 => "Sleet",
        19 => "Hail shower (night)",
        20 => "Hail shower (day)",
        21 => "Hail",
        22 => "Light snow shower (night)",
        23 => "Light snow shower (day)",
        24 => "Light snow",
        25 => "Heavy snow shower (night)",
        26 => "Heavy snow shower (day)",
        27 => "Heavy snow",
        28 => "Thunder shower (night)",
        29 => "Thunder shower (day)",
        30 => "Thunder",
        _ => return None,
    };
    Some(desc)
}
