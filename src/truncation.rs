//! Keeps tool responses under the character budget.
//!
//! Markdown is cut at the budget boundary. JSON is re-serialized with fewer
//! forecast periods, walking [`TRUNCATION_LADDER`] from the largest count down
//! and stopping at the first one that fits, so the output stays valid JSON.

use serde_json::json;

use crate::constants::TRUNCATION_LADDER;
use crate::models::ForecastRecord;

/// A response body plus whether anything was dropped to produce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    pub text: String,
    pub truncated: bool,
}

impl RenderedOutput {
    pub fn complete(text: String) -> Self {
        Self { text, truncated: false }
    }

    pub fn truncated(text: String) -> Self {
        Self { text, truncated: true }
    }
}

/// Length in characters, which is what the budget is expressed in.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Hard-truncates markdown at `budget` characters and appends a notice.
///
/// The cut can land mid-line; no attempt is made to re-render.
pub fn truncate_markdown(content: String, budget: usize) -> RenderedOutput {
    let Some((cut, _)) = content.char_indices().nth(budget) else {
        return RenderedOutput::complete(content);
    };

    let mut text = String::with_capacity(cut + 160);
    text.push_str(&content[..cut]);
    text.push_str("\n\n---\n\n");
    text.push_str(&format!(
        "**Response truncated** (exceeded {budget} character limit). "
    ));
    text.push_str("Try using JSON format with filtering or requesting a shorter forecast period.");

    RenderedOutput::truncated(text)
}

/// Serializes `record` as pretty JSON no longer than `budget` characters.
///
/// Returns the full serialization when it fits. Otherwise the first
/// feature's time series is cut to each ladder count in turn and the first
/// serialization that fits wins. If none fit, or the record has no time
/// series to cut, a small error object is returned instead.
pub fn serialize_within_budget(record: &ForecastRecord, budget: usize) -> RenderedOutput {
    match serde_json::to_string_pretty(record) {
        Ok(full) => {
            let len = char_len(&full);
            if len <= budget {
                return RenderedOutput::complete(full);
            }
            tracing::debug!(len, budget, "JSON forecast over budget, trimming time series");
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to serialize forecast record");
            return RenderedOutput::truncated(oversized_fallback(budget));
        }
    }

    let mut trimmed = record.clone();
    for keep in TRUNCATION_LADDER {
        if !trimmed.truncate_time_series(keep) {
            tracing::warn!("JSON forecast over budget but has no time series to trim");
            break;
        }

        match serde_json::to_string_pretty(&trimmed) {
            Ok(candidate) if char_len(&candidate) <= budget => {
                tracing::debug!(keep, "trimmed JSON forecast fits budget");
                return RenderedOutput::truncated(candidate);
            }
            Ok(candidate) => {
                tracing::debug!(keep, len = char_len(&candidate), "still over budget");
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize trimmed forecast record");
                break;
            }
        }
    }

    RenderedOutput::truncated(oversized_fallback(budget))
}

/// Minimal payload used when no trimmed record fits.
pub fn oversized_fallback(budget: usize) -> String {
    let payload = json!({
        "error": "Response too large",
        "message": format!(
            "Forecast data exceeds {budget} character limit. Try requesting a shorter time period."
        ),
    });
    serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn entry(i: usize, padding: usize) -> Value {
        json!({
            "time": format!("2024-01-{:02}T{:02}:00Z", 1 + i / 24, i % 24),
            "screenTemperature": 10.5,
            "note": "x".repeat(padding)
        })
    }

    fn record(count: usize, padding: usize) -> ForecastRecord {
        let entries: Vec<Value> = (0..count).map(|i| entry(i, padding)).collect();
        serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [{ "properties": { "timeSeries": entries } }]
        }))
        .expect("valid record")
    }

    fn kept_entries(text: &str) -> usize {
        let value: Value = serde_json::from_str(text).expect("valid JSON");
        value["features"][0]["properties"]["timeSeries"]
            .as_array()
            .expect("time series array")
            .len()
    }

    fn serialized_len(record: &ForecastRecord) -> usize {
        char_len(&serde_json::to_string_pretty(record).unwrap())
    }

    #[test]
    fn json_under_budget_is_returned_unchanged() {
        let rec = record(5, 10);
        let expected = serde_json::to_string_pretty(&rec).unwrap();

        let out = serialize_within_budget(&rec, 25_000);

        assert_eq!(out, RenderedOutput::complete(expected));
    }

    #[test]
    fn json_at_exact_budget_is_not_trimmed() {
        let rec = record(5, 10);
        let len = serialized_len(&rec);

        let out = serialize_within_budget(&rec, len);
        assert!(!out.truncated);
        assert_eq!(kept_entries(&out.text), 5);
    }

    #[test]
    fn json_takes_first_ladder_step_that_fits() {
        let rec = record(50, 400);
        let budget = serialized_len(&record(20, 400));
        assert!(serialized_len(&rec) > budget);

        let out = serialize_within_budget(&rec, budget);

        assert!(out.truncated);
        assert_eq!(kept_entries(&out.text), 20);
        assert!(char_len(&out.text) <= budget);
    }

    #[test]
    fn json_walks_down_the_ladder() {
        let rec = record(50, 400);
        // Room for 10 entries but not 20.
        let budget = serialized_len(&record(10, 400)) + 5;

        let out = serialize_within_budget(&rec, budget);

        assert_eq!(kept_entries(&out.text), 10);

        let budget = serialized_len(&record(1, 400));
        let out = serialize_within_budget(&rec, budget);
        assert_eq!(kept_entries(&out.text), 1);
    }

    #[test]
    fn json_keeps_entries_in_order() {
        let rec = record(30, 300);
        let budget = serialized_len(&record(5, 300));

        let out = serialize_within_budget(&rec, budget);
        let value: Value = serde_json::from_str(&out.text).unwrap();
        let times: Vec<&str> = value["features"][0]["properties"]["timeSeries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["time"].as_str().unwrap())
            .collect();

        assert_eq!(
            times,
            [
                "2024-01-01T00:00Z",
                "2024-01-01T01:00Z",
                "2024-01-01T02:00Z",
                "2024-01-01T03:00Z",
                "2024-01-01T04:00Z"
            ]
        );
    }

    #[test]
    fn json_falls_back_when_single_entry_is_too_large() {
        let rec = record(3, 5_000);

        let out = serialize_within_budget(&rec, 1_000);

        assert!(out.truncated);
        assert_eq!(out.text, oversized_fallback(1_000));
        let value: Value = serde_json::from_str(&out.text).unwrap();
        assert_eq!(value["error"], "Response too large");
        assert_eq!(
            value["message"],
            "Forecast data exceeds 1000 character limit. Try requesting a shorter time period."
        );
    }

    #[test]
    fn json_without_time_series_falls_back_when_over_budget() {
        let rec: ForecastRecord =
            serde_json::from_value(json!({ "features": [], "blob": "y".repeat(500) })).unwrap();

        let out = serialize_within_budget(&rec, 100);

        assert_eq!(out, RenderedOutput::truncated(oversized_fallback(100)));
    }

    #[test]
    fn empty_record_serializes_as_is() {
        let out = serialize_within_budget(&ForecastRecord::default(), 25_000);

        assert_eq!(out, RenderedOutput::complete("{}".to_string()));
    }

    #[test]
    fn markdown_under_budget_is_untouched() {
        let out = truncate_markdown("short".to_string(), 10);
        assert_eq!(out, RenderedOutput::complete("short".to_string()));

        let out = truncate_markdown("exactly10!".to_string(), 10);
        assert!(!out.truncated);
    }

    #[test]
    fn markdown_over_budget_is_cut_with_notice() {
        let content = "a".repeat(30);

        let out = truncate_markdown(content, 12);

        assert!(out.truncated);
        assert!(out.text.starts_with(&format!("{}\n\n---\n\n", "a".repeat(12))));
        assert!(out.text.ends_with(
            "**Response truncated** (exceeded 12 character limit). Try using JSON format with filtering or requesting a shorter forecast period."
        ));
    }

    #[test]
    fn markdown_cut_respects_multibyte_characters() {
        let content = "°".repeat(10);

        let out = truncate_markdown(content, 4);

        assert!(out.text.starts_with("°°°°\n"));
    }
}
