//! Voice-optimised narration of a result page.
//!
//! Produces a [`VoiceContext`] with three parts:
//!
//! | Part | Content |
//! |------|---------|
//! | `summary` | One spoken sentence, phrased per source |
//! | `freshness` | `Data as of {now}`, plus `(updated …)` from the newest record timestamp |
//! | `suggestion` | A follow-up the caller can say next |
//!
//! Timestamps are read from the first of `created_at`, `date`, `timestamp`
//! present on each record. Values that do not parse are skipped.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::models::{Record, VoiceContext};
use crate::records::field_eq_ignore_case;

const TIMESTAMP_KEYS: [&str; 3] = ["created_at", "date", "timestamp"];
const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, Default)]
pub struct VoiceOptimizer;

impl VoiceOptimizer {
    pub fn new() -> Self {
        Self
    }

    /// Narrate `data` (the returned page) relative to the current time.
    pub fn build_voice_context(
        &self,
        data: &[Record],
        source: &str,
        total: usize,
        returned: usize,
    ) -> VoiceContext {
        self.build_voice_context_at(data, source, total, returned, Utc::now())
    }

    /// Same as [`build_voice_context`](Self::build_voice_context) with an explicit clock.
    pub fn build_voice_context_at(
        &self,
        data: &[Record],
        source: &str,
        total: usize,
        returned: usize,
        now: DateTime<Utc>,
    ) -> VoiceContext {
        VoiceContext {
            summary: summarize(data, source),
            freshness: freshness(data, now),
            suggestion: suggest(source, total, returned),
        }
    }
}

fn summarize(records: &[Record], source: &str) -> String {
    let n = records.len();
    if n == 0 {
        return format!("No {} records found.", source);
    }

    match source {
        "crm" => {
            let active = count_where(records, "status", "active");
            format!(
                "Found {} customers, {} active and {} inactive.",
                n,
                active,
                n - active
            )
        }
        "support" => {
            let open = count_where(records, "status", "open");
            let high = count_where(records, "priority", "high");
            format!("Found {} tickets, {} open, {} high-priority.", n, open, high)
        }
        "analytics" => {
            let values: Vec<f64> = records
                .iter()
                .filter_map(|r| r.get("value").and_then(|v| v.as_f64()))
                .collect();
            if values.is_empty() {
                format!("Found {} analytics records.", n)
            } else {
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                format!("Found {} data points, average value {:.1}.", n, mean)
            }
        }
        _ => format!("Found {} {} records.", n, source),
    }
}

fn count_where(records: &[Record], key: &str, expected: &str) -> usize {
    records
        .iter()
        .filter(|r| field_eq_ignore_case(r, key, expected))
        .count()
}

/// Parses an ISO-8601-like timestamp. A trailing `Z` is read as `+00:00`;
/// values without an offset are taken as UTC; a bare date is midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let normalized = match raw.strip_suffix('Z') {
        Some(stem) => format!("{}+00:00", stem),
        None => raw.to_string(),
    };
    let s = normalized.as_str();

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn record_timestamp(record: &Record) -> Option<DateTime<Utc>> {
    let value = TIMESTAMP_KEYS.iter().find_map(|k| record.get(*k))?;
    parse_timestamp(value.as_str()?)
}

fn freshness(records: &[Record], now: DateTime<Utc>) -> String {
    let stamp = now.format("%Y-%m-%d %H:%M UTC");

    let Some(newest) = records.iter().filter_map(record_timestamp).max() else {
        return format!("Data as of {}", stamp);
    };

    // Whole days, rounded down; future timestamps count as today.
    let days = (now - newest).num_seconds().div_euclid(SECONDS_PER_DAY).max(0);
    match days {
        0 => format!("Data as of {} (updated today)", stamp),
        1 => format!("Data as of {} (updated yesterday)", stamp),
        d => format!("Data as of {} (updated {} days ago)", stamp, d),
    }
}

fn suggest(source: &str, total: usize, returned: usize) -> Option<String> {
    if total == 0 {
        return Some(format!("Try broadening your {} search filters.", source));
    }
    if total > returned {
        return Some("Say 'next page' to see more results.".to_string());
    }
    let hint = match source {
        "crm" => "Say 'show active customers' or 'search customer by name'.",
        "support" => "Say 'show high priority tickets' or 'show open tickets'.",
        "analytics" => "Say 'show last 7 days' or 'show metrics for today'.",
        _ => return None,
    };
    Some(hint.to_string())
}
