// In crates/web-server/src/types.rs

use chrono::NaiveDate;
use core_types::TimePeriod;
use serde::{Deserialize, Serialize};

/// Query parameters of the analytics endpoints
/// (e.g. `?timePeriod=month&referenceDate=2024-03-01&primaryTags=A,B`).
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsParams {
    #[serde(default)]
    pub time_period: TimePeriod,
    /// Defaults to today when missing.
    pub reference_date: Option<NaiveDate>,
    /// Comma-separated tag list.
    pub primary_tags: Option<String>,
    /// Comma-separated tag list.
    pub secondary_tags: Option<String>,
}

/// Splits a comma-separated tag list, dropping blanks.
pub fn split_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
