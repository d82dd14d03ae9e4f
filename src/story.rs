use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Wire shape of an upstream item payload.
///
/// Field names follow the upstream API. Numeric counters default to zero
/// when the upstream omits them (job postings carry no `descendants`).
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    pub title: Option<String>,
    pub url: Option<String>,
    pub by: Option<String>,
    #[serde(default)]
    pub descendants: i64,
    #[serde(default)]
    pub score: i64,
    pub time: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// A normalized story detail record, the unit served to callers.
///
/// Serializes with camelCase field names as the API response shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub title: Option<String>,
    pub uri: Option<String>,
    pub posted_by: Option<String>,
    pub comment_count: i64,
    pub score: i64,
    pub posted_at: Option<DateTime<Local>>,
}

impl From<RawItem> for Story {
    fn from(raw: RawItem) -> Self {
        // `time` is Unix epoch seconds; absent means no posted_at.
        let posted_at = raw
            .time
            .and_then(|secs| Local.timestamp_opt(secs, 0).single());

        Story {
            title: raw.title,
            uri: raw.url,
            posted_by: raw.by,
            comment_count: raw.descendants,
            score: raw.score,
            posted_at,
        }
    }
}
