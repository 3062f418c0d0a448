//! Wire models for the YouTube Data API plus the plain records the rest of
//! the workspace consumes.
//!
//! YouTube reports statistics counters as JSON *strings* (`"viewCount":
//! "12345"`); [`stat_count`] tolerates strings, numbers, and absent fields,
//! mapping everything unusable to 0 so a sparse response never aborts a
//! crawl.

use serde::{Deserialize, Deserializer, Serialize};

// ==============================
// Domain records
// ==============================

/// A channel surfaced by the topic search; only the id survives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelCandidate {
    pub channel_id: String,
}

/// One channel's public profile and lifetime counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelDetail {
    pub title: String,
    pub channel_id: String,
    pub description: String,
    pub subscriber_count: u64,
    pub video_count: u64,
    pub view_count: u64,
}

/// Per-video counters for one sampled upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoStat {
    pub title: String,
    pub views: u64,
    /// 0 when the uploader hides the like count.
    pub likes: u64,
    /// RFC 3339 publish timestamp, verbatim from the platform.
    pub published_at: String,
}

// ==============================
// Wire shapes
// ==============================

#[derive(Debug, Clone, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub id: SearchResultId,
}

/// Polymorphic result id: exactly one of the fields is set depending on
/// the `type` filter of the search.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelListResponse {
    #[serde(default)]
    pub items: Vec<ChannelItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelItem {
    pub id: String,
    #[serde(default)]
    pub snippet: ChannelSnippet,
    #[serde(default)]
    pub statistics: ChannelStatistics,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChannelSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatistics {
    #[serde(default, deserialize_with = "stat_count")]
    pub subscriber_count: u64,
    #[serde(default, deserialize_with = "stat_count")]
    pub video_count: u64,
    #[serde(default, deserialize_with = "stat_count")]
    pub view_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoItem {
    pub id: String,
    #[serde(default)]
    pub snippet: VideoSnippet,
    #[serde(default)]
    pub statistics: VideoStatistics,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub published_at: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    #[serde(default, deserialize_with = "stat_count")]
    pub view_count: u64,
    #[serde(default, deserialize_with = "stat_count")]
    pub like_count: u64,
}

/// Accept `"123"`, `123`, `null`, or nothing at all; anything else is 0.
fn stat_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(0),
        Some(Raw::Num(n)) => Ok(n),
        Some(Raw::Text(s)) => Ok(s.trim().parse().unwrap_or(0)),
    }
}
