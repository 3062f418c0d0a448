//! Thin wrapper around the YouTube Data API v3 with Credo defaults.
//!
//! Auth is the `key` query parameter, injected at construction. Every call
//! is a single synchronous request against the first page of results;
//! retries are pinned to zero so a quota error surfaces immediately instead
//! of burning more quota.
use crate::types::{
    ChannelCandidate, ChannelDetail, ChannelListResponse, SearchListResponse, VideoListResponse,
    VideoStat,
};
use anyhow::{Context, Result};
use credo_http::{Auth, HttpClient, RequestOpts};
use std::borrow::Cow;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

#[derive(Clone)]
pub struct YoutubeApi {
    http: HttpClient,
    key: String,
    video_order: String,
}

impl YoutubeApi {
    pub fn new(api_key: String) -> Self {
        let http = HttpClient::new(DEFAULT_BASE_URL).expect("youtube base url");
        Self {
            http,
            key: api_key,
            video_order: "date".to_string(),
        }
    }

    /// Point the client at a different base URL (mock servers in tests).
    pub fn with_base_url(mut self, base: &str) -> Result<Self> {
        self.http = HttpClient::new(base).context("invalid youtube base url")?;
        Ok(self)
    }

    /// Ordering mode passed to the recent-video search (`date` by default).
    pub fn with_video_order(mut self, order: impl Into<String>) -> Self {
        self.video_order = order.into();
        self
    }

    fn auth(&self) -> Auth<'_> {
        Auth::Query {
            name: "key",
            value: Cow::Borrowed(self.key.as_str()),
        }
    }

    /// Topic search over channels. Platform order, first page only.
    pub async fn search_channels(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<ChannelCandidate>> {
        tracing::info!(target: "youtube", query, max_results, "youtube.channel_search.start");

        let params: Vec<(&str, Cow<'_, str>)> = vec![
            ("part", "snippet".into()),
            ("type", "channel".into()),
            ("q", query.into()),
            ("maxResults", max_results.to_string().into()),
        ];
        let resp: SearchListResponse = self
            .http
            .get_json(
                "search",
                RequestOpts {
                    auth: Some(self.auth()),
                    query: Some(params),
                    retries: Some(0),
                    ..Default::default()
                },
            )
            .await
            .context("youtube channel search failed")?;

        let candidates: Vec<ChannelCandidate> = resp
            .items
            .into_iter()
            .filter_map(|it| it.id.channel_id)
            .map(|channel_id| ChannelCandidate { channel_id })
            .collect();

        tracing::info!(target: "youtube", hits = candidates.len(), "youtube.channel_search.done");
        Ok(candidates)
    }

    /// Profile and lifetime counters for one channel. `None` when the
    /// platform has no item for the id; absent counters read as 0.
    pub async fn channel_detail(&self, channel_id: &str) -> Result<Option<ChannelDetail>> {
        let params: Vec<(&str, Cow<'_, str>)> = vec![
            ("part", "statistics,snippet".into()),
            ("id", channel_id.into()),
        ];
        let resp: ChannelListResponse = self
            .http
            .get_json(
                "channels",
                RequestOpts {
                    auth: Some(self.auth()),
                    query: Some(params),
                    retries: Some(0),
                    ..Default::default()
                },
            )
            .await
            .with_context(|| format!("youtube channel lookup failed for {channel_id}"))?;

        let detail = resp.items.into_iter().next().map(|item| ChannelDetail {
            title: item.snippet.title,
            channel_id: item.id,
            description: item.snippet.description,
            subscriber_count: item.statistics.subscriber_count,
            video_count: item.statistics.video_count,
            view_count: item.statistics.view_count,
        });

        if detail.is_none() {
            tracing::debug!(target: "youtube", channel_id, "youtube.channel_detail.empty");
        }
        Ok(detail)
    }

    /// Ids of the channel's most recent uploads, newest first when the
    /// configured order is `date`.
    pub async fn recent_video_ids(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<Vec<String>> {
        let params: Vec<(&str, Cow<'_, str>)> = vec![
            ("part", "snippet".into()),
            ("type", "video".into()),
            ("channelId", channel_id.into()),
            ("order", Cow::Borrowed(self.video_order.as_str())),
            ("maxResults", max_results.to_string().into()),
        ];
        let resp: SearchListResponse = self
            .http
            .get_json(
                "search",
                RequestOpts {
                    auth: Some(self.auth()),
                    query: Some(params),
                    retries: Some(0),
                    ..Default::default()
                },
            )
            .await
            .with_context(|| format!("youtube video search failed for {channel_id}"))?;

        Ok(resp
            .items
            .into_iter()
            .filter_map(|it| it.id.video_id)
            .collect())
    }

    /// Batched statistics lookup. One record per id the platform knows,
    /// response order. An empty id list short-circuits without a request.
    pub async fn video_statistics(&self, ids: &[String]) -> Result<Vec<VideoStat>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids.join(",");
        let params: Vec<(&str, Cow<'_, str>)> = vec![
            ("part", "statistics,snippet".into()),
            ("id", joined.into()),
        ];
        let resp: VideoListResponse = self
            .http
            .get_json(
                "videos",
                RequestOpts {
                    auth: Some(self.auth()),
                    query: Some(params),
                    retries: Some(0),
                    ..Default::default()
                },
            )
            .await
            .context("youtube video statistics lookup failed")?;

        tracing::debug!(
            target: "youtube",
            requested = ids.len(),
            returned = resp.items.len(),
            "youtube.video_stats.done"
        );

        Ok(resp
            .items
            .into_iter()
            .map(|item| VideoStat {
                title: item.snippet.title,
                views: item.statistics.view_count,
                likes: item.statistics.like_count,
                published_at: item.snippet.published_at,
            })
            .collect())
    }
}
