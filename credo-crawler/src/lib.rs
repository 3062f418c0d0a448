//! Crawl orchestration: discover creators for a topic, enrich each with
//! engagement metrics and a credibility score, and persist the report.
//!
//! The platform sits behind the [`CreatorSource`] trait so the whole
//! pipeline runs against a mock in tests. Channels are processed strictly
//! in candidate-search order and one channel's failure never aborts the
//! run; only the initial search is load-bearing.

pub mod metrics;
pub mod report;
pub mod score;

use anyhow::{Context, Result};
use async_trait::async_trait;
use credo_youtube::{ChannelCandidate, ChannelDetail, VideoStat, YoutubeApi};
use std::path::Path;

pub use report::{CreatorRow, ReportError};

/// What to crawl for. Keywords are normalised at construction: trimmed,
/// lower-cased, empties discarded.
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    pub topic: String,
    pub keywords: Vec<String>,
}

impl CrawlRequest {
    pub fn new(topic: impl Into<String>, keywords: impl IntoIterator<Item = String>) -> Self {
        let keywords = keywords
            .into_iter()
            .map(|kw| kw.trim().to_lowercase())
            .filter(|kw| !kw.is_empty())
            .collect();
        Self {
            topic: topic.into(),
            keywords,
        }
    }

    /// Split a comma-separated operator input into a request.
    pub fn from_comma_separated(topic: impl Into<String>, keywords: &str) -> Self {
        Self::new(topic, keywords.split(',').map(str::to_string))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CrawlLimits {
    pub max_channels: u32,
    pub videos_per_channel: u32,
}

impl Default for CrawlLimits {
    fn default() -> Self {
        Self {
            max_channels: 5,
            videos_per_channel: 5,
        }
    }
}

/// The platform surface the orchestrator needs. Implemented by
/// [`YoutubeApi`]; tests substitute a scripted mock.
#[async_trait]
pub trait CreatorSource: Send + Sync {
    async fn search_channels(&self, query: &str, max_results: u32)
        -> Result<Vec<ChannelCandidate>>;
    async fn channel_detail(&self, channel_id: &str) -> Result<Option<ChannelDetail>>;
    async fn recent_video_ids(&self, channel_id: &str, max_results: u32) -> Result<Vec<String>>;
    async fn video_statistics(&self, ids: &[String]) -> Result<Vec<VideoStat>>;
}

#[async_trait]
impl CreatorSource for YoutubeApi {
    async fn search_channels(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<ChannelCandidate>> {
        YoutubeApi::search_channels(self, query, max_results).await
    }

    async fn channel_detail(&self, channel_id: &str) -> Result<Option<ChannelDetail>> {
        YoutubeApi::channel_detail(self, channel_id).await
    }

    async fn recent_video_ids(&self, channel_id: &str, max_results: u32) -> Result<Vec<String>> {
        YoutubeApi::recent_video_ids(self, channel_id, max_results).await
    }

    async fn video_statistics(&self, ids: &[String]) -> Result<Vec<VideoStat>> {
        YoutubeApi::video_statistics(self, ids).await
    }
}

/// Run one crawl pass and return the rows in candidate-search order.
///
/// `progress` fires once per completed channel, in order; the CLI uses it
/// for its per-channel output lines.
///
/// Failure semantics: the candidate search propagates its error; any
/// per-channel failure (detail, video ids, statistics) drops that channel's
/// row with a warning and the run continues.
pub async fn run_crawl(
    source: &dyn CreatorSource,
    request: &CrawlRequest,
    limits: CrawlLimits,
    mut progress: impl FnMut(&CreatorRow),
) -> Result<Vec<CreatorRow>> {
    tracing::info!(
        target: "crawl",
        topic = %request.topic,
        keywords = ?request.keywords,
        max_channels = limits.max_channels,
        "crawl.start"
    );

    let candidates = source
        .search_channels(&request.topic, limits.max_channels)
        .await
        .context("creator search failed")?;

    if candidates.is_empty() {
        tracing::info!(target: "crawl", topic = %request.topic, "crawl.no_candidates");
        return Ok(Vec::new());
    }

    let mut rows = Vec::with_capacity(candidates.len());
    for candidate in &candidates {
        match crawl_channel(source, candidate, request, limits).await {
            Ok(Some(row)) => {
                progress(&row);
                rows.push(row);
            }
            Ok(None) => {
                tracing::warn!(
                    target: "crawl",
                    channel_id = %candidate.channel_id,
                    "crawl.channel.no_detail"
                );
            }
            Err(err) => {
                tracing::warn!(
                    target: "crawl",
                    channel_id = %candidate.channel_id,
                    error = %err,
                    "crawl.channel.failed"
                );
            }
        }
    }

    tracing::info!(target: "crawl", rows = rows.len(), "crawl.done");
    Ok(rows)
}

async fn crawl_channel(
    source: &dyn CreatorSource,
    candidate: &ChannelCandidate,
    request: &CrawlRequest,
    limits: CrawlLimits,
) -> Result<Option<CreatorRow>> {
    let Some(detail) = source.channel_detail(&candidate.channel_id).await? else {
        return Ok(None);
    };

    let video_ids = source
        .recent_video_ids(&candidate.channel_id, limits.videos_per_channel)
        .await?;
    let videos = source.video_statistics(&video_ids).await?;

    let avg_views_last_5 = metrics::avg_views(&videos);
    let upload_per_week = metrics::uploads_per_week(&videos);
    let avg_like_view_ratio = metrics::avg_like_view_ratio(&videos);
    let credibility_score = score::credibility_score(&detail, &request.keywords);

    tracing::info!(
        target: "crawl",
        title = %detail.title,
        channel_id = %detail.channel_id,
        subscribers = detail.subscriber_count,
        score = credibility_score,
        uploads_per_week = upload_per_week,
        like_view_ratio = avg_like_view_ratio,
        "crawl.channel.done"
    );

    Ok(Some(CreatorRow {
        channel_title: detail.title,
        channel_id: detail.channel_id,
        description: detail.description,
        subscriber_count: detail.subscriber_count,
        video_count: detail.video_count,
        view_count: detail.view_count,
        avg_views_last_5,
        upload_per_week,
        avg_like_view_ratio,
        credibility_score,
    }))
}

/// Crawl and persist in one step. The report is written even when the crawl
/// produced zero rows, so the viewer always finds a well-formed (possibly
/// header-only) table after a run.
pub async fn crawl_and_write(
    source: &dyn CreatorSource,
    request: &CrawlRequest,
    limits: CrawlLimits,
    report_path: &Path,
    progress: impl FnMut(&CreatorRow),
) -> Result<Vec<CreatorRow>> {
    let rows = run_crawl(source, request, limits, progress).await?;
    report::write_report(report_path, &rows)
        .with_context(|| format!("failed to write report to {}", report_path.display()))?;
    Ok(rows)
}
