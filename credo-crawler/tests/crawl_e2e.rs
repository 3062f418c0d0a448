//! End-to-end orchestrator tests against a scripted platform source.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use credo_crawler::{
    CrawlLimits, CrawlRequest, CreatorSource, crawl_and_write, report, run_crawl,
};
use credo_youtube::{ChannelCandidate, ChannelDetail, VideoStat};
use std::collections::HashMap;
use tempfile::TempDir;

#[derive(Default)]
struct MockSource {
    candidates: Vec<String>,
    details: HashMap<String, ChannelDetail>,
    videos: HashMap<String, Vec<VideoStat>>,
    /// Channels whose detail lookup should fail outright.
    broken_details: Vec<String>,
}

impl MockSource {
    fn with_channel(mut self, detail: ChannelDetail, videos: Vec<VideoStat>) -> Self {
        self.candidates.push(detail.channel_id.clone());
        self.videos.insert(detail.channel_id.clone(), videos);
        self.details.insert(detail.channel_id.clone(), detail);
        self
    }
}

#[async_trait]
impl CreatorSource for MockSource {
    async fn search_channels(
        &self,
        _query: &str,
        max_results: u32,
    ) -> Result<Vec<ChannelCandidate>> {
        Ok(self
            .candidates
            .iter()
            .take(max_results as usize)
            .map(|id| ChannelCandidate {
                channel_id: id.clone(),
            })
            .collect())
    }

    async fn channel_detail(&self, channel_id: &str) -> Result<Option<ChannelDetail>> {
        if self.broken_details.iter().any(|id| id == channel_id) {
            return Err(anyhow!("upstream returned 500"));
        }
        Ok(self.details.get(channel_id).cloned())
    }

    async fn recent_video_ids(&self, channel_id: &str, max_results: u32) -> Result<Vec<String>> {
        let count = self
            .videos
            .get(channel_id)
            .map(|v| v.len().min(max_results as usize))
            .unwrap_or(0);
        Ok((0..count)
            .map(|i| format!("{channel_id}-vid{i}"))
            .collect())
    }

    async fn video_statistics(&self, ids: &[String]) -> Result<Vec<VideoStat>> {
        let Some(first) = ids.first() else {
            return Ok(Vec::new());
        };
        let channel_id = first.rsplit_once("-vid").map(|(c, _)| c).unwrap_or(first);
        Ok(self
            .videos
            .get(channel_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .take(ids.len())
            .collect())
    }
}

fn detail(id: &str, title: &str, subs: u64, vids: u64, views: u64, desc: &str) -> ChannelDetail {
    ChannelDetail {
        title: title.into(),
        channel_id: id.into(),
        description: desc.into(),
        subscriber_count: subs,
        video_count: vids,
        view_count: views,
    }
}

fn video(views: u64, likes: u64, published_at: &str) -> VideoStat {
    VideoStat {
        title: "v".into(),
        views,
        likes,
        published_at: published_at.into(),
    }
}

/// Five weekly uploads, 1000 views and 50 likes each.
fn weekly_videos() -> Vec<VideoStat> {
    (0..5)
        .map(|i| video(1000, 50, &format!("2024-05-{:02}T12:00:00Z", 1 + i * 7)))
        .collect()
}

#[tokio::test]
async fn two_channel_crawl_produces_rows_in_candidate_order() {
    let source = MockSource::default()
        .with_channel(
            detail("UCa", "Money Matters", 50_000, 100, 500_000, "All about money"),
            weekly_videos(),
        )
        .with_channel(
            detail("UCb", "Tiny Channel", 100, 10, 500, "gardening diary"),
            weekly_videos(),
        );

    let request = CrawlRequest::from_comma_separated("personal finance", "money,investing");
    let mut seen = Vec::new();
    let rows = run_crawl(&source, &request, CrawlLimits::default(), |row| {
        seen.push(row.channel_id.clone())
    })
    .await
    .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].channel_id, "UCa");
    assert_eq!(rows[1].channel_id, "UCb");
    assert_eq!(seen, vec!["UCa", "UCb"]);

    // UCa: >10k subs, 5000 views/video, "money" in description.
    assert_eq!(rows[0].credibility_score, 3);
    // UCb: 50 views/video, 100 subs, no keyword.
    assert_eq!(rows[1].credibility_score, 0);

    // Metrics from the shared sample: 1000 views avg, 1 upload/week, 5% ratio.
    assert_eq!(rows[0].avg_views_last_5, 1000);
    assert_eq!(rows[0].upload_per_week, 1.0);
    assert_eq!(rows[0].avg_like_view_ratio, 5.0);
}

#[tokio::test]
async fn zero_candidates_is_success_with_header_only_report() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("creators.csv");

    let source = MockSource::default();
    let request = CrawlRequest::from_comma_separated("obscure topic", "nothing");
    let rows = crawl_and_write(&source, &request, CrawlLimits::default(), &path, |_| {})
        .await
        .unwrap();

    assert!(rows.is_empty());
    assert_eq!(report::read_report(&path).unwrap(), Some(Vec::new()));
}

#[tokio::test]
async fn channel_without_detail_is_skipped_silently() {
    let mut source = MockSource::default().with_channel(
        detail("UCa", "Kept", 1, 1, 1, ""),
        vec![],
    );
    // A candidate the detail lookup knows nothing about.
    source.candidates.push("UCghost".into());

    let request = CrawlRequest::from_comma_separated("t", "");
    let rows = run_crawl(&source, &request, CrawlLimits::default(), |_| {})
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].channel_id, "UCa");
}

#[tokio::test]
async fn channel_level_failure_drops_only_that_row() {
    let mut source = MockSource::default()
        .with_channel(detail("UCa", "First", 1, 1, 1, ""), vec![])
        .with_channel(detail("UCb", "Broken", 1, 1, 1, ""), vec![])
        .with_channel(detail("UCc", "Last", 1, 1, 1, ""), vec![]);
    source.broken_details.push("UCb".into());

    let request = CrawlRequest::from_comma_separated("t", "");
    let rows = run_crawl(&source, &request, CrawlLimits::default(), |_| {})
        .await
        .unwrap();

    let ids: Vec<_> = rows.iter().map(|r| r.channel_id.as_str()).collect();
    assert_eq!(ids, vec!["UCa", "UCc"]);
}

#[tokio::test]
async fn search_failure_aborts_the_run() {
    struct FailingSearch;

    #[async_trait]
    impl CreatorSource for FailingSearch {
        async fn search_channels(&self, _: &str, _: u32) -> Result<Vec<ChannelCandidate>> {
            Err(anyhow!("API key not valid"))
        }
        async fn channel_detail(&self, _: &str) -> Result<Option<ChannelDetail>> {
            unreachable!("search already failed")
        }
        async fn recent_video_ids(&self, _: &str, _: u32) -> Result<Vec<String>> {
            unreachable!()
        }
        async fn video_statistics(&self, _: &[String]) -> Result<Vec<VideoStat>> {
            unreachable!()
        }
    }

    let request = CrawlRequest::from_comma_separated("t", "");
    let err = run_crawl(&FailingSearch, &request, CrawlLimits::default(), |_| {})
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("creator search failed"));
}

#[tokio::test]
async fn channels_with_no_videos_get_zero_metrics() {
    let source = MockSource::default().with_channel(
        detail("UCa", "Quiet", 20_000, 0, 0, "money"),
        vec![],
    );

    let request = CrawlRequest::from_comma_separated("t", "money");
    let rows = run_crawl(&source, &request, CrawlLimits::default(), |_| {})
        .await
        .unwrap();

    assert_eq!(rows[0].avg_views_last_5, 0);
    assert_eq!(rows[0].upload_per_week, 0.0);
    assert_eq!(rows[0].avg_like_view_ratio, 0.0);
    // Subscribers + keyword still score; zero videos must not divide by zero.
    assert_eq!(rows[0].credibility_score, 2);
}
