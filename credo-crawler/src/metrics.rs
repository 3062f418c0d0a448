//! Engagement metrics over a channel's sampled recent uploads.
//!
//! All three aggregates are pure functions of the video list and degrade to
//! 0 instead of failing: empty samples, hidden counters, and unparseable
//! timestamps are everyday conditions on this platform, not errors.

use chrono::DateTime;
use credo_youtube::VideoStat;

/// Arithmetic mean of view counts, rounded to the nearest whole view.
pub fn avg_views(videos: &[VideoStat]) -> u64 {
    if videos.is_empty() {
        return 0;
    }
    let total: u64 = videos.iter().map(|v| v.views).sum();
    (total as f64 / videos.len() as f64).round() as u64
}

/// Estimated uploads per 7-day period, from the spread of the sampled
/// publish timestamps.
///
/// Needs at least two parseable timestamps; otherwise the cadence is
/// unknowable and reported as 0. The elapsed span is floored at one day so
/// two uploads within hours of each other do not explode the estimate.
pub fn uploads_per_week(videos: &[VideoStat]) -> f64 {
    let mut stamps: Vec<i64> = videos
        .iter()
        .filter_map(|v| DateTime::parse_from_rfc3339(&v.published_at).ok())
        .map(|dt| dt.timestamp())
        .collect();
    if stamps.len() < 2 {
        return 0.0;
    }
    stamps.sort_unstable_by(|a, b| b.cmp(a));

    let newest = stamps[0];
    let oldest = stamps[stamps.len() - 1];
    let elapsed_days = ((newest - oldest) as f64 / 86_400.0).max(1.0);
    round2((stamps.len() - 1) as f64 / elapsed_days * 7.0)
}

/// Mean like/view percentage over the videos that have any views.
///
/// Zero-view videos carry no signal and are excluded; if none remain the
/// ratio is 0.
pub fn avg_like_view_ratio(videos: &[VideoStat]) -> f64 {
    let ratios: Vec<f64> = videos
        .iter()
        .filter(|v| v.views > 0)
        .map(|v| v.likes as f64 / v.views as f64 * 100.0)
        .collect();
    if ratios.is_empty() {
        return 0.0;
    }
    round2(ratios.iter().sum::<f64>() / ratios.len() as f64)
}

pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(views: u64, likes: u64, published_at: &str) -> VideoStat {
        VideoStat {
            title: "t".into(),
            views,
            likes,
            published_at: published_at.into(),
        }
    }

    #[test]
    fn empty_sample_yields_zero_everywhere() {
        assert_eq!(avg_views(&[]), 0);
        assert_eq!(uploads_per_week(&[]), 0.0);
        assert_eq!(avg_like_view_ratio(&[]), 0.0);
    }

    #[test]
    fn avg_views_rounds_to_nearest() {
        let vids = vec![
            video(10, 0, "2024-01-01T00:00:00Z"),
            video(11, 0, "2024-01-02T00:00:00Z"),
        ];
        // (10 + 11) / 2 = 10.5 -> 11
        assert_eq!(avg_views(&vids), 11);
    }

    #[test]
    fn single_video_has_no_cadence() {
        let vids = vec![video(1000, 10, "2024-01-01T00:00:00Z")];
        assert_eq!(uploads_per_week(&vids), 0.0);
    }

    #[test]
    fn two_videos_a_week_apart_is_one_per_week() {
        let vids = vec![
            video(100, 1, "2024-05-08T12:00:00Z"),
            video(100, 1, "2024-05-01T12:00:00Z"),
        ];
        assert_eq!(uploads_per_week(&vids), 1.0);
    }

    #[test]
    fn cadence_ignores_unparseable_timestamps() {
        let vids = vec![
            video(1, 0, "2024-05-08T12:00:00Z"),
            video(1, 0, "not a timestamp"),
        ];
        // Only one parseable stamp remains, so cadence is unknown.
        assert_eq!(uploads_per_week(&vids), 0.0);
    }

    #[test]
    fn cadence_floors_elapsed_time_at_one_day() {
        let vids = vec![
            video(1, 0, "2024-05-01T10:00:00Z"),
            video(1, 0, "2024-05-01T11:00:00Z"),
        ];
        // One hour apart: elapsed clamps to 1 day -> (2-1)/1*7 = 7/week.
        assert_eq!(uploads_per_week(&vids), 7.0);
    }

    #[test]
    fn ratio_excludes_zero_view_videos() {
        let vids = vec![
            video(0, 0, "2024-05-01T00:00:00Z"),
            video(100, 10, "2024-05-02T00:00:00Z"),
        ];
        assert_eq!(avg_like_view_ratio(&vids), 10.0);
    }

    #[test]
    fn ratio_is_zero_when_nothing_has_views() {
        let vids = vec![video(0, 5, "2024-05-01T00:00:00Z")];
        assert_eq!(avg_like_view_ratio(&vids), 0.0);
    }
}
