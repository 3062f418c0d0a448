//! Heuristic credibility score for a channel.
//!
//! Three independent 0/1 signals, summed: audience size, average views per
//! video, and topical keywords in the channel description. Deliberately
//! blunt; the score exists to rank a handful of candidates, not to judge
//! anyone.

use credo_youtube::ChannelDetail;

const SUBSCRIBER_FLOOR: u64 = 10_000;
const AVG_VIEWS_FLOOR: f64 = 1_000.0;

/// Score in `0..=3`. Keyword matching is case-insensitive substring search
/// on the description; the denominator of the per-video average is floored
/// at 1 so channels with no uploads never divide by zero.
pub fn credibility_score(detail: &ChannelDetail, keywords: &[String]) -> u8 {
    let mut score = 0u8;

    if detail.subscriber_count > SUBSCRIBER_FLOOR {
        score += 1;
    }

    let per_video = detail.view_count as f64 / detail.video_count.max(1) as f64;
    if per_video > AVG_VIEWS_FLOOR {
        score += 1;
    }

    let description = detail.description.to_lowercase();
    if keywords
        .iter()
        .any(|kw| !kw.is_empty() && description.contains(&kw.to_lowercase()))
    {
        score += 1;
    }

    score
}
