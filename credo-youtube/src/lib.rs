//! Read-only client for the YouTube Data API v3.
//!
//! Covers the four queries the crawler needs: channel search by topic,
//! channel detail lookup, recent-video search scoped to a channel, and
//! batched video statistics. Single page, single shot; quota-friendly
//! callers decide how many results to ask for.

pub mod client;
pub mod types;

pub use client::YoutubeApi;
pub use types::{ChannelCandidate, ChannelDetail, VideoStat};
