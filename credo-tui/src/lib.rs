//! Terminal viewer for the creator report.
//!
//! Renders the persisted CSV as a navigable table and can trigger a fresh
//! crawl in-process; completion arrives as a structured [`CrawlOutcome`]
//! over a channel rather than a subprocess exit code.

mod app;
mod styles;
mod view;

pub use app::{CrawlOutcome, ViewerApp, ViewerConfig};
