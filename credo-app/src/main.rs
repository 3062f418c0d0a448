use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use credo_common::observability::{LogConfig, init_logging};
use credo_config::{CredoConfig, CredoConfigLoader};
use credo_crawler::{CrawlLimits, CrawlRequest, crawl_and_write};
use credo_tui::{ViewerApp, ViewerConfig};
use credo_youtube::YoutubeApi;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_CONFIG_FILE: &str = "credo.yaml";

#[derive(Parser)]
#[command(
    name = "credo",
    version,
    about = "Discover content creators on a topic and score their credibility"
)]
struct Cli {
    /// Config file; `credo.yaml` in the working directory is picked up
    /// automatically when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a headless crawl and write the CSV report.
    Crawl {
        /// Search topic (default from config).
        #[arg(long)]
        topic: Option<String>,
        /// Comma-separated credibility keywords (default from config).
        #[arg(long)]
        keywords: Option<String>,
        /// Report output path (default from config).
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Browse the report in the terminal (the default).
    View,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::View) {
        Command::Crawl {
            topic,
            keywords,
            out,
        } => run_crawl_command(cfg, topic, keywords, out).await,
        Command::View => run_view_command(cfg).await,
    }
}

fn load_config(explicit: Option<&Path>) -> Result<CredoConfig> {
    let mut loader = CredoConfigLoader::new();
    if let Some(path) = explicit {
        loader = loader.with_file(path);
    } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
        loader = loader.with_file(DEFAULT_CONFIG_FILE);
    }
    loader.load().context("failed to load configuration")
}

fn build_api(cfg: &CredoConfig) -> Result<YoutubeApi> {
    let key = cfg.youtube.resolved_api_key().context(
        "no YouTube API key configured; set YOUTUBE_API_KEY or youtube.api_key in credo.yaml",
    )?;
    Ok(YoutubeApi::new(key.to_string()).with_video_order(&cfg.youtube.video_order))
}

fn build_request(cfg: &CredoConfig, topic: Option<String>, keywords: Option<String>) -> CrawlRequest {
    let topic = topic.unwrap_or_else(|| cfg.crawl.topic.clone());
    match keywords {
        Some(raw) => CrawlRequest::from_comma_separated(topic, &raw),
        None => CrawlRequest::new(topic, cfg.crawl.keywords.iter().cloned()),
    }
}

fn build_limits(cfg: &CredoConfig) -> CrawlLimits {
    CrawlLimits {
        max_channels: cfg.crawl.max_channels,
        videos_per_channel: cfg.crawl.videos_per_channel,
    }
}

async fn run_crawl_command(
    cfg: CredoConfig,
    topic: Option<String>,
    keywords: Option<String>,
    out: Option<PathBuf>,
) -> Result<()> {
    init_logging(LogConfig::default())?;

    let api = build_api(&cfg)?;
    let request = build_request(&cfg, topic, keywords);
    let limits = build_limits(&cfg);
    let report_path = out.unwrap_or_else(|| PathBuf::from(&cfg.report.path));

    println!("Searching for \"{}\" creators...", request.topic);
    let rows = crawl_and_write(&api, &request, limits, &report_path, |row| {
        println!(
            "{}  score {}/3  {:.2} uploads/week  {:.2}% like/view",
            row.channel_title, row.credibility_score, row.upload_per_week, row.avg_like_view_ratio
        );
    })
    .await?;

    if rows.is_empty() {
        println!("No creators found.");
    }
    println!("Saved {} creators to {}", rows.len(), report_path.display());
    Ok(())
}

async fn run_view_command(cfg: CredoConfig) -> Result<()> {
    // File sink only; stderr output would fight the terminal UI.
    init_logging(LogConfig::default())?;

    let api = build_api(&cfg)?;
    let request = build_request(&cfg, None, None);
    let viewer_config = ViewerConfig {
        report_path: PathBuf::from(&cfg.report.path),
        request,
        limits: build_limits(&cfg),
    };

    let app = ViewerApp::new(Arc::new(api), viewer_config)?;
    app.run().await
}
