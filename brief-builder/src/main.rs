use anyhow::{bail, Context};
use brief_builder::{
    AggregateLimits, BuildConfig, BuildPipeline, FetchConfig, Fetcher, SummaryConfig,
};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn, Level};

/// Fetch the configured feeds and rebuild the static site.
#[derive(Debug, Parser)]
#[command(name = "brief-builder", version, about)]
struct Cli {
    /// Feed list (category map or list of {url, category})
    #[arg(long, default_value = "data/feeds.json")]
    feeds: PathBuf,

    /// Page metadata
    #[arg(long, default_value = "data/meta.json")]
    meta: PathBuf,

    /// Directory holding template_home.html, template_category.html and template_card.html
    #[arg(long, default_value = "site")]
    templates: PathBuf,

    /// Output directory served by the static host
    #[arg(long, default_value = "docs")]
    out: PathBuf,

    /// Copy hand-authored pages and assets from this directory into the output
    #[arg(long)]
    static_dir: Option<PathBuf>,

    #[arg(long, default_value_t = 2)]
    summary_sentences: usize,

    /// Maximum summary length in characters
    #[arg(long, default_value_t = 280)]
    summary_chars: usize,

    #[arg(long)]
    max_per_category: Option<usize>,

    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Per-feed request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Leave the build timestamp out so identical inputs give identical pages
    #[arg(long)]
    no_timestamp: bool,

    /// Write a JSON build report (pages, article counts, skipped feeds) here
    #[arg(long)]
    report: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<BuildConfig> {
        if self.summary_chars == 0 {
            bail!("--summary-chars must be at least 1");
        }
        if self.summary_sentences == 0 {
            bail!("--summary-sentences must be at least 1");
        }

        Ok(BuildConfig {
            feeds_path: self.feeds,
            meta_path: self.meta,
            templates_dir: self.templates,
            output_dir: self.out,
            static_dir: self.static_dir,
            fetch: FetchConfig {
                timeout_seconds: self.timeout,
                concurrency: self.concurrency,
                ..FetchConfig::default()
            },
            summary: SummaryConfig {
                max_sentences: self.summary_sentences,
                max_chars: self.summary_chars,
            },
            limits: AggregateLimits {
                max_per_category: self.max_per_category,
                ..AggregateLimits::default()
            },
            stamp_build_time: !self.no_timestamp,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let report_path = cli.report.clone();
    let config = cli.into_config()?;
    info!("Starting build ({} -> {})", config.feeds_path.display(), config.output_dir.display());

    let fetcher = Fetcher::new(config.fetch.clone()).context("failed to create HTTP client")?;
    let pipeline = BuildPipeline::new(config, fetcher);

    let report = pipeline.run().await.map_err(|e| {
        error!("Build failed: {}", e);
        e
    })?;

    for failed in &report.failed_feeds {
        warn!("Feed skipped this run: {} ({}): {}", failed.url, failed.category, failed.error);
    }
    if let Some(path) = &report_path {
        report
            .write_json(path)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
    }
    info!(
        "Wrote {} pages with {} articles from {} feeds",
        report.pages.len(),
        report.articles,
        report.feeds_ok
    );
    Ok(())
}
