use crate::aggregator::Aggregator;
use crate::config::SiteInputs;
use crate::images::copyright_safe_image;
use crate::parser::FeedParser;
use crate::renderer::{PageRenderer, RenderedPage};
use crate::summarizer::Summarizer;
use crate::traits::FetchFeed;
use crate::types::{
    BuildConfig, BuildError, BuildReport, CategoryPage, FailedFeed, FeedOutcome, FeedSource,
    FetchReport, PageSummary, Result,
};
use crate::writer::SiteWriter;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

/// One build run: fetch → aggregate → summarize → render → write.
pub struct BuildPipeline<F: FetchFeed> {
    config: BuildConfig,
    fetcher: F,
}

impl<F: FetchFeed> BuildPipeline<F> {
    pub fn new(config: BuildConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Load inputs from disk and run the whole build.
    pub async fn run(&self) -> Result<BuildReport> {
        let inputs = SiteInputs::load(&self.config)?;
        self.build(&inputs).await
    }

    pub async fn build(&self, inputs: &SiteInputs) -> Result<BuildReport> {
        info!("Building site into {}", self.config.output_dir.display());

        let report = self.fetch_all(&inputs.sources).await;
        let feeds_ok = report.succeeded();
        let failed_feeds: Vec<FailedFeed> = report
            .failures()
            .map(|(source, error)| FailedFeed {
                url: source.url.clone(),
                category: source.category.clone(),
                error: error.to_string(),
            })
            .collect();

        info!("Fetched {}/{} feeds", feeds_ok, inputs.sources.len());
        if feeds_ok == 0 {
            return Err(BuildError::AllFeedsFailed {
                attempted: inputs.sources.len(),
            });
        }

        let aggregator = Aggregator::new(self.config.limits.clone());
        let mut pages =
            aggregator.build_pages(&inputs.categories, &inputs.meta, report.into_articles())?;
        self.summarize_pages(&mut pages)?;
        let home_cards = aggregator.select_home(&pages);
        let articles = pages.iter().map(|p| p.articles.len()).sum();

        // Render everything before touching the output tree
        let generated_at = self.config.stamp_build_time.then(Utc::now);
        let renderer = PageRenderer::new(&inputs.templates, &inputs.meta, generated_at);
        let mut rendered: Vec<RenderedPage> = Vec::with_capacity(pages.len() + 1);
        for page in &pages {
            rendered.push(renderer.render_category(page)?);
        }
        rendered.push(renderer.render_home(&home_cards)?);

        let writer = SiteWriter::new(&self.config.output_dir);
        if let Some(static_dir) = &self.config.static_dir {
            writer.sync_static(static_dir)?;
        }
        let paths = writer.write_pages(&rendered)?;

        info!("Build complete: {} pages, {} articles", paths.len(), articles);
        Ok(BuildReport {
            pages: paths
                .into_iter()
                .zip(rendered.iter())
                .map(|(path, page)| PageSummary {
                    path,
                    articles: page.articles,
                })
                .collect(),
            feeds_ok,
            failed_feeds,
            articles,
        })
    }

    /// Fetch and parse every source. Failures are recorded per feed; the
    /// outcomes come back in configuration order regardless of completion order.
    pub async fn fetch_all(&self, sources: &[FeedSource]) -> FetchReport {
        let parser = FeedParser::new(self.config.fetch.entries_per_feed);
        let concurrency = self.config.fetch.concurrency.max(1);

        let outcomes = stream::iter(sources.iter().cloned())
            .map(|source| {
                let parser = &parser;
                async move {
                    info!("Fetching: {} ({})", source.url, source.category);
                    let result = match self.fetcher.fetch(&source).await {
                        Ok(body) => parser.parse_feed(&body, &source),
                        Err(e) => Err(e),
                    };
                    if let Err(e) = &result {
                        warn!("Skipping feed {}: {}", source.url, e);
                    }
                    FeedOutcome { source, result }
                }
            })
            .buffered(concurrency)
            .collect::<Vec<_>>()
            .await;

        FetchReport { outcomes }
    }

    fn summarize_pages(&self, pages: &mut [CategoryPage]) -> Result<()> {
        let summarizer = Summarizer::new(self.config.summary.clone())?;
        for page in pages.iter_mut() {
            for article in page.articles.iter_mut() {
                summarizer.summarize_article(article);
                let image = copyright_safe_image(article.image.as_deref(), &page.meta.slug);
                article.image = Some(image);
            }
        }
        Ok(())
    }
}
