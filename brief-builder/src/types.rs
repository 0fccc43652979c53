use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A feed URL and the category its articles are routed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub url: String,
    pub category: String,
}

impl FeedSource {
    pub fn new(url: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            category: category.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
    /// Title of the feed the article came from.
    pub source: String,
    /// Plain text, HTML already stripped.
    pub description: String,
    pub summary: String,
    pub category: String,
    pub image: Option<String>,
}

/// Per-page metadata from `meta.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub h1: String,
    #[serde(default)]
    pub h2: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaConfig {
    pub home: PageMeta,
    pub categories: BTreeMap<String, PageMeta>,
}

impl MetaConfig {
    pub fn category(&self, name: &str) -> Option<&PageMeta> {
        self.categories.get(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Home,
    Category,
    Card,
}

impl TemplateKind {
    pub fn file_name(self) -> &'static str {
        match self {
            TemplateKind::Home => "template_home.html",
            TemplateKind::Category => "template_category.html",
            TemplateKind::Card => "template_card.html",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryPage {
    pub name: String,
    pub meta: PageMeta,
    pub articles: Vec<Article>,
    pub template: TemplateKind,
}

impl CategoryPage {
    pub fn file_name(&self) -> String {
        format!("{}.html", self.meta.slug)
    }
}

/// Result of fetching and parsing a single feed.
#[derive(Debug)]
pub struct FeedOutcome {
    pub source: FeedSource,
    pub result: Result<Vec<Article>>,
}

#[derive(Debug, Default)]
pub struct FetchReport {
    pub outcomes: Vec<FeedOutcome>,
}

impl FetchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&FeedSource, &BuildError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.source, e)))
    }

    /// Consumes the report, yielding articles from successful feeds in configuration order.
    pub fn into_articles(self) -> Vec<Article> {
        self.outcomes
            .into_iter()
            .filter_map(|o| o.result.ok())
            .flatten()
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageSummary {
    pub path: PathBuf,
    pub articles: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedFeed {
    pub url: String,
    pub category: String,
    pub error: String,
}

/// What a build run produced.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub pages: Vec<PageSummary>,
    pub feeds_ok: usize,
    pub failed_feeds: Vec<FailedFeed>,
    pub articles: usize,
}

impl BuildReport {
    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| BuildError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
    /// Feeds fetched at once.
    pub concurrency: usize,
    pub entries_per_feed: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "TechBrief-Builder/1.0".to_string(),
            timeout_seconds: 30,
            max_feed_size_mb: 10,
            max_redirects: 5,
            concurrency: 4,
            entries_per_feed: 12,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SummaryConfig {
    pub max_sentences: usize,
    /// Upper bound on summary length, in characters.
    pub max_chars: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_sentences: 2,
            max_chars: 280,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AggregateLimits {
    pub max_per_category: Option<usize>,
    pub home_per_category: usize,
    pub home_max: usize,
}

impl Default for AggregateLimits {
    fn default() -> Self {
        Self {
            max_per_category: None,
            home_per_category: 3,
            home_max: 27,
        }
    }
}

/// Everything a build run needs, passed explicitly into the pipeline.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub feeds_path: PathBuf,
    pub meta_path: PathBuf,
    pub templates_dir: PathBuf,
    pub output_dir: PathBuf,
    pub static_dir: Option<PathBuf>,
    pub fetch: FetchConfig,
    pub summary: SummaryConfig,
    pub limits: AggregateLimits,
    pub stamp_build_time: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            feeds_path: PathBuf::from("data/feeds.json"),
            meta_path: PathBuf::from("data/meta.json"),
            templates_dir: PathBuf::from("site"),
            output_dir: PathBuf::from("docs"),
            static_dir: None,
            fetch: FetchConfig::default(),
            summary: SummaryConfig::default(),
            limits: AggregateLimits::default(),
            stamp_build_time: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Config load error ({path}): {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("Feed fetch error for {url}: {reason}")]
    FeedFetch { url: String, reason: String },

    #[error("Feed parse error for {url}: {reason}")]
    FeedParse { url: String, reason: String },

    #[error("Summarization error: {0}")]
    Summarize(String),

    #[error("Render error in {template}: {reason}")]
    Render { template: String, reason: String },

    #[error("Write error for {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("All {attempted} feeds failed")]
    AllFeedsFailed { attempted: usize },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BuildError {
    pub fn config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        BuildError::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn render(template: impl Into<String>, reason: impl Into<String>) -> Self {
        BuildError::Render {
            template: template.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
