//! Loading and validation of the build inputs: the feed list, the page
//! metadata and the template set.

use crate::renderer::TemplateSet;
use crate::types::{BuildConfig, BuildError, FeedSource, MetaConfig, PageMeta, Result};
use crate::utils::{slugify, url::is_valid_feed_url};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Key of the home page entry in `meta.json`.
pub const HOME_KEY: &str = "Home";

/// Output names owned by the home page or by hand-authored pages.
const RESERVED_SLUGS: &[&str] = &[
    "index",
    "about",
    "contact",
    "how-to",
    "template_home",
    "template_category",
    "template_card",
];

#[derive(Deserialize)]
#[serde(untagged)]
enum FeedFile {
    /// `[{"url": "...", "category": "..."}]`
    Entries(Vec<FeedSource>),
    /// `{"AI News": ["https://...", ...]}`
    ByCategory(Map<String, Value>),
}

/// Everything loaded from disk before the first network request.
#[derive(Debug, Clone)]
pub struct SiteInputs {
    pub sources: Vec<FeedSource>,
    /// Categories in the order they first appear in the feed list.
    pub categories: Vec<String>,
    pub meta: MetaConfig,
    pub templates: TemplateSet,
}

impl SiteInputs {
    pub fn load(config: &BuildConfig) -> Result<Self> {
        let sources = load_feeds(&config.feeds_path)?;
        let categories = category_order(&sources);
        let meta = load_meta(&config.meta_path, &categories)?;
        let templates = TemplateSet::load(&config.templates_dir)?;

        info!(
            "Loaded {} feeds across {} categories",
            sources.len(),
            categories.len()
        );
        Ok(Self {
            sources,
            categories,
            meta,
            templates,
        })
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .map_err(|e| BuildError::config(path, format!("cannot read file: {}", e)))?;
    serde_json::from_str(&raw).map_err(|e| BuildError::config(path, format!("invalid JSON: {}", e)))
}

pub fn load_feeds(path: &Path) -> Result<Vec<FeedSource>> {
    let file: FeedFile = serde_json::from_value(read_json(path)?).map_err(|e| {
        BuildError::config(
            path,
            format!("expected a category map or a list of {{url, category}}: {}", e),
        )
    })?;

    let sources = match file {
        FeedFile::Entries(entries) => entries,
        FeedFile::ByCategory(map) => {
            let mut sources = Vec::new();
            for (category, urls) in map {
                let urls: Vec<String> = serde_json::from_value(urls).map_err(|e| {
                    BuildError::config(
                        path,
                        format!("category '{}' must list feed URLs: {}", category, e),
                    )
                })?;
                sources.extend(urls.into_iter().map(|url| FeedSource::new(url, category.clone())));
            }
            sources
        }
    };

    parse_sources(path, sources)
}

fn parse_sources(path: &Path, sources: Vec<FeedSource>) -> Result<Vec<FeedSource>> {
    if sources.is_empty() {
        return Err(BuildError::config(path, "no feeds configured"));
    }

    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(sources.len());
    for source in sources {
        let source = FeedSource::new(source.url.trim(), source.category.trim());
        if source.category.is_empty() {
            return Err(BuildError::config(
                path,
                format!("feed {} has an empty category", source.url),
            ));
        }
        if !is_valid_feed_url(&source.url) {
            warn!("Feed URL does not look like http(s): {}", source.url);
        }
        if !seen.insert((source.url.clone(), source.category.clone())) {
            debug!("Ignoring repeated feed {} in {}", source.url, source.category);
            continue;
        }
        unique.push(source);
    }
    Ok(unique)
}

pub fn category_order(sources: &[FeedSource]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for source in sources {
        if !categories.contains(&source.category) {
            categories.push(source.category.clone());
        }
    }
    categories
}

fn page_meta(path: &Path, key: &str, value: Value) -> Result<PageMeta> {
    let mut meta: PageMeta = serde_json::from_value(value)
        .map_err(|e| BuildError::config(path, format!("entry '{}' is malformed: {}", key, e)))?;

    if meta.title.trim().is_empty() {
        return Err(BuildError::config(path, format!("entry '{}' has no title", key)));
    }
    if meta.h1.is_empty() {
        meta.h1 = meta.title.clone();
    }
    Ok(meta)
}

/// Load `meta.json`. The home entry and an entry for every category in
/// `categories` are mandatory, each with a non-empty title.
pub fn load_meta(path: &Path, categories: &[String]) -> Result<MetaConfig> {
    let Value::Object(mut map) = read_json(path)? else {
        return Err(BuildError::config(path, "expected a JSON object"));
    };

    let home_value = map
        .remove(HOME_KEY)
        .ok_or_else(|| BuildError::config(path, format!("missing '{}' entry", HOME_KEY)))?;
    let home = page_meta(path, HOME_KEY, home_value)?;

    let mut category_meta = BTreeMap::new();
    let mut slugs = HashSet::new();
    for category in categories {
        let value = map.remove(category).ok_or_else(|| {
            BuildError::config(path, format!("missing entry for category '{}'", category))
        })?;
        let mut meta = page_meta(path, category, value)?;

        if meta.slug.is_empty() {
            meta.slug = slugify(category);
        }
        validate_slug(path, category, &meta.slug)?;
        if !slugs.insert(meta.slug.clone()) {
            return Err(BuildError::config(
                path,
                format!("slug '{}' is used by more than one category", meta.slug),
            ));
        }
        category_meta.insert(category.clone(), meta);
    }

    for unused in map.keys() {
        debug!("meta entry '{}' has no feeds; no page will be built", unused);
    }

    Ok(MetaConfig {
        home,
        categories: category_meta,
    })
}

fn validate_slug(path: &Path, category: &str, slug: &str) -> Result<()> {
    let well_formed = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !well_formed {
        return Err(BuildError::config(
            path,
            format!("category '{}' has an invalid slug '{}'", category, slug),
        ));
    }
    if RESERVED_SLUGS.contains(&slug) {
        return Err(BuildError::config(
            path,
            format!("category '{}' uses reserved slug '{}'", category, slug),
        ));
    }
    Ok(())
}
