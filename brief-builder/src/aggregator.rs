use crate::types::{
    AggregateLimits, Article, BuildError, CategoryPage, MetaConfig, Result, TemplateKind,
};
use crate::utils::url::normalize_link;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Merges articles from every feed into per-category pages and the home selection.
pub struct Aggregator {
    limits: AggregateLimits,
}

impl Aggregator {
    pub fn new(limits: AggregateLimits) -> Self {
        Self { limits }
    }

    /// Drop articles whose link was already seen, keeping the first occurrence.
    pub fn deduplicate(articles: Vec<Article>) -> Vec<Article> {
        let total = articles.len();
        let mut seen_links = HashSet::new();

        let unique: Vec<Article> = articles
            .into_iter()
            .filter(|article| {
                let fresh = seen_links.insert(normalize_link(&article.link));
                if !fresh {
                    debug!("Removing duplicate entry: {} ({})", article.title, article.link);
                }
                fresh
            })
            .collect();

        let removed_count = total - unique.len();
        if removed_count > 0 {
            info!("Removed {} duplicate entries", removed_count);
        }
        unique
    }

    /// Newest first; undated articles sink to the bottom. The sort is stable,
    /// so equal timestamps keep their feed order.
    pub fn sort_by_recency(articles: &mut [Article]) {
        articles.sort_by_key(|a| Reverse(a.published));
    }

    /// Build one page per category, in `categories` order. Categories with no
    /// surviving articles still get a (empty) page.
    pub fn build_pages(
        &self,
        categories: &[String],
        meta: &MetaConfig,
        articles: Vec<Article>,
    ) -> Result<Vec<CategoryPage>> {
        let mut grouped: HashMap<String, Vec<Article>> = HashMap::new();
        for article in Self::deduplicate(articles) {
            grouped.entry(article.category.clone()).or_default().push(article);
        }

        categories
            .iter()
            .map(|name| {
                let page_meta = meta.category(name).cloned().ok_or_else(|| {
                    BuildError::render(
                        TemplateKind::Category.file_name(),
                        format!("no metadata for category '{}'", name),
                    )
                })?;

                let mut page_articles = grouped.remove(name).unwrap_or_default();
                Self::sort_by_recency(&mut page_articles);
                if let Some(cap) = self.limits.max_per_category {
                    page_articles.truncate(cap);
                }

                debug!("Category {}: {} articles", name, page_articles.len());
                Ok(CategoryPage {
                    name: name.clone(),
                    meta: page_meta,
                    articles: page_articles,
                    template: TemplateKind::Category,
                })
            })
            .collect()
    }

    /// Home page cards: the newest few of each category, merged and re-sorted.
    pub fn select_home(&self, pages: &[CategoryPage]) -> Vec<Article> {
        let mut seen_links = HashSet::new();
        let mut cards: Vec<Article> = pages
            .iter()
            .flat_map(|page| page.articles.iter().take(self.limits.home_per_category))
            .filter(|article| seen_links.insert(normalize_link(&article.link)))
            .cloned()
            .collect();

        Self::sort_by_recency(&mut cards);
        cards.truncate(self.limits.home_max);
        cards
    }
}
