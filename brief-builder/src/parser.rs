use crate::images;
use crate::types::{Article, BuildError, FeedSource, Result};
use crate::utils::text;
use chrono::{DateTime, Utc};
use feed_rs::model::Link;
use feed_rs::parser;
use tracing::{debug, info};

/// Turns raw RSS/Atom documents into [`Article`] records for one category.
pub struct FeedParser {
    entries_per_feed: usize,
}

impl FeedParser {
    pub fn new(entries_per_feed: usize) -> Self {
        Self { entries_per_feed }
    }

    pub fn parse_feed(&self, content: &str, source: &FeedSource) -> Result<Vec<Article>> {
        debug!("Parsing feed {} ({} bytes)", source.url, content.len());

        let parse_error = |reason: String| BuildError::FeedParse {
            url: source.url.clone(),
            reason,
        };

        if !Self::is_valid_feed_content(content) {
            return Err(parse_error("Content is not an RSS/Atom document".to_string()));
        }

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| parse_error(format!("Failed to parse feed: {}", e)))?;

        let source_name = feed
            .title
            .map(|t| text::collapse_whitespace(&t.content))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());

        let articles: Vec<Article> = feed
            .entries
            .into_iter()
            .take(self.entries_per_feed)
            .filter_map(|entry| Self::parse_entry(entry, &source_name, &source.category))
            .collect();

        info!("Parsed {} articles from {}", articles.len(), source.url);

        Ok(articles)
    }

    fn parse_entry(
        entry: feed_rs::model::Entry,
        source_name: &str,
        category: &str,
    ) -> Option<Article> {
        let Some(link) = Self::article_link(&entry.links) else {
            debug!("Skipping entry without link: {}", entry.id);
            return None;
        };

        let title = entry
            .title
            .as_ref()
            .map(|t| text::clean_html(&t.content))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Untitled".to_string());

        let image = images::first_image(&entry);

        // Prefer the summary; fall back to the full body
        let raw_description = entry
            .summary
            .as_ref()
            .map(|s| s.content.clone())
            .filter(|s| !s.trim().is_empty())
            .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
            .unwrap_or_default();

        let published: Option<DateTime<Utc>> = entry
            .published
            .or(entry.updated)
            .map(|dt| dt.with_timezone(&Utc));

        Some(Article {
            title,
            link,
            published,
            source: source_name.to_string(),
            description: text::clean_html(&raw_description),
            summary: String::new(),
            category: category.to_string(),
            image,
        })
    }

    /// The page an entry points at: an `alternate` (or untyped) link first,
    /// then anything that is not an enclosure. Atom entries often list
    /// `replies`, `edit` and `self` links ahead of the article itself.
    fn article_link(links: &[Link]) -> Option<String> {
        let usable = |l: &&Link| !l.href.trim().is_empty();
        links
            .iter()
            .filter(usable)
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or_else(|| {
                links.iter().filter(usable).find(|l| {
                    !matches!(l.rel.as_deref(), Some("enclosure" | "replies" | "edit" | "self"))
                })
            })
            .or_else(|| links.iter().find(usable))
            .map(|l| l.href.trim().to_string())
    }

    /// Cheap sniff for RSS/Atom markers before handing the body to the XML parser.
    pub fn is_valid_feed_content(content: &str) -> bool {
        let content_lower = content.to_lowercase();

        content_lower.contains("<rss")
            || content_lower.contains("<feed")
            || content_lower.contains("<rdf:rdf")
            || content_lower.contains("<channel")
    }
}
