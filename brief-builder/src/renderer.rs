use crate::images;
use crate::template::{Slots, Template};
use crate::types::{Article, CategoryPage, MetaConfig, PageMeta, Result, TemplateKind};
use crate::utils::time::format_date;
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::debug;

/// Slots every page template must contain.
pub const REQUIRED_PAGE_SLOTS: &[&str] = &["cards"];

#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub file_name: String,
    pub html: String,
    pub articles: usize,
}

#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub home: Template,
    pub category: Template,
    pub card: Template,
}

impl TemplateSet {
    pub fn load(dir: &Path) -> Result<Self> {
        let home = Template::load(&dir.join(TemplateKind::Home.file_name()))?;
        let category = Template::load(&dir.join(TemplateKind::Category.file_name()))?;
        let card = Template::load(&dir.join(TemplateKind::Card.file_name()))?;

        home.require(REQUIRED_PAGE_SLOTS)?;
        category.require(REQUIRED_PAGE_SLOTS)?;

        Ok(Self { home, category, card })
    }

    fn get(&self, kind: TemplateKind) -> &Template {
        match kind {
            TemplateKind::Home => &self.home,
            TemplateKind::Category => &self.category,
            TemplateKind::Card => &self.card,
        }
    }
}

/// Fills page templates from aggregated articles and site metadata.
pub struct PageRenderer<'a> {
    templates: &'a TemplateSet,
    meta: &'a MetaConfig,
    generated_at: Option<DateTime<Utc>>,
}

impl<'a> PageRenderer<'a> {
    pub fn new(
        templates: &'a TemplateSet,
        meta: &'a MetaConfig,
        generated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            templates,
            meta,
            generated_at,
        }
    }

    fn category_slug(&self, category: &str) -> String {
        self.meta
            .category(category)
            .map(|m| m.slug.clone())
            .unwrap_or_default()
    }

    pub fn render_card(&self, article: &Article) -> Result<String> {
        let slug = self.category_slug(&article.category);
        let image = article
            .image
            .clone()
            .unwrap_or_else(|| images::fallback_image(&slug).to_string());

        let slots = Slots::new()
            .text("title", &article.title)
            .text("link", &article.link)
            .text("source", &article.source)
            .text("date", format_date(article.published))
            .text("summary", &article.summary)
            .text("image", image)
            .text("category", &article.category)
            .text("category_slug", slug);

        self.templates.get(TemplateKind::Card).render(&slots)
    }

    fn render_cards(&self, articles: &[Article]) -> Result<String> {
        let cards = articles
            .iter()
            .map(|a| self.render_card(a))
            .collect::<Result<Vec<_>>>()?;
        Ok(cards.join("\n"))
    }

    fn page_slots(&self, page_meta: &PageMeta, cards_html: String, card_count: usize) -> Slots {
        let (generated_at, year) = match self.generated_at {
            Some(ts) => (ts.to_rfc3339(), ts.format("%Y").to_string()),
            None => (String::new(), String::new()),
        };

        Slots::new()
            .text("site.title", &self.meta.home.title)
            .text("site.description", &self.meta.home.description)
            .text("meta.title", &page_meta.title)
            .text("meta.description", &page_meta.description)
            .text("meta.h1", &page_meta.h1)
            .text("meta.h2", &page_meta.h2)
            .text("meta.slug", &page_meta.slug)
            .html("cards", cards_html)
            .text("card_count", card_count.to_string())
            .text("generated_at", generated_at)
            .text("year", year)
    }

    pub fn render_home(&self, cards: &[Article]) -> Result<RenderedPage> {
        let slots = self.page_slots(&self.meta.home, self.render_cards(cards)?, cards.len());
        let html = self.templates.get(TemplateKind::Home).render(&slots)?;
        debug!("Rendered index.html ({} cards)", cards.len());

        Ok(RenderedPage {
            file_name: "index.html".to_string(),
            html,
            articles: cards.len(),
        })
    }

    pub fn render_category(&self, page: &CategoryPage) -> Result<RenderedPage> {
        let slots = self
            .page_slots(&page.meta, self.render_cards(&page.articles)?, page.articles.len())
            .text("category", &page.name);
        let html = self.templates.get(page.template).render(&slots)?;
        debug!("Rendered {} ({} cards)", page.file_name(), page.articles.len());

        Ok(RenderedPage {
            file_name: page.file_name(),
            html,
            articles: page.articles.len(),
        })
    }
}
