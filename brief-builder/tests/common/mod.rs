#![allow(dead_code)]

use async_trait::async_trait;
use brief_builder::{BuildConfig, BuildError, FeedSource, FetchFeed, Result};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const CARD_TEMPLATE: &str =
    "<li data-ts=\"{{ date }}\"><a href=\"{{ link }}\">{{ title }}</a> <em>{{ source }}</em> <p>{{ summary }}</p></li>";

pub const HOME_TEMPLATE: &str = "<!DOCTYPE html>\n<html><head><title>{{ meta.title }}</title>\
<script>var tpl = \"{{#raw}} {{ Upper }}\";</script></head>\n<body><h1>{{ site.title }}</h1>\n<ul>\n{{ cards }}\n</ul>\n\
<footer>{{ generated_at }}</footer></body></html>\n";

pub const CATEGORY_TEMPLATE: &str = "<!DOCTYPE html>\n<html><head><title>{{ meta.title }}</title></head>\n\
<body><h1>{{ meta.h1 }}</h1><h2>{{ category }}</h2>\n<ul>\n{{ cards }}\n</ul>\n</body></html>\n";

pub struct Item {
    pub title: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
    pub description: String,
}

pub fn item(title: &str, link: &str, published: Option<DateTime<Utc>>, description: &str) -> Item {
    Item {
        title: title.to_string(),
        link: link.to_string(),
        published,
        description: description.to_string(),
    }
}

pub fn day(d: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2025, 3, d, 10, 0, 0).single()
}

pub fn rss_feed(title: &str, items: &[Item]) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\"><channel>\
         <title>{}</title><link>https://example.com/</link><description>test</description>\n",
        title
    );
    for item in items {
        xml.push_str("<item>");
        xml.push_str(&format!("<title>{}</title><link>{}</link>", item.title, item.link));
        if let Some(ts) = item.published {
            xml.push_str(&format!("<pubDate>{}</pubDate>", ts.to_rfc2822()));
        }
        xml.push_str(&format!("<description><![CDATA[{}]]></description>", item.description));
        xml.push_str("</item>\n");
    }
    xml.push_str("</channel></rss>\n");
    xml
}

/// In-memory feeds keyed by URL; unknown URLs fail like an HTTP 500.
#[derive(Default)]
pub struct StaticFetcher {
    bodies: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(mut self, url: &str, body: impl Into<String>) -> Self {
        self.bodies.insert(url.to_string(), body.into());
        self
    }
}

#[async_trait]
impl FetchFeed for StaticFetcher {
    async fn fetch(&self, source: &FeedSource) -> Result<String> {
        self.bodies
            .get(&source.url)
            .cloned()
            .ok_or_else(|| BuildError::FeedFetch {
                url: source.url.clone(),
                reason: "HTTP 500: Internal Server Error".to_string(),
            })
    }
}

/// A scratch site: data files, templates and an output directory.
pub struct SiteFixture {
    pub dir: TempDir,
}

impl SiteFixture {
    pub fn new(feeds_json: &str, meta_json: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let fixture = Self { dir };
        fixture.write("data/feeds.json", feeds_json);
        fixture.write("data/meta.json", meta_json);
        fixture.write("templates/template_home.html", HOME_TEMPLATE);
        fixture.write("templates/template_category.html", CATEGORY_TEMPLATE);
        fixture.write("templates/template_card.html", CARD_TEMPLATE);
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture dir");
        }
        fs::write(path, contents).expect("write fixture file");
    }

    pub fn read_out(&self, name: &str) -> String {
        fs::read_to_string(self.path("out").join(name)).expect("read output page")
    }

    pub fn config(&self) -> BuildConfig {
        BuildConfig {
            feeds_path: self.path("data/feeds.json"),
            meta_path: self.path("data/meta.json"),
            templates_dir: self.path("templates"),
            output_dir: self.path("out"),
            stamp_build_time: false,
            ..BuildConfig::default()
        }
    }
}

pub fn meta_json(categories: &[&str]) -> String {
    let mut entries = vec![
        "\"Home\": {\"title\": \"The Tech Brief\", \"description\": \"Tech news\"}".to_string(),
    ];
    for category in categories {
        entries.push(format!(
            "\"{}\": {{\"title\": \"{} Headlines\", \"description\": \"About {}\"}}",
            category, category, category
        ));
    }
    format!("{{{}}}", entries.join(", "))
}

/// Byte offset of `needle` in `haystack`, panicking with context if absent.
pub fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("'{}' not found in output", needle))
}
