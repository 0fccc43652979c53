mod common;

use brief_builder::config::{category_order, load_feeds, load_meta};
use brief_builder::images::{
    copyright_safe_image, fallback_image, is_safe_image, DEFAULT_FALLBACK_IMAGE,
};
use brief_builder::utils::{slugify, text, url as link};
use brief_builder::{
    AggregateLimits, Aggregator, Article, BuildError, FeedParser, FeedSource, Slots, Summarizer,
    SummaryConfig, Template,
};
use chrono::{DateTime, Utc};
use common::*;

fn article(link: &str, category: &str, published: Option<DateTime<Utc>>) -> Article {
    Article {
        title: format!("Story at {}", link),
        link: link.to_string(),
        published,
        source: "Test".to_string(),
        description: String::new(),
        summary: String::new(),
        category: category.to_string(),
        image: None,
    }
}

#[test]
fn test_summary_prefers_recurring_topics() {
    let summarizer = Summarizer::new(SummaryConfig::default()).expect("summarizer");
    let body = "Rust compiler release adds faster builds. The weather was sunny. \
                Rust compiler teams praised the faster builds. Lunch was pasta.";

    let summary = summarizer.summarize(body).expect("summary");
    assert_eq!(
        summary,
        "Rust compiler release adds faster builds. Rust compiler teams praised the faster builds."
    );
    assert_eq!(summary, summarizer.summarize(body).expect("summary"));
}

#[test]
fn test_summary_never_exceeds_bound() {
    let long_body = "Chipmakers are racing to build accelerators for large models. ".repeat(20);
    let inputs = [
        long_body.as_str(),
        "Short.",
        "Onewordthatisverylongandkeepsgoingwithoutanyspacesatallforquiteawhile",
        "Accents like café, naïve and 東京 count as single characters here.",
    ];

    for max_chars in [1, 5, 16, 40, 280] {
        let summarizer = Summarizer::new(SummaryConfig {
            max_sentences: 2,
            max_chars,
        })
        .expect("summarizer");
        for input in inputs {
            let summary = summarizer.summarize(input).expect("summary");
            assert!(!summary.is_empty());
            assert!(
                summary.chars().count() <= max_chars,
                "{:?} exceeds {} chars",
                summary,
                max_chars
            );
        }
    }
}

#[test]
fn test_summary_falls_back_to_title() {
    let summarizer = Summarizer::new(SummaryConfig {
        max_sentences: 2,
        max_chars: 20,
    })
    .expect("summarizer");

    assert!(matches!(summarizer.summarize("   "), Err(BuildError::Summarize(_))));

    let mut sparse = article("https://news.example/a", "Gaming", None);
    sparse.title = "Console sales climb again this quarter".to_string();
    summarizer.summarize_article(&mut sparse);

    assert!(!sparse.summary.is_empty());
    assert!(sparse.summary.chars().count() <= 20);
    assert!(sparse.summary.starts_with("Console sales"));
    assert!(sparse.summary.ends_with('…'));
}

#[test]
fn test_sentence_splitting() {
    let summarizer = Summarizer::new(SummaryConfig::default()).expect("summarizer");
    let sentences = summarizer.split_sentences("Hello world! How are you? Fine. \"Quoted.\" Tail");
    assert_eq!(sentences, vec!["Hello world!", "How are you?", "Fine.", "\"Quoted.\"", "Tail"]);
}

#[test]
fn test_template_preserves_static_bytes() {
    let source = "<a href=\"{{ link }}\">{{title}}</a>\n<script>var t = \"{{#raw}} {{ Upper }}\";</script>";
    let template = Template::parse("card", source).expect("parse");
    assert_eq!(template.slot_names(), vec!["link", "title"]);

    let html = template
        .render(
            &Slots::new()
                .text("link", "https://x.example/?a=1&b=2")
                .text("title", "<b>Tom & \"Jerry\"</b>"),
        )
        .expect("render");

    assert_eq!(
        html,
        "<a href=\"https://x.example/?a=1&amp;b=2\">&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;</a>\n\
         <script>var t = \"{{#raw}} {{ Upper }}\";</script>"
    );
}

#[test]
fn test_template_slot_mismatches_are_errors() {
    let template =
        Template::parse("page", "<main>{{ cards }}{{ footer.note }}</main>").expect("parse");

    let missing = template.render(&Slots::new().html("cards", "<li>1</li>"));
    match missing {
        Err(BuildError::Render { template, reason }) => {
            assert_eq!(template, "page");
            assert!(reason.contains("footer.note"));
        }
        other => panic!("expected render error, got {:?}", other),
    }

    let html = template
        .render(&Slots::new().html("cards", "<li>1</li>").text("footer.note", "ok"))
        .expect("render");
    assert_eq!(html, "<main><li>1</li>ok</main>");

    let no_cards = Template::parse("home", "<main></main>").expect("parse");
    assert!(matches!(no_cards.require(&["cards"]), Err(BuildError::Render { .. })));
}

#[test]
fn test_shipped_templates_render() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../site");
    let templates = brief_builder::TemplateSet::load(&dir).expect("shipped templates");
    let meta = load_meta(
        &std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../data/meta.json"),
        &["AI News".to_string()],
    )
    .expect("shipped meta");

    let mut story = article("https://news.example/a", "AI News", day(4));
    story.summary = "A summary.".to_string();
    let renderer = brief_builder::PageRenderer::new(&templates, &meta, None);

    let home = renderer.render_home(&[story]).expect("home renders");
    assert_eq!(home.file_name, "index.html");
    assert!(home.html.contains("A summary."));
    assert!(home.html.contains("March 04, 2025"));
}

#[test]
fn test_deduplicate_keeps_first_link() {
    let articles = vec![
        article("https://news.example/a", "Gaming", day(1)),
        article(" https://news.example/a#top ", "Consumer Tech", day(5)),
        article("https://news.example/b", "Gaming", day(2)),
    ];
    let unique = Aggregator::deduplicate(articles);

    assert_eq!(unique.len(), 2);
    assert_eq!(unique[0].category, "Gaming");
    assert_eq!(unique[1].link, "https://news.example/b");
}

#[test]
fn test_pages_sorted_capped_and_home_selection() {
    let mut meta = load_meta_from_fixture(&["Gaming", "Consumer Tech"]);
    let aggregator = Aggregator::new(AggregateLimits {
        max_per_category: Some(3),
        home_per_category: 2,
        home_max: 3,
    });

    let articles = vec![
        article("https://g.example/1", "Gaming", day(1)),
        article("https://g.example/2", "Gaming", day(8)),
        article("https://g.example/3", "Gaming", None),
        article("https://g.example/4", "Gaming", day(4)),
        article("https://c.example/1", "Consumer Tech", day(6)),
    ];
    let categories = vec!["Gaming".to_string(), "Consumer Tech".to_string(), "Empty".to_string()];
    meta.categories.insert(
        "Empty".to_string(),
        brief_builder::PageMeta {
            title: "Empty".to_string(),
            description: String::new(),
            h1: String::new(),
            h2: String::new(),
            slug: "empty".to_string(),
        },
    );

    let pages = aggregator.build_pages(&categories, &meta, articles).expect("pages");
    assert_eq!(pages.len(), 3);

    let gaming: Vec<&str> = pages[0].articles.iter().map(|a| a.link.as_str()).collect();
    assert_eq!(gaming, vec!["https://g.example/2", "https://g.example/4", "https://g.example/1"]);
    assert_eq!(pages[0].file_name(), "gaming.html");
    assert!(pages[2].articles.is_empty());

    let home = aggregator.select_home(&pages);
    let home: Vec<&str> = home.iter().map(|a| a.link.as_str()).collect();
    assert_eq!(
        home,
        vec!["https://g.example/2", "https://c.example/1", "https://g.example/4"]
    );
}

fn load_meta_from_fixture(categories: &[&str]) -> brief_builder::MetaConfig {
    let site = SiteFixture::new("{}", &meta_json(categories));
    let names: Vec<String> = categories.iter().map(|c| c.to_string()).collect();
    load_meta(&site.path("data/meta.json"), &names).expect("meta")
}

#[test]
fn test_feed_list_formats() {
    let site = SiteFixture::new(
        r#"{"Gaming": ["https://a.example/feed", " https://b.example/rss "], "AI News": ["https://c.example/atom"]}"#,
        "{}",
    );
    let sources = load_feeds(&site.path("data/feeds.json")).expect("map form");
    assert_eq!(
        sources,
        vec![
            FeedSource::new("https://a.example/feed", "Gaming"),
            FeedSource::new("https://b.example/rss", "Gaming"),
            FeedSource::new("https://c.example/atom", "AI News"),
        ]
    );
    assert_eq!(category_order(&sources), vec!["Gaming", "AI News"]);

    site.write(
        "data/feeds.json",
        r#"[{"url": "https://a.example/feed", "category": "Gaming"}, {"url": "https://a.example/feed", "category": "Gaming"}]"#,
    );
    let sources = load_feeds(&site.path("data/feeds.json")).expect("list form");
    assert_eq!(sources.len(), 1);

    site.write("data/feeds.json", "{}");
    assert!(matches!(
        load_feeds(&site.path("data/feeds.json")),
        Err(BuildError::ConfigLoad { .. })
    ));

    site.write("data/feeds.json", "{\"Gaming\": \"not a list\"}");
    assert!(matches!(
        load_feeds(&site.path("data/feeds.json")),
        Err(BuildError::ConfigLoad { .. })
    ));
}

#[test]
fn test_meta_validation() {
    let names = vec!["Startups & Business".to_string()];
    let site = SiteFixture::new("{}", &meta_json(&["Startups & Business"]));
    let meta = load_meta(&site.path("data/meta.json"), &names).expect("meta");
    let startups = meta.category("Startups & Business").expect("category meta");
    assert_eq!(startups.slug, "startups-business");
    assert_eq!(startups.h1, "Startups & Business Headlines");
    assert_eq!(meta.home.title, "The Tech Brief");

    let expect_config_error = |json: &str, needle: &str| {
        site.write("data/meta.json", json);
        match load_meta(&site.path("data/meta.json"), &names) {
            Err(BuildError::ConfigLoad { reason, .. }) => {
                assert!(reason.contains(needle), "{} does not mention {}", reason, needle)
            }
            other => panic!("expected config error, got {:?}", other),
        }
    };

    expect_config_error(r#"{"Startups & Business": {"title": "S"}}"#, "Home");
    expect_config_error(r#"{"Home": {"title": "H"}}"#, "Startups & Business");
    expect_config_error(
        r#"{"Home": {"title": "H"}, "Startups & Business": {"title": "  "}}"#,
        "no title",
    );
    expect_config_error(
        r#"{"Home": {"title": "H"}, "Startups & Business": {"title": "S", "slug": "about"}}"#,
        "reserved",
    );
    expect_config_error(
        r#"{"Home": {"title": "H"}, "Startups & Business": {"title": "S", "slug": "../escape"}}"#,
        "invalid slug",
    );
    expect_config_error("[1, 2]", "object");
    expect_config_error("{not json", "invalid JSON");
}

#[test]
fn test_parser_maps_entries() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
<channel>
  <title>Gadget Wire</title>
  <link>https://gadgets.example/</link>
  <description>Gadgets</description>
  <item>
    <title>Phone launch</title>
    <link>https://gadgets.example/phone</link>
    <pubDate>Tue, 04 Mar 2025 09:30:00 GMT</pubDate>
    <description><![CDATA[<p>A <em>new</em> phone.</p><img src="https://cdn.gadgets.example/phone.jpg">]]></description>
  </item>
  <item>
    <title>No link here</title>
    <description>Dropped.</description>
  </item>
  <item>
    <link>https://gadgets.example/untitled</link>
    <description>Body only.</description>
    <media:content url="https://images.unsplash.com/photo-1.jpg" medium="image" type="image/jpeg"/>
  </item>
  <item>
    <title>Over the cap</title>
    <link>https://gadgets.example/late</link>
  </item>
</channel>
</rss>"#;

    let parser = FeedParser::new(3);
    let source = FeedSource::new("https://gadgets.example/rss", "Mobile & Gadgets");
    let articles = parser.parse_feed(xml, &source).expect("parse");
    assert_eq!(articles.len(), 2);

    let phone = &articles[0];
    assert_eq!(phone.title, "Phone launch");
    assert_eq!(phone.source, "Gadget Wire");
    assert_eq!(phone.category, "Mobile & Gadgets");
    assert_eq!(phone.description, "A new phone.");
    assert_eq!(phone.image.as_deref(), Some("https://cdn.gadgets.example/phone.jpg"));
    assert_eq!(
        phone.published.map(|p| p.to_rfc3339()).as_deref(),
        Some("2025-03-04T09:30:00+00:00")
    );

    let untitled = &articles[1];
    assert_eq!(untitled.title, "Untitled");
    assert_eq!(untitled.image.as_deref(), Some("https://images.unsplash.com/photo-1.jpg"));

    let garbage = parser.parse_feed("<html>nope</html>", &source);
    assert!(matches!(garbage, Err(BuildError::FeedParse { .. })));
}

#[test]
fn test_atom_entry_links_to_alternate_page() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <id>tag:blog.example,1999:blog-1</id>
  <title>Example Blog</title>
  <updated>2025-03-04T10:00:00Z</updated>
  <entry>
    <id>tag:blog.example,1999:blog-1.post-7</id>
    <title>Post with comment links</title>
    <updated>2025-03-04T10:00:00Z</updated>
    <summary>Body text.</summary>
    <link rel="replies" type="application/atom+xml" href="https://blog.example/feeds/7/comments/default"/>
    <link rel="edit" type="application/atom+xml" href="https://www.blogger.com/feeds/1/posts/default/7"/>
    <link rel="self" type="application/atom+xml" href="https://www.blogger.com/feeds/1/posts/default/7"/>
    <link rel="alternate" type="text/html" href="https://blog.example/2025/03/post.html"/>
  </entry>
  <entry>
    <id>tag:blog.example,1999:blog-1.post-8</id>
    <title>Post with a plain link</title>
    <updated>2025-03-03T10:00:00Z</updated>
    <link rel="replies" href="https://blog.example/feeds/8/comments/default"/>
    <link href="https://blog.example/2025/03/plain.html"/>
  </entry>
</feed>"#;

    let source = FeedSource::new("https://blog.example/feeds/posts/default", "Consumer Tech");
    let articles = FeedParser::new(12).parse_feed(xml, &source).expect("parse");

    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].link, "https://blog.example/2025/03/post.html");
    assert_eq!(articles[0].source, "Example Blog");
    assert_eq!(articles[1].link, "https://blog.example/2025/03/plain.html");
}

#[test]
fn test_image_licensing() {
    assert!(is_safe_image("https://images.unsplash.com/photo-1?w=800"));
    assert!(is_safe_image("https://www.apple.com/newsroom/images/product/iphone.jpg"));
    assert!(!is_safe_image("https://www.apple.com/store/iphone.jpg"));
    assert!(!is_safe_image("https://cdn.gadgets.example/phone.jpg"));
    assert!(!is_safe_image("not a url"));

    assert_eq!(
        copyright_safe_image(Some("https://cdn.pixabay.com/a.png"), "gaming"),
        "https://cdn.pixabay.com/a.png"
    );
    assert_eq!(
        copyright_safe_image(Some("https://cdn.gadgets.example/phone.jpg"), "gaming"),
        fallback_image("gaming")
    );
    assert_eq!(copyright_safe_image(None, "unknown-slug"), DEFAULT_FALLBACK_IMAGE);
}

#[test]
fn test_text_utilities() {
    assert_eq!(slugify("Startups & Business"), "startups-business");
    assert_eq!(slugify("EVs & Automotive"), "evs-automotive");
    assert_eq!(slugify("  Café Tech!  "), "cafe-tech");

    assert_eq!(text::truncate_chars("short", 10), "short");
    assert_eq!(text::truncate_chars("one two three four", 10), "one two…");
    assert_eq!(text::truncate_chars("abcdefghij", 4), "abc…");
    assert_eq!(text::clean_html("<p>Hello <b>world</b>!</p>\n<p>Again</p>"), "Hello world! Again");

    assert_eq!(link::normalize_link(" https://a.example/x#frag "), "https://a.example/x");
    assert!(link::is_valid_feed_url("https://a.example/feed"));
    assert!(!link::is_valid_feed_url("ftp://a.example/feed"));
}
