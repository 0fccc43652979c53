use deunicode::deunicode;
use scraper::{Html, Selector};

/// Check if a word is a common stop word
pub fn is_stop_word(word: &str) -> bool {
    matches!(
        word,
        "the" | "and" | "or" | "but" | "in" | "on" | "at" | "to" | "for" | "of" | "with" | "by" |
        "a" | "an" | "is" | "are" | "was" | "were" | "be" | "been" | "have" | "has" | "had" |
        "do" | "does" | "did" | "will" | "would" | "could" | "should" | "may" | "might" | "must" |
        "can" | "this" | "that" | "these" | "those" | "it" | "its" | "as" | "from" | "than" |
        "into" | "about" | "after" | "over" | "says" | "said" | "new" | "more" | "also" | "not"
    )
}

/// Lowercase ASCII slug: `"Startups & Business"` becomes `"startups-business"`.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode(text).to_lowercase();
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Text processing utilities
pub mod text {
    use super::*;

    /// Strip markup and collapse whitespace.
    pub fn clean_html(html: &str) -> String {
        if !html.contains('<') && !html.contains('&') {
            return collapse_whitespace(html);
        }
        let fragment = Html::parse_fragment(html);
        let joined = fragment.root_element().text().collect::<Vec<_>>().join(" ");
        tidy_punctuation(&collapse_whitespace(&joined))
    }

    /// Text nodes are joined with spaces, which leaves `word .` behind
    /// wherever markup closed right before punctuation.
    fn tidy_punctuation(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if c == ' ' && matches!(chars.peek(), Some('.' | ',' | '!' | '?' | ';' | ':' | ')')) {
                continue;
            }
            out.push(c);
        }
        out
    }

    pub fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Truncate to at most `max_chars` characters, breaking at a word boundary
    /// and ending with an ellipsis that counts against the limit.
    pub fn truncate_chars(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            return text.to_string();
        }
        if max_chars == 0 {
            return String::new();
        }

        let budget = max_chars - 1;
        let cut: String = text.chars().take(budget).collect();
        let kept = match cut.rfind(' ') {
            Some(idx) if idx > 0 => cut[..idx].trim_end(),
            _ => cut.as_str(),
        };
        format!("{}…", kept)
    }

    /// Lowercased alphanumeric tokens.
    pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .filter(|w| !w.is_empty())
    }
}

/// HTML inspection helpers
pub mod html {
    use super::*;

    /// First usable image URL referenced by an `<img>` tag in the fragment.
    pub fn first_img_src(html: &str) -> Option<String> {
        if !html.contains("<img") {
            return None;
        }
        let selector = Selector::parse("img").ok()?;
        let fragment = Html::parse_fragment(html);

        fragment.select(&selector).find_map(|img| {
            let el = img.value();
            ["src", "data-src", "data-original"]
                .iter()
                .find_map(|attr| el.attr(attr).filter(|v| !v.trim().is_empty()))
                .map(|v| v.trim().to_string())
                .or_else(|| {
                    el.attr("srcset")
                        .and_then(|set| set.split_whitespace().next())
                        .map(|s| s.trim_end_matches(',').to_string())
                })
        })
    }
}

/// URL utilities
pub mod url {
    use url::Url;

    /// Extract host from URL, without a leading `www.`
    pub fn extract_host(url_str: &str) -> Option<String> {
        let url = Url::parse(url_str).ok()?;
        let host = url.host_str()?.to_lowercase();
        Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
    }

    /// Validate feed URL format
    pub fn is_valid_feed_url(url_str: &str) -> bool {
        if let Ok(url) = Url::parse(url_str) {
            url.scheme() == "http" || url.scheme() == "https"
        } else {
            false
        }
    }

    /// Key used to decide whether two links point at the same article:
    /// surrounding whitespace and any `#fragment` are ignored.
    pub fn normalize_link(link: &str) -> String {
        let trimmed = link.trim();
        match Url::parse(trimmed) {
            Ok(mut url) => {
                url.set_fragment(None);
                url.to_string()
            }
            Err(_) => trimmed.split('#').next().unwrap_or(trimmed).to_string(),
        }
    }
}

/// Time utilities
pub mod time {
    use chrono::{DateTime, Utc};

    /// `March 04, 2025`; empty for undated articles.
    pub fn format_date(published: Option<DateTime<Utc>>) -> String {
        published
            .map(|ts| ts.format("%B %d, %Y").to_string())
            .unwrap_or_default()
    }
}
