use crate::utils::{html, url as url_utils};
use feed_rs::model::Entry;
use url::Url;

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp", ".gif"];

/// Hosts (optionally with a path prefix) whose images are licensed for reuse.
const SAFE_IMAGE_SOURCES: &[&str] = &[
    "images.unsplash.com",
    "images.pexels.com",
    "cdn.pixabay.com",
    "upload.wikimedia.org",
    "apple.com/newsroom/images",
    "samsung.com/press",
    "google.com/press",
];

/// Curated Unsplash images keyed by category slug.
const CATEGORY_FALLBACK_IMAGES: &[(&str, &str)] = &[
    (
        "ai-news",
        "https://images.unsplash.com/photo-1677442135703-1787eea5ce01?w=800&auto=format&fit=crop",
    ),
    (
        "enterprise-tech",
        "https://images.unsplash.com/photo-1486312338219-ce68d2c6f44d?w=800&auto=format&fit=crop",
    ),
    (
        "cybersecurity-updates",
        "https://images.unsplash.com/photo-1550751827-4bd374c3f58b?w=800&auto=format&fit=crop",
    ),
    (
        "mobile-gadgets",
        "https://images.unsplash.com/photo-1511707171634-5f897ff02aa9?w=800&auto=format&fit=crop",
    ),
    (
        "consumer-tech",
        "https://images.unsplash.com/photo-1498049794561-7780e7231661?w=800&auto=format&fit=crop",
    ),
    (
        "broadcast-tech",
        "https://images.unsplash.com/photo-1478737270239-2f02b77fc618?w=800&auto=format&fit=crop",
    ),
    (
        "gaming",
        "https://images.unsplash.com/photo-1538481199705-c710c4e965fc?w=800&auto=format&fit=crop",
    ),
    (
        "evs-automotive",
        "https://images.unsplash.com/photo-1593941707882-a5bba14938c7?w=800&auto=format&fit=crop",
    ),
    (
        "startups-business",
        "https://images.unsplash.com/photo-1559136555-9303baea8ebd?w=800&auto=format&fit=crop",
    ),
];

pub const DEFAULT_FALLBACK_IMAGE: &str =
    "https://images.unsplash.com/photo-1518770660439-4636190af475?w=800&auto=format&fit=crop";

fn looks_like_image(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => {
            let path = url.path().to_lowercase();
            IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
        }
        Err(_) => false,
    }
}

/// First image an entry references, in order of preference: media content,
/// media thumbnails, image enclosures, `<img>` in the content body, `<img>`
/// in the summary.
pub fn first_image(entry: &Entry) -> Option<String> {
    for media in &entry.media {
        for content in &media.content {
            if let Some(url) = &content.url {
                let is_image_type = content
                    .content_type
                    .as_ref()
                    .map(|m| m.type_().as_str() == "image")
                    .unwrap_or(false);
                if is_image_type || looks_like_image(url.as_str()) {
                    return Some(url.to_string());
                }
            }
        }
    }

    for media in &entry.media {
        if let Some(thumb) = media.thumbnails.first() {
            if looks_like_image(&thumb.image.uri) {
                return Some(thumb.image.uri.clone());
            }
        }
    }

    for link in &entry.links {
        if link.rel.as_deref() != Some("enclosure") {
            continue;
        }
        let typed_image = link
            .media_type
            .as_deref()
            .map(|t| t.contains("image"))
            .unwrap_or(false);
        if typed_image || looks_like_image(&link.href) {
            return Some(link.href.clone());
        }
    }

    if let Some(body) = entry.content.as_ref().and_then(|c| c.body.as_deref()) {
        if let Some(src) = html::first_img_src(body) {
            return Some(src);
        }
    }

    entry
        .summary
        .as_ref()
        .and_then(|s| html::first_img_src(&s.content))
}

/// Whether the image comes from a copyright-safe source.
pub fn is_safe_image(candidate: &str) -> bool {
    let Ok(url) = Url::parse(candidate) else {
        return false;
    };
    let Some(host) = url_utils::extract_host(candidate) else {
        return false;
    };
    let path = url.path();

    SAFE_IMAGE_SOURCES.iter().any(|source| {
        let (domain, prefix) = match source.split_once('/') {
            Some((d, p)) => (d, Some(p)),
            None => (*source, None),
        };
        let host_ok = host == domain || host.ends_with(&format!(".{}", domain));
        let path_ok = prefix
            .map(|p| path.trim_start_matches('/').starts_with(p))
            .unwrap_or(true);
        host_ok && path_ok
    })
}

pub fn fallback_image(category_slug: &str) -> &'static str {
    CATEGORY_FALLBACK_IMAGES
        .iter()
        .find(|(slug, _)| *slug == category_slug)
        .map(|(_, url)| *url)
        .unwrap_or(DEFAULT_FALLBACK_IMAGE)
}

/// Keep the image if licensed, otherwise substitute the category fallback.
pub fn copyright_safe_image(candidate: Option<&str>, category_slug: &str) -> String {
    match candidate {
        Some(url) if is_safe_image(url) => url.to_string(),
        _ => fallback_image(category_slug).to_string(),
    }
}
