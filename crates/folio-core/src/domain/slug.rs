//! Slug, excerpt and tag derivation for posts.

/// Number of content characters kept in a derived excerpt.
pub const EXCERPT_LENGTH: usize = 200;

/// Slugs that collide with fixed routes under `/api/posts` or on the blog host.
pub const RESERVED_SLUGS: &[&str] = &["drafts", "api", "auth", "health"];

/// Whether `slug` would be shadowed by a fixed route.
pub fn is_reserved_slug(slug: &str) -> bool {
    RESERVED_SLUGS.contains(&slug)
}

/// Turn a title into a URL-safe slug.
///
/// ASCII alphanumerics are kept (lowercased); every other run of characters
/// collapses to a single `-`. Leading and trailing separators are dropped.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Use the given excerpt, or fall back to the first characters of the content.
pub fn derive_excerpt(excerpt: Option<&str>, content: &str) -> String {
    match excerpt.map(str::trim) {
        Some(e) if !e.is_empty() => e.to_string(),
        _ => {
            let head: String = content.chars().take(EXCERPT_LENGTH).collect();
            format!("{head}...")
        }
    }
}

/// Trim tags and drop empty ones, preserving order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
