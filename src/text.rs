//! Slug and excerpt derivation for posts and categories.

/// Excerpts derived from content are cut to this many characters.
pub const EXCERPT_MAX_CHARS: usize = 300;

/// Turn a title into a URL-safe slug.
///
/// Lowercases, keeps ASCII alphanumerics, collapses whitespace, underscores
/// and hyphen runs into single hyphens, and drops everything else. Returns an
/// empty string when nothing survives (caller picks a fallback).
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_was_hyphen = true; // suppress leading hyphens

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.extend(ch.to_lowercase());
            last_was_hyphen = false;
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            if !last_was_hyphen {
                slug.push('-');
                last_was_hyphen = true;
            }
        }
        // anything else is dropped
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// A random 8-character slug fallback for titles that slugify to nothing.
pub fn random_slug() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}

/// Strip HTML tags from content, leaving only the text between them.
pub fn strip_html(content: &str) -> String {
    let mut text = String::with_capacity(content.len());
    let mut in_tag = false;

    for ch in content.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => text.push(c),
            _ => {}
        }
    }
    text
}

/// Derive an excerpt from post content: tags stripped, truncated to
/// [`EXCERPT_MAX_CHARS`] characters with a `...` marker when cut.
pub fn make_excerpt(content: &str) -> String {
    let clean = strip_html(content);
    let clean = clean.trim();

    if clean.chars().count() > EXCERPT_MAX_CHARS {
        let truncated: String = clean.chars().take(EXCERPT_MAX_CHARS).collect();
        format!("{}...", truncated)
    } else {
        clean.to_string()
    }
}
