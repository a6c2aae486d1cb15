use inkpress::text::{EXCERPT_MAX_CHARS, make_excerpt, random_slug, slugify, strip_html};

#[test]
fn test_slugify_basic() {
    assert_eq!(slugify("Hello World"), "hello-world");
    assert_eq!(slugify("Rust 2024 Edition"), "rust-2024-edition");
}

#[test]
fn test_slugify_punctuation_dropped() {
    assert_eq!(slugify("Hello, World!"), "hello-world");
    assert_eq!(slugify("What's new?"), "whats-new");
}

#[test]
fn test_slugify_collapses_separators() {
    assert_eq!(slugify("a  b"), "a-b");
    assert_eq!(slugify("a__b--c"), "a-b-c");
    assert_eq!(slugify("  spaced out  "), "spaced-out");
}

#[test]
fn test_slugify_trims_hyphens() {
    assert_eq!(slugify("-leading"), "leading");
    assert_eq!(slugify("trailing-"), "trailing");
}

#[test]
fn test_slugify_non_ascii_dropped() {
    assert_eq!(slugify("café corner"), "caf-corner");
    assert_eq!(slugify("日本語"), "");
}

#[test]
fn test_slugify_empty() {
    assert_eq!(slugify(""), "");
    assert_eq!(slugify("!!!"), "");
}

#[test]
fn test_random_slug_shape() {
    let a = random_slug();
    let b = random_slug();
    assert_eq!(a.len(), 8);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, b);
}

#[test]
fn test_strip_html() {
    assert_eq!(strip_html("<p>Hello</p>"), "Hello");
    assert_eq!(
        strip_html("<a href=\"/x\">link</a> and <b>bold</b>"),
        "link and bold"
    );
    assert_eq!(strip_html("no tags here"), "no tags here");
}

#[test]
fn test_make_excerpt_short_content_untouched() {
    assert_eq!(make_excerpt("A short post."), "A short post.");
}

#[test]
fn test_make_excerpt_strips_and_trims() {
    assert_eq!(make_excerpt("  <p>Trimmed</p>  "), "Trimmed");
}

#[test]
fn test_make_excerpt_truncates() {
    let content = "y".repeat(EXCERPT_MAX_CHARS + 50);
    let excerpt = make_excerpt(&content);
    assert_eq!(excerpt.chars().count(), EXCERPT_MAX_CHARS + 3);
    assert!(excerpt.ends_with("..."));
}

#[test]
fn test_make_excerpt_exact_limit_not_truncated() {
    let content = "z".repeat(EXCERPT_MAX_CHARS);
    let excerpt = make_excerpt(&content);
    assert_eq!(excerpt.len(), EXCERPT_MAX_CHARS);
    assert!(!excerpt.ends_with("..."));
}

#[test]
fn test_make_excerpt_counts_chars_not_bytes() {
    // Multibyte content must not be split mid-character
    let content = "é".repeat(EXCERPT_MAX_CHARS + 10);
    let excerpt = make_excerpt(&content);
    assert_eq!(excerpt.chars().count(), EXCERPT_MAX_CHARS + 3);
}
