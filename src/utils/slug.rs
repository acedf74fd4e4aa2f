// Slugs and short curriculum identifiers

use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use uuid::Uuid;

lazy_static! {
    static ref NON_ALPHANUMERIC: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

const SHORT_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SHORT_ID_LENGTH: usize = 9;
const MAX_SLUG_BASE: usize = 80;

/// Lowercase, dash-separated form of a title. Never starts or ends with a dash.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let dashed = NON_ALPHANUMERIC.replace_all(&lowered, "-");
    let trimmed = dashed.trim_matches('-');

    let mut slug: String = trimmed.chars().take(MAX_SLUG_BASE).collect();
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Unique slug for a document: the title slug plus the first 8 hex chars of its id
pub fn slug_with_id(title: &str, id: Uuid) -> String {
    let base = slugify(title);
    let suffix = &id.simple().to_string()[..8];
    if base.is_empty() {
        format!("item-{}", suffix)
    } else {
        format!("{}-{}", base, suffix)
    }
}

/// Random 9-character lowercase alphanumeric id used for modules, lessons and resources
pub fn generate_short_id() -> String {
    let mut rng = rand::thread_rng();
    (0..SHORT_ID_LENGTH)
        .map(|_| SHORT_ID_ALPHABET[rng.gen_range(0..SHORT_ID_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Rust for Web Developers!"), "rust-for-web-developers");
        assert_eq!(slugify("  --Hello,   World--  "), "hello-world");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slug_with_id_uses_id_prefix() {
        let id = Uuid::parse_str("0f8fad5b-d9cb-469f-a165-70867728950e").unwrap();
        assert_eq!(slug_with_id("Intro to Axum", id), "intro-to-axum-0f8fad5b");
        assert_eq!(slug_with_id("???", id), "item-0f8fad5b");
    }

    #[test]
    fn test_long_titles_are_capped() {
        let title = "word ".repeat(50);
        let slug = slugify(&title);
        assert!(slug.len() <= MAX_SLUG_BASE);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_generate_short_id() {
        let id = generate_short_id();
        assert_eq!(id.len(), 9);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(generate_short_id(), generate_short_id());
    }
}
