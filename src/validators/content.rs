// Sanitizers for embedded marketing content. Blank entries are dropped,
// text is trimmed and truncated, and list sizes are capped.

use std::collections::HashSet;

use crate::models::{Faq, Feature, Testimonial};
use crate::utils::{clean_text, truncate_chars};

pub const MAX_FEATURES: usize = 20;
pub const MAX_TESTIMONIALS: usize = 20;
pub const MAX_FAQS: usize = 30;
pub const MAX_TAGS: usize = 20;

pub fn sanitize_features(features: Vec<Feature>) -> Vec<Feature> {
    features
        .into_iter()
        .filter_map(|feature| {
            let title = clean_text(Some(&feature.title), 100)?;
            Some(Feature {
                title,
                description: clean_text(Some(&feature.description), 500).unwrap_or_default(),
                icon: clean_text(feature.icon.as_ref(), 50),
            })
        })
        .take(MAX_FEATURES)
        .collect()
}

pub fn sanitize_testimonials(testimonials: Vec<Testimonial>) -> Vec<Testimonial> {
    testimonials
        .into_iter()
        .filter_map(|testimonial| {
            let name = clean_text(Some(&testimonial.name), 100)?;
            let content = clean_text(Some(&testimonial.content), 1000)?;
            Some(Testimonial {
                name,
                role: clean_text(testimonial.role.as_ref(), 100),
                content,
                rating: testimonial.rating.clamp(1, 5),
                avatar: clean_text(testimonial.avatar.as_ref(), 500),
            })
        })
        .take(MAX_TESTIMONIALS)
        .collect()
}

pub fn sanitize_faqs(faqs: Vec<Faq>) -> Vec<Faq> {
    faqs.into_iter()
        .filter_map(|faq| {
            Some(Faq {
                question: clean_text(Some(&faq.question), 300)?,
                answer: clean_text(Some(&faq.answer), 2000)?,
            })
        })
        .take(MAX_FAQS)
        .collect()
}

/// Trimmed, de-duplicated (case-insensitive) tags
pub fn sanitize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter_map(|tag| {
            let tag = truncate_chars(tag.trim(), 30);
            if tag.is_empty() || !seen.insert(tag.to_lowercase()) {
                None
            } else {
                Some(tag)
            }
        })
        .take(MAX_TAGS)
        .collect()
}
