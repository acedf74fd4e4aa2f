// Pure normalizers for embedded arrays, applied before persistence

pub mod content;
pub mod modules;
pub mod packages;

pub use content::{sanitize_faqs, sanitize_features, sanitize_tags, sanitize_testimonials};
pub use modules::{normalize_modules, validate_modules};
pub use packages::sanitize_packages;
