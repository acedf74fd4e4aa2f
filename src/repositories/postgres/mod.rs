// PostgreSQL repositories over diesel-async

mod accounts;
mod posts;
mod products;
pub mod rows;
mod services;

pub use accounts::{PgActivityRepository, PgUserRepository};
pub use posts::PgBlogRepository;
pub use products::PgProductRepository;
pub use services::PgServiceRepository;

/// `%term%` for ILIKE with the wildcard characters in `term` escaped, so the
/// match is a literal substring like the in-memory store.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
