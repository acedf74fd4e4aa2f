// Storage traits for the catalog entities.
//
// Handlers and services only ever see `Store`, which bundles one trait object per
// entity. `postgres` backs them with diesel-async, `memory` with a mutex-guarded Vec.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::db::DieselPool;
use crate::models::{
    Activity, BlogPost, Difficulty, Module, PageRequest, PostStatus, Product, ProductStatus,
    ProductType, Service, ServicePatch, ServiceStatus, ServiceType, User,
};

pub type Result<T> = std::result::Result<T, RepositoryError>;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    /// Unique constraint violated; carries the constraint name when known
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    /// Compare-and-swap on `version` matched no row
    #[error("Record was modified concurrently")]
    VersionConflict,

    #[error("Storage error: {0}")]
    Backend(String),
}

impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::NotFound => RepositoryError::NotFound,
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                RepositoryError::Conflict(
                    info.constraint_name()
                        .map(str::to_string)
                        .unwrap_or_else(|| info.message().to_string()),
                )
            },
            other => RepositoryError::Backend(other.to_string()),
        }
    }
}

impl From<bb8::RunError<diesel_async::pooled_connection::PoolError>> for RepositoryError {
    fn from(err: bb8::RunError<diesel_async::pooled_connection::PoolError>) -> Self {
        RepositoryError::Backend(format!("Connection pool error: {}", err))
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Backend(format!("Malformed JSON column: {}", err))
    }
}

// =============================================================================
// LOOKUP & QUERIES
// =============================================================================

/// Path parameter resolved to either a primary key or a slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    Id(Uuid),
    Slug(String),
}

impl LookupKey {
    pub fn parse(raw: &str) -> Self {
        match Uuid::parse_str(raw) {
            Ok(id) => LookupKey::Id(id),
            Err(_) => LookupKey::Slug(raw.to_string()),
        }
    }

    pub fn matches(&self, id: Uuid, slug: &str) -> bool {
        match self {
            LookupKey::Id(key) => *key == id,
            LookupKey::Slug(key) => key == slug,
        }
    }
}

/// Which non-public records a caller may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Everything,
    PublishedOnly,
    PublishedOrOwner(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    Price,
    Title,
    Enrollments,
    Rating,
}

impl SortField {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "createdAt" => Some(SortField::CreatedAt),
            "price" => Some(SortField::Price),
            "title" => Some(SortField::Title),
            "enrollments" => Some(SortField::Enrollments),
            "rating" => Some(SortField::Rating),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProductSort {
    pub field: SortField,
    pub ascending: bool,
}

#[derive(Debug, Clone)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub product_type: Option<ProductType>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub featured: Option<bool>,
    pub status: Option<ProductStatus>,
    pub visibility: Visibility,
    pub sort: ProductSort,
    pub page: PageRequest,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            search: None,
            product_type: None,
            category: None,
            difficulty: None,
            featured: None,
            status: None,
            visibility: Visibility::PublishedOnly,
            sort: ProductSort::default(),
            page: PageRequest::default(),
        }
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

impl ProductQuery {
    /// Status filter after visibility is applied; anonymous callers only ever see published
    pub fn effective_status(&self) -> Option<ProductStatus> {
        match self.visibility {
            Visibility::PublishedOnly => Some(ProductStatus::Published),
            _ => self.status,
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Visibility::PublishedOrOwner(owner) = self.visibility {
            if !product.is_published() && !product.is_owned_by(owner) {
                return false;
            }
        }
        if let Some(status) = self.effective_status() {
            if product.status != status {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !(contains_ci(&product.title, &needle)
                || contains_ci(&product.description, &needle)
                || contains_ci(&product.category, &needle))
            {
                return false;
            }
        }

        self.product_type.map_or(true, |t| product.product_type == t)
            && self.category.as_ref().map_or(true, |c| &product.category == c)
            && self.difficulty.map_or(true, |d| product.difficulty == d)
            && self.featured.map_or(true, |f| product.featured == f)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServiceQuery {
    pub search: Option<String>,
    pub service_type: Option<ServiceType>,
    pub status: Option<ServiceStatus>,
    pub featured: Option<bool>,
    /// Non-admin callers never see inactive services
    pub hide_inactive: bool,
    pub page: PageRequest,
}

impl ServiceQuery {
    pub fn matches(&self, service: &Service) -> bool {
        if self.hide_inactive && service.status == ServiceStatus::Inactive {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !(contains_ci(&service.title, &needle) || contains_ci(&service.description, &needle))
            {
                return false;
            }
        }

        self.service_type.map_or(true, |t| service.service_type == t)
            && self.status.map_or(true, |s| service.status == s)
            && self.featured.map_or(true, |f| service.featured == f)
    }
}

#[derive(Debug, Clone)]
pub struct PostQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub status: Option<PostStatus>,
    pub visibility: Visibility,
    pub page: PageRequest,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            tag: None,
            status: None,
            visibility: Visibility::PublishedOnly,
            page: PageRequest::default(),
        }
    }
}

impl PostQuery {
    pub fn effective_status(&self) -> Option<PostStatus> {
        match self.visibility {
            Visibility::Everything => self.status,
            _ => Some(PostStatus::Published),
        }
    }

    pub fn matches(&self, post: &BlogPost) -> bool {
        if let Some(status) = self.effective_status() {
            if post.status != status {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !(contains_ci(&post.title, &needle)
                || contains_ci(&post.excerpt, &needle)
                || contains_ci(&post.content, &needle))
            {
                return false;
            }
        }

        self.category.as_ref().map_or(true, |c| &post.category == c)
            && self.tag.as_ref().map_or(true, |t| post.tags.contains(t))
    }
}

// =============================================================================
// REPOSITORY TRAITS
// =============================================================================

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert(&self, product: Product) -> Result<Product>;

    async fn find(&self, key: &LookupKey) -> Result<Option<Product>>;

    /// One page of matches plus the total match count
    async fn list(&self, query: &ProductQuery) -> Result<(Vec<Product>, i64)>;

    /// Full write guarded by `expected_version`; stores and returns `expected_version + 1`
    async fn update(&self, product: Product, expected_version: i64) -> Result<Product>;

    /// Curriculum-only write guarded by `expected_version`
    async fn replace_modules(
        &self,
        id: Uuid,
        expected_version: i64,
        modules: Vec<Module>,
        at: DateTime<Utc>,
    ) -> Result<Product>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn insert(&self, service: Service) -> Result<Service>;

    async fn find(&self, key: &LookupKey) -> Result<Option<Service>>;

    async fn list(&self, query: &ServiceQuery) -> Result<(Vec<Service>, i64)>;

    async fn update(&self, service: Service) -> Result<Service>;

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Service>>;

    /// Single multi-row update; returns the number of rows touched
    async fn update_many(&self, ids: &[Uuid], patch: &ServicePatch, at: DateTime<Utc>)
        -> Result<u64>;

    /// Writes every service or none of them
    async fn save_many(&self, services: Vec<Service>) -> Result<u64>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64>;
}

#[async_trait]
pub trait BlogRepository: Send + Sync {
    async fn insert(&self, post: BlogPost) -> Result<BlogPost>;

    async fn find(&self, key: &LookupKey) -> Result<Option<BlogPost>>;

    async fn list(&self, query: &PostQuery) -> Result<(Vec<BlogPost>, i64)>;

    async fn update(&self, post: BlogPost) -> Result<BlogPost>;

    /// Atomic `views = views + 1`
    async fn increment_views(&self, id: Uuid) -> Result<BlogPost>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the e-mail is taken
    async fn insert(&self, user: User) -> Result<User>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
}

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn record(&self, activity: Activity) -> Result<()>;

    /// Newest first
    async fn for_entity(&self, entity_id: &str) -> Result<Vec<Activity>>;
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Clone)]
pub struct Store {
    pub products: Arc<dyn ProductRepository>,
    pub services: Arc<dyn ServiceRepository>,
    pub posts: Arc<dyn BlogRepository>,
    pub users: Arc<dyn UserRepository>,
    pub activity: Arc<dyn ActivityRepository>,
}

impl Store {
    pub fn postgres(pool: DieselPool) -> Self {
        Self {
            products: Arc::new(postgres::PgProductRepository::new(pool.clone())),
            services: Arc::new(postgres::PgServiceRepository::new(pool.clone())),
            posts: Arc::new(postgres::PgBlogRepository::new(pool.clone())),
            users: Arc::new(postgres::PgUserRepository::new(pool.clone())),
            activity: Arc::new(postgres::PgActivityRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            products: Arc::new(memory::InMemoryRepository::<Product>::new()),
            services: Arc::new(memory::InMemoryRepository::<Service>::new()),
            posts: Arc::new(memory::InMemoryRepository::<BlogPost>::new()),
            users: Arc::new(memory::InMemoryRepository::<User>::new()),
            activity: Arc::new(memory::InMemoryRepository::<Activity>::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_key_parse() {
        let id = Uuid::new_v4();
        assert_eq!(LookupKey::parse(&id.to_string()), LookupKey::Id(id));
        assert_eq!(
            LookupKey::parse("intro-to-rust-1a2b3c4d"),
            LookupKey::Slug("intro-to-rust-1a2b3c4d".to_string())
        );
    }

    #[test]
    fn test_sort_field_parse() {
        assert_eq!(SortField::parse("price"), Some(SortField::Price));
        assert_eq!(SortField::parse("createdAt"), Some(SortField::CreatedAt));
        assert_eq!(SortField::parse("popularity"), None);
    }

    #[test]
    fn test_anonymous_queries_force_published() {
        let query = ProductQuery {
            status: Some(ProductStatus::Draft),
            ..Default::default()
        };
        assert_eq!(query.effective_status(), Some(ProductStatus::Published));

        let admin = ProductQuery {
            status: Some(ProductStatus::Draft),
            visibility: Visibility::Everything,
            ..Default::default()
        };
        assert_eq!(admin.effective_status(), Some(ProductStatus::Draft));
    }
}
