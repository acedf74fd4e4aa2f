// Diesel row types. Embedded arrays and objects travel as JSONB values and are
// decoded into the domain types on the way out.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::models::{
    Activity, BlogPost, Difficulty, PostStatus, Product, ProductStatus, ProductType, Role, Service,
    ServiceStatus, ServiceType, User,
};
use crate::repositories::RepositoryError;
use crate::schema::{activities, posts, products, services, users};

fn to_json<T: Serialize>(value: &T) -> Result<Value, RepositoryError> {
    Ok(serde_json::to_value(value)?)
}

fn from_json<T: DeserializeOwned>(value: Value) -> Result<T, RepositoryError> {
    Ok(serde_json::from_value(value)?)
}

fn unknown(column: &str, value: &str) -> RepositoryError {
    RepositoryError::Backend(format!("Unknown {} value in row: {}", column, value))
}

// =============================================================================
// PRODUCTS
// =============================================================================

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct ProductRow {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub product_type: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub status: String,
    pub category: String,
    pub difficulty: String,
    pub thumbnail: Option<String>,
    pub featured: bool,
    pub tags: Vec<String>,
    pub instructor: Value,
    pub modules: Value,
    pub features: Value,
    pub testimonials: Value,
    pub faqs: Value,
    pub enrollments: i64,
    pub rating: f64,
    pub total_reviews: i64,
    pub created_by: Uuid,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub curriculum_updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<&Product> for ProductRow {
    type Error = RepositoryError;

    fn try_from(product: &Product) -> Result<Self, Self::Error> {
        Ok(Self {
            id: product.id,
            slug: product.slug.clone(),
            title: product.title.clone(),
            description: product.description.clone(),
            long_description: product.long_description.clone(),
            product_type: product.product_type.as_str().to_string(),
            price: product.price,
            original_price: product.original_price,
            status: product.status.as_str().to_string(),
            category: product.category.clone(),
            difficulty: product.difficulty.as_str().to_string(),
            thumbnail: product.thumbnail.clone(),
            featured: product.featured,
            tags: product.tags.clone(),
            instructor: to_json(&product.instructor)?,
            modules: to_json(&product.modules)?,
            features: to_json(&product.features)?,
            testimonials: to_json(&product.testimonials)?,
            faqs: to_json(&product.faqs)?,
            enrollments: product.enrollments,
            rating: product.rating,
            total_reviews: product.total_reviews,
            created_by: product.created_by,
            version: product.version,
            created_at: product.created_at,
            updated_at: product.updated_at,
            curriculum_updated_at: product.curriculum_updated_at,
        })
    }
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product_type: ProductType::parse(&row.product_type)
                .ok_or_else(|| unknown("product_type", &row.product_type))?,
            status: ProductStatus::parse(&row.status).ok_or_else(|| unknown("status", &row.status))?,
            difficulty: Difficulty::parse(&row.difficulty)
                .ok_or_else(|| unknown("difficulty", &row.difficulty))?,
            instructor: from_json(row.instructor)?,
            modules: from_json(row.modules)?,
            features: from_json(row.features)?,
            testimonials: from_json(row.testimonials)?,
            faqs: from_json(row.faqs)?,
            id: row.id,
            slug: row.slug,
            title: row.title,
            description: row.description,
            long_description: row.long_description,
            price: row.price,
            original_price: row.original_price,
            category: row.category,
            thumbnail: row.thumbnail,
            featured: row.featured,
            tags: row.tags,
            enrollments: row.enrollments,
            rating: row.rating,
            total_reviews: row.total_reviews,
            created_by: row.created_by,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
            curriculum_updated_at: row.curriculum_updated_at,
        })
    }
}

// =============================================================================
// SERVICES
// =============================================================================

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset, Identifiable)]
#[diesel(table_name = services)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct ServiceRow {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub service_type: String,
    pub price: f64,
    pub status: String,
    pub featured: bool,
    pub thumbnail: Option<String>,
    pub delivery_time: Option<String>,
    pub packages: Value,
    pub features: Value,
    pub faqs: Value,
    pub clients: i64,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Multi-row bulk patch; `None` fields are left untouched
#[derive(Debug, AsChangeset)]
#[diesel(table_name = services)]
pub struct ServicePatchRow<'a> {
    pub status: Option<&'a str>,
    pub featured: Option<bool>,
    pub service_type: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&Service> for ServiceRow {
    type Error = RepositoryError;

    fn try_from(service: &Service) -> Result<Self, Self::Error> {
        Ok(Self {
            id: service.id,
            slug: service.slug.clone(),
            title: service.title.clone(),
            description: service.description.clone(),
            long_description: service.long_description.clone(),
            service_type: service.service_type.as_str().to_string(),
            price: service.price,
            status: service.status.as_str().to_string(),
            featured: service.featured,
            thumbnail: service.thumbnail.clone(),
            delivery_time: service.delivery_time.clone(),
            packages: to_json(&service.packages)?,
            features: to_json(&service.features)?,
            faqs: to_json(&service.faqs)?,
            clients: service.clients,
            created_by: service.created_by,
            created_at: service.created_at,
            updated_at: service.updated_at,
        })
    }
}

impl TryFrom<ServiceRow> for Service {
    type Error = RepositoryError;

    fn try_from(row: ServiceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            service_type: ServiceType::parse(&row.service_type)
                .ok_or_else(|| unknown("service_type", &row.service_type))?,
            status: ServiceStatus::parse(&row.status).ok_or_else(|| unknown("status", &row.status))?,
            packages: from_json(row.packages)?,
            features: from_json(row.features)?,
            faqs: from_json(row.faqs)?,
            id: row.id,
            slug: row.slug,
            title: row.title,
            description: row.description,
            long_description: row.long_description,
            price: row.price,
            featured: row.featured,
            thumbnail: row.thumbnail,
            delivery_time: row.delivery_time,
            clients: row.clients,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// POSTS
// =============================================================================

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset, Identifiable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct PostRow {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub status: String,
    pub category: String,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub author: Value,
    pub read_time: String,
    pub views: i64,
    pub comments: i64,
    pub created_by: Uuid,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&BlogPost> for PostRow {
    type Error = RepositoryError;

    fn try_from(post: &BlogPost) -> Result<Self, Self::Error> {
        Ok(Self {
            id: post.id,
            slug: post.slug.clone(),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            content: post.content.clone(),
            status: post.status.as_str().to_string(),
            category: post.category.clone(),
            tags: post.tags.clone(),
            featured_image: post.featured_image.clone(),
            author: to_json(&post.author)?,
            read_time: post.read_time.clone(),
            views: post.views,
            comments: post.comments,
            created_by: post.created_by,
            published_at: post.published_at,
            created_at: post.created_at,
            updated_at: post.updated_at,
        })
    }
}

impl TryFrom<PostRow> for BlogPost {
    type Error = RepositoryError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        Ok(Self {
            status: PostStatus::parse(&row.status).ok_or_else(|| unknown("status", &row.status))?,
            author: from_json(row.author)?,
            id: row.id,
            slug: row.slug,
            title: row.title,
            excerpt: row.excerpt,
            content: row.content,
            category: row.category,
            tags: row.tags,
            featured_image: row.featured_image,
            read_time: row.read_time,
            views: row.views,
            comments: row.comments,
            created_by: row.created_by,
            published_at: row.published_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// USERS & ACTIVITY
// =============================================================================

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role.as_str().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            role: Role::from_string(&row.role).map_err(RepositoryError::Backend)?,
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = activities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActivityRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}

impl From<Activity> for ActivityRow {
    fn from(activity: Activity) -> Self {
        Self {
            id: activity.id,
            user_id: activity.user_id,
            action: activity.action,
            entity_type: activity.entity_type,
            entity_id: activity.entity_id,
            details: activity.details,
            created_at: activity.created_at,
        }
    }
}

impl From<ActivityRow> for Activity {
    fn from(row: ActivityRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            action: row.action,
            entity_type: row.entity_type,
            entity_id: row.entity_id,
            details: row.details,
            created_at: row.created_at,
        }
    }
}
