// Product catalog: listing, creation, lookup, update and deletion

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    middleware::AuthenticatedUser,
    models::{
        ActivityAction, CreateProductRequest, Difficulty, Instructor, InstructorInput, Listing,
        PageRequest, Pagination, Product, ProductListParams, ProductStatus, ProductType,
        UpdateProductRequest,
    },
    repositories::{LookupKey, ProductQuery, ProductRepository, ProductSort, SortField, Visibility},
    services::activity::ActivityService,
    utils::{clean_text, is_valid_url, slug_with_id, truncate_chars, ApiError, RequiredFields},
    validators::{
        normalize_modules, sanitize_faqs, sanitize_features, sanitize_tags, sanitize_testimonials,
    },
};

const MAX_TITLE: usize = 100;
const MAX_DESCRIPTION: usize = 500;
const MAX_LONG_DESCRIPTION: usize = 5000;
const MAX_CATEGORY: usize = 50;
const MAX_INSTRUCTOR_NAME: usize = 100;
const MAX_INSTRUCTOR_TITLE: usize = 100;
const MAX_INSTRUCTOR_BIO: usize = 1000;

pub(crate) fn parse_product_type(value: &str) -> Result<ProductType, ApiError> {
    ProductType::parse(value)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid product type: {}", value)))
}

fn parse_difficulty(value: &str) -> Result<Difficulty, ApiError> {
    Difficulty::parse(value)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid difficulty: {}", value)))
}

fn parse_status(value: &str) -> Result<ProductStatus, ApiError> {
    ProductStatus::parse(value)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid status: {}", value)))
}

fn check_thumbnail(thumbnail: Option<String>) -> Result<Option<String>, ApiError> {
    match thumbnail {
        Some(url) if !is_valid_url(&url) => Err(ApiError::validation(vec![
            "thumbnail: Thumbnail must be a valid URL".to_string(),
        ])),
        other => Ok(other),
    }
}

fn build_instructor(input: InstructorInput, name: String) -> Instructor {
    Instructor {
        name: truncate_chars(&name, MAX_INSTRUCTOR_NAME),
        title: clean_text(input.title.as_ref(), MAX_INSTRUCTOR_TITLE),
        bio: clean_text(input.bio.as_ref(), MAX_INSTRUCTOR_BIO),
        avatar: clean_text(input.avatar.as_ref(), 500),
    }
}

/// Published products are public; anything else only to its owner or an admin
pub(crate) fn can_view(product: &Product, caller: Option<&AuthenticatedUser>) -> bool {
    product.is_published() || caller.is_some_and(|c| c.can_manage(product.created_by))
}

#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    activity: ActivityService,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>, activity: ActivityService) -> Self {
        Self { products, activity }
    }

    #[instrument(skip(self, params, caller))]
    pub async fn list(
        &self,
        params: ProductListParams,
        caller: Option<&AuthenticatedUser>,
    ) -> Result<Listing<Product>, ApiError> {
        let product_type = params.product_type.as_deref().map(parse_product_type).transpose()?;
        let difficulty = params.difficulty.as_deref().map(parse_difficulty).transpose()?;
        let status = params.status.as_deref().map(parse_status).transpose()?;

        let visibility = match caller {
            None => Visibility::PublishedOnly,
            Some(user) if user.is_admin() => Visibility::Everything,
            Some(user) => Visibility::PublishedOrOwner(user.user_id),
        };

        let sort = ProductSort {
            field: params
                .sort_by
                .as_deref()
                .and_then(SortField::parse)
                .unwrap_or_default(),
            ascending: params.sort_order.as_deref() == Some("asc"),
        };

        let query = ProductQuery {
            search: params.search.clone().filter(|s| !s.trim().is_empty()),
            product_type,
            category: params.category.clone(),
            difficulty,
            featured: params.featured,
            status,
            visibility,
            sort,
            page: PageRequest::new(params.page, params.limit),
        };

        let (products, total) = self.products.list(&query).await?;

        Ok(Listing {
            items: products,
            pagination: Pagination::new(query.page, total),
            filters: json!({
                "search": params.search,
                "type": product_type,
                "category": params.category,
                "difficulty": difficulty,
                "featured": params.featured,
                "status": query.effective_status(),
                "sortBy": params.sort_by.unwrap_or_else(|| "createdAt".to_string()),
                "sortOrder": if sort.ascending { "asc" } else { "desc" },
            }),
        })
    }

    #[instrument(skip(self, request, caller), fields(user_id = %caller.user_id))]
    pub async fn create(
        &self,
        request: CreateProductRequest,
        caller: &AuthenticatedUser,
    ) -> Result<Product, ApiError> {
        caller.require_author()?;

        let instructor_input = request.instructor.clone().unwrap_or_default();
        let mut required = RequiredFields::new();
        let title = required.text("title", request.title.as_ref());
        let description = required.text("description", request.description.as_ref());
        let type_raw = required.text("type", request.product_type.as_ref());
        let price = required.present("price", request.price);
        let category = required.text("category", request.category.as_ref());
        let instructor_name = required.text("instructor.name", instructor_input.name.as_ref());

        let missing = required.into_missing();
        if !missing.is_empty() {
            return Err(ApiError::validation(missing));
        }
        request.validate()?;

        let product_type = parse_product_type(&type_raw)?;
        let difficulty = match request.difficulty.as_deref() {
            Some(value) => parse_difficulty(value)?,
            None => Difficulty::Beginner,
        };
        let status = match request.status.as_deref() {
            Some(value) => parse_status(value)?,
            None => ProductStatus::Draft,
        };
        let thumbnail = check_thumbnail(clean_text(request.thumbnail.as_ref(), 500))?;

        let modules = match request.modules {
            Some(inputs) => normalize_modules(inputs).map_err(ApiError::validation)?,
            None => Vec::new(),
        };

        let id = Uuid::new_v4();
        let now = Utc::now();
        let title = truncate_chars(&title, MAX_TITLE);
        let product = Product {
            id,
            slug: slug_with_id(&title, id),
            title,
            description: truncate_chars(&description, MAX_DESCRIPTION),
            long_description: clean_text(request.long_description.as_ref(), MAX_LONG_DESCRIPTION),
            product_type,
            price,
            original_price: request.original_price,
            status,
            category: truncate_chars(&category, MAX_CATEGORY),
            difficulty,
            thumbnail,
            featured: request.featured.unwrap_or(false),
            tags: sanitize_tags(request.tags.unwrap_or_default()),
            instructor: build_instructor(instructor_input, instructor_name),
            curriculum_updated_at: (!modules.is_empty()).then_some(now),
            modules,
            features: sanitize_features(request.features.unwrap_or_default()),
            testimonials: sanitize_testimonials(request.testimonials.unwrap_or_default()),
            faqs: sanitize_faqs(request.faqs.unwrap_or_default()),
            enrollments: 0,
            rating: request.rating.unwrap_or(0.0),
            total_reviews: request.total_reviews.unwrap_or(0),
            created_by: caller.user_id,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        let product = self.products.insert(product).await?;
        info!("Created product {} ({})", product.id, product.slug);

        self.activity
            .record(
                ActivityAction::ProductCreated,
                caller.user_id,
                product.id.to_string(),
                json!({ "title": product.title, "type": product.product_type }),
            )
            .await;

        Ok(product)
    }

    /// Hidden products are reported as missing
    #[instrument(skip(self, caller))]
    pub async fn get(
        &self,
        key: &LookupKey,
        caller: Option<&AuthenticatedUser>,
    ) -> Result<Product, ApiError> {
        self.products
            .find(key)
            .await?
            .filter(|product| can_view(product, caller))
            .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))
    }

    async fn find_managed(
        &self,
        key: &LookupKey,
        caller: &AuthenticatedUser,
    ) -> Result<Product, ApiError> {
        let product = self
            .products
            .find(key)
            .await?
            .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

        if !caller.can_manage(product.created_by) {
            return Err(ApiError::Forbidden(
                "You can only modify your own products".to_string(),
            ));
        }
        Ok(product)
    }

    #[instrument(skip(self, request, caller), fields(user_id = %caller.user_id))]
    pub async fn update(
        &self,
        key: &LookupKey,
        mut request: UpdateProductRequest,
        caller: &AuthenticatedUser,
    ) -> Result<Product, ApiError> {
        request.sanitize();
        request.validate()?;
        if request.is_empty() {
            return Err(ApiError::BadRequest("No fields to update".to_string()));
        }

        let mut product = self.find_managed(key, caller).await?;
        let expected_version = product.version;
        let mut changed = Vec::new();

        if let Some(title) = request.title {
            if title != product.title {
                product.slug = slug_with_id(&title, product.id);
                product.title = title;
                changed.push("title");
            }
        }
        if let Some(description) = request.description {
            product.description = description;
            changed.push("description");
        }
        if let Some(long_description) = request.long_description {
            product.long_description = Some(long_description).filter(|s| !s.is_empty());
            changed.push("longDescription");
        }
        if let Some(value) = request.product_type {
            product.product_type = parse_product_type(&value)?;
            changed.push("type");
        }
        if let Some(price) = request.price {
            product.price = price;
            changed.push("price");
        }
        if let Some(original_price) = request.original_price {
            product.original_price = Some(original_price);
            changed.push("originalPrice");
        }
        if let Some(value) = request.status {
            product.status = parse_status(&value)?;
            changed.push("status");
        }
        if let Some(category) = request.category {
            product.category = category;
            changed.push("category");
        }
        if let Some(value) = request.difficulty {
            product.difficulty = parse_difficulty(&value)?;
            changed.push("difficulty");
        }
        if let Some(thumbnail) = request.thumbnail {
            // empty string clears the thumbnail
            product.thumbnail = check_thumbnail(Some(thumbnail).filter(|s| !s.is_empty()))?;
            changed.push("thumbnail");
        }
        if let Some(featured) = request.featured {
            product.featured = featured;
            changed.push("featured");
        }
        if let Some(tags) = request.tags {
            product.tags = sanitize_tags(tags);
            changed.push("tags");
        }
        if let Some(input) = request.instructor {
            let name = clean_text(input.name.as_ref(), MAX_INSTRUCTOR_NAME)
                .unwrap_or_else(|| product.instructor.name.clone());
            product.instructor = build_instructor(input, name);
            changed.push("instructor");
        }
        if let Some(features) = request.features {
            product.features = sanitize_features(features);
            changed.push("features");
        }
        if let Some(testimonials) = request.testimonials {
            product.testimonials = sanitize_testimonials(testimonials);
            changed.push("testimonials");
        }
        if let Some(faqs) = request.faqs {
            product.faqs = sanitize_faqs(faqs);
            changed.push("faqs");
        }

        product.updated_at = Utc::now();
        let product = self.products.update(product, expected_version).await?;
        info!("Updated product {} to version {}", product.id, product.version);

        self.activity
            .record(
                ActivityAction::ProductUpdated,
                caller.user_id,
                product.id.to_string(),
                json!({ "fields": changed, "version": product.version }),
            )
            .await;

        Ok(product)
    }

    #[instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn delete(&self, key: &LookupKey, caller: &AuthenticatedUser) -> Result<Uuid, ApiError> {
        let product = self.find_managed(key, caller).await?;

        if product.enrollments > 0 {
            return Err(ApiError::BadRequest(format!(
                "Cannot delete a product with {} active enrollments. Archive it instead",
                product.enrollments
            )));
        }

        self.products.delete(product.id).await?;
        info!("Deleted product {}", product.id);

        self.activity
            .record(
                ActivityAction::ProductDeleted,
                caller.user_id,
                product.id.to_string(),
                json!({ "title": product.title, "slug": product.slug }),
            )
            .await;

        Ok(product.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Activity, Role};
    use crate::repositories::memory::InMemoryRepository;
    use serde_json::json;

    fn caller(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            token_id: "jti".to_string(),
            email: "caller@example.com".to_string(),
            name: "Caller".to_string(),
            role,
            exp: 0,
        }
    }

    fn service() -> (ProductService, ActivityService) {
        let activity = ActivityService::new(Arc::new(InMemoryRepository::<Activity>::new()));
        let service = ProductService::new(
            Arc::new(InMemoryRepository::<Product>::new()),
            activity.clone(),
        );
        (service, activity)
    }

    fn create_request(value: serde_json::Value) -> CreateProductRequest {
        serde_json::from_value(value).unwrap()
    }

    fn valid_body() -> serde_json::Value {
        json!({
            "title": "Rust for Web Developers",
            "description": "Build production services with axum and tokio.",
            "type": "course",
            "price": 49.0,
            "category": "Programming",
            "instructor": { "name": "Ferris" }
        })
    }

    #[tokio::test]
    async fn test_create_normalizes_and_defaults() {
        let (service, activity) = service();
        let instructor = caller(Role::Instructor);

        let product = service
            .create(create_request(valid_body()), &instructor)
            .await
            .unwrap();

        assert_eq!(product.product_type, ProductType::Course);
        assert_eq!(product.status, ProductStatus::Draft);
        assert_eq!(product.difficulty, Difficulty::Beginner);
        assert_eq!(product.enrollments, 0);
        assert_eq!(product.version, 1);
        assert!(product.slug.starts_with("rust-for-web-developers-"));
        assert!(product.slug.ends_with(&product.id.simple().to_string()[..8]));

        let history = activity.for_entity(&product.id.to_string()).await.unwrap();
        assert_eq!(history[0].action, "product.created");
    }

    #[tokio::test]
    async fn test_create_reports_every_missing_field() {
        let (service, _) = service();
        let err = service
            .create(create_request(json!({ "title": "Only a title" })), &caller(Role::Admin))
            .await
            .unwrap_err();

        match err {
            ApiError::Validation { details, .. } => {
                assert_eq!(
                    details,
                    vec![
                        "description is required",
                        "type is required",
                        "price is required",
                        "category is required",
                        "instructor.name is required",
                    ]
                );
            },
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_type_and_plain_users() {
        let (service, _) = service();
        let mut body = valid_body();
        body["type"] = json!("invalidtype");

        let err = service
            .create(create_request(body), &caller(Role::Admin))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid product type: invalidtype");

        let err = service
            .create(create_request(valid_body()), &caller(Role::User))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_create_truncates_long_text() {
        let (service, _) = service();
        let mut body = valid_body();
        body["title"] = json!("t".repeat(150));
        body["category"] = json!("c".repeat(80));

        let product = service
            .create(create_request(body), &caller(Role::Admin))
            .await
            .unwrap();
        assert_eq!(product.title.chars().count(), MAX_TITLE);
        assert_eq!(product.category.chars().count(), MAX_CATEGORY);
    }

    #[tokio::test]
    async fn test_draft_is_hidden_from_strangers() {
        let (service, _) = service();
        let owner = caller(Role::Instructor);
        let product = service
            .create(create_request(valid_body()), &owner)
            .await
            .unwrap();
        let key = LookupKey::Id(product.id);

        assert!(service.get(&key, Some(&owner)).await.is_ok());
        assert!(service.get(&key, Some(&caller(Role::Admin))).await.is_ok());
        assert!(matches!(
            service.get(&key, Some(&caller(Role::User))).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_regenerates_slug_and_bumps_version() {
        let (service, _) = service();
        let owner = caller(Role::Instructor);
        let product = service
            .create(create_request(valid_body()), &owner)
            .await
            .unwrap();

        let update: UpdateProductRequest =
            serde_json::from_value(json!({ "title": "Async Rust in Depth", "status": "published" }))
                .unwrap();
        let updated = service
            .update(&LookupKey::Slug(product.slug.clone()), update, &owner)
            .await
            .unwrap();

        assert_eq!(updated.version, 2);
        assert_eq!(updated.status, ProductStatus::Published);
        assert!(updated.slug.starts_with("async-rust-in-depth-"));

        let stranger: UpdateProductRequest =
            serde_json::from_value(json!({ "price": 10.0 })).unwrap();
        assert!(matches!(
            service
                .update(&LookupKey::Id(product.id), stranger, &caller(Role::Instructor))
                .await,
            Err(ApiError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_list_visibility() {
        let (service, _) = service();
        let owner = caller(Role::Instructor);
        let mut published = valid_body();
        published["status"] = json!("published");
        service.create(create_request(published), &owner).await.unwrap();
        service.create(create_request(valid_body()), &owner).await.unwrap();

        let anonymous = service
            .list(
                ProductListParams {
                    status: Some("draft".to_string()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(anonymous.pagination.total, 1);
        assert_eq!(anonymous.filters["status"], "published");

        let own = service.list(ProductListParams::default(), Some(&owner)).await.unwrap();
        assert_eq!(own.pagination.total, 2);

        let stranger = service
            .list(ProductListParams::default(), Some(&caller(Role::User)))
            .await
            .unwrap();
        assert_eq!(stranger.pagination.total, 1);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_type() {
        let (service, _) = service();
        let err = service
            .list(
                ProductListParams {
                    product_type: Some("podcast".to_string()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid product type: podcast");
    }
}
