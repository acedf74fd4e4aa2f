// Mutex-guarded Vec storage. Used by tests and by `STORAGE_BACKEND=memory` runs.
// Slug and e-mail uniqueness are enforced here the same way the database
// constraints enforce them.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    ActivityRepository, BlogRepository, LookupKey, PostQuery, ProductQuery, ProductRepository,
    RepositoryError, Result, ServiceQuery, ServiceRepository, SortField, UserRepository,
};
use crate::models::{Activity, BlogPost, Module, PageRequest, Product, Service, ServicePatch, User};

pub struct InMemoryRepository<T>(Mutex<Vec<T>>);

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self(Mutex::new(vec![]))
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn find_mut<T, P>(v: &mut [T], predicate: P) -> Result<&mut T>
where
    P: FnMut(&&mut T) -> bool,
{
    v.iter_mut()
        .find(predicate)
        .ok_or(RepositoryError::NotFound)
}

#[inline]
fn remove_where<T, P>(v: &mut Vec<T>, predicate: P) -> u64
where
    P: Fn(&T) -> bool,
{
    let before = v.len();
    v.retain(|item| !predicate(item));
    (before - v.len()) as u64
}

fn paginate<T: Clone>(matches: Vec<&T>, page: &PageRequest) -> (Vec<T>, i64) {
    let total = matches.len() as i64;
    let items = matches
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .cloned()
        .collect();
    (items, total)
}

fn slug_conflict(name: &str) -> RepositoryError {
    RepositoryError::Conflict(format!("{}_slug_key", name))
}

// =============================================================================
// PRODUCTS
// =============================================================================

fn compare_products(a: &Product, b: &Product, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::Price => a.price.total_cmp(&b.price),
        SortField::Title => a.title.cmp(&b.title),
        SortField::Enrollments => a.enrollments.cmp(&b.enrollments),
        SortField::Rating => a.rating.total_cmp(&b.rating),
    }
}

#[async_trait]
impl ProductRepository for InMemoryRepository<Product> {
    async fn insert(&self, product: Product) -> Result<Product> {
        let mut guard = self.0.lock().await;
        if guard.iter().any(|p| p.slug == product.slug) {
            return Err(slug_conflict("products"));
        }
        guard.push(product.clone());
        Ok(product)
    }

    async fn find(&self, key: &LookupKey) -> Result<Option<Product>> {
        let guard = self.0.lock().await;
        Ok(guard.iter().find(|p| key.matches(p.id, &p.slug)).cloned())
    }

    async fn list(&self, query: &ProductQuery) -> Result<(Vec<Product>, i64)> {
        let guard = self.0.lock().await;
        let mut matches: Vec<&Product> = guard.iter().filter(|p| query.matches(p)).collect();

        matches.sort_by(|a, b| {
            let ordering = compare_products(a, b, query.sort.field);
            if query.sort.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });

        Ok(paginate(matches, &query.page))
    }

    async fn update(&self, mut product: Product, expected_version: i64) -> Result<Product> {
        let mut guard = self.0.lock().await;
        if guard
            .iter()
            .any(|p| p.id != product.id && p.slug == product.slug)
        {
            return Err(slug_conflict("products"));
        }

        let stored = find_mut(&mut guard, |p| p.id == product.id)?;
        if stored.version != expected_version {
            return Err(RepositoryError::VersionConflict);
        }

        product.version = expected_version + 1;
        *stored = product.clone();
        Ok(product)
    }

    async fn replace_modules(
        &self,
        id: Uuid,
        expected_version: i64,
        modules: Vec<Module>,
        at: DateTime<Utc>,
    ) -> Result<Product> {
        let mut guard = self.0.lock().await;
        let stored = find_mut(&mut guard, |p| p.id == id)?;
        if stored.version != expected_version {
            return Err(RepositoryError::VersionConflict);
        }

        stored.modules = modules;
        stored.updated_at = at;
        stored.curriculum_updated_at = Some(at);
        stored.version += 1;
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut guard = self.0.lock().await;
        match remove_where(&mut guard, |p| p.id == id) {
            0 => Err(RepositoryError::NotFound),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// SERVICES
// =============================================================================

#[async_trait]
impl ServiceRepository for InMemoryRepository<Service> {
    async fn insert(&self, service: Service) -> Result<Service> {
        let mut guard = self.0.lock().await;
        if guard.iter().any(|s| s.slug == service.slug) {
            return Err(slug_conflict("services"));
        }
        guard.push(service.clone());
        Ok(service)
    }

    async fn find(&self, key: &LookupKey) -> Result<Option<Service>> {
        let guard = self.0.lock().await;
        Ok(guard.iter().find(|s| key.matches(s.id, &s.slug)).cloned())
    }

    async fn list(&self, query: &ServiceQuery) -> Result<(Vec<Service>, i64)> {
        let guard = self.0.lock().await;
        let mut matches: Vec<&Service> = guard.iter().filter(|s| query.matches(s)).collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(matches, &query.page))
    }

    async fn update(&self, service: Service) -> Result<Service> {
        let mut guard = self.0.lock().await;
        if guard
            .iter()
            .any(|s| s.id != service.id && s.slug == service.slug)
        {
            return Err(slug_conflict("services"));
        }

        let stored = find_mut(&mut guard, |s| s.id == service.id)?;
        *stored = service.clone();
        Ok(service)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Service>> {
        let guard = self.0.lock().await;
        Ok(guard.iter().filter(|s| ids.contains(&s.id)).cloned().collect())
    }

    async fn update_many(
        &self,
        ids: &[Uuid],
        patch: &ServicePatch,
        at: DateTime<Utc>,
    ) -> Result<u64> {
        let mut guard = self.0.lock().await;
        let mut modified = 0;

        for service in guard.iter_mut().filter(|s| ids.contains(&s.id)) {
            if let Some(status) = patch.status {
                service.status = status;
            }
            if let Some(featured) = patch.featured {
                service.featured = featured;
            }
            if let Some(service_type) = patch.service_type {
                service.service_type = service_type;
            }
            service.updated_at = at;
            modified += 1;
        }

        Ok(modified)
    }

    async fn save_many(&self, services: Vec<Service>) -> Result<u64> {
        let mut guard = self.0.lock().await;

        // Validate the whole batch before touching anything
        for service in &services {
            if !guard.iter().any(|s| s.id == service.id) {
                return Err(RepositoryError::NotFound);
            }
            let taken = guard
                .iter()
                .any(|s| s.id != service.id && s.slug == service.slug)
                || services
                    .iter()
                    .any(|other| other.id != service.id && other.slug == service.slug);
            if taken {
                return Err(slug_conflict("services"));
            }
        }

        let count = services.len() as u64;
        for service in services {
            if let Ok(stored) = find_mut(&mut guard, |s| s.id == service.id) {
                *stored = service;
            }
        }
        Ok(count)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut guard = self.0.lock().await;
        match remove_where(&mut guard, |s| s.id == id) {
            0 => Err(RepositoryError::NotFound),
            _ => Ok(()),
        }
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64> {
        let mut guard = self.0.lock().await;
        Ok(remove_where(&mut guard, |s| ids.contains(&s.id)))
    }
}

// =============================================================================
// BLOG
// =============================================================================

#[async_trait]
impl BlogRepository for InMemoryRepository<BlogPost> {
    async fn insert(&self, post: BlogPost) -> Result<BlogPost> {
        let mut guard = self.0.lock().await;
        if guard.iter().any(|p| p.slug == post.slug) {
            return Err(slug_conflict("posts"));
        }
        guard.push(post.clone());
        Ok(post)
    }

    async fn find(&self, key: &LookupKey) -> Result<Option<BlogPost>> {
        let guard = self.0.lock().await;
        Ok(guard.iter().find(|p| key.matches(p.id, &p.slug)).cloned())
    }

    async fn list(&self, query: &PostQuery) -> Result<(Vec<BlogPost>, i64)> {
        let guard = self.0.lock().await;
        let mut matches: Vec<&BlogPost> = guard.iter().filter(|p| query.matches(p)).collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(matches, &query.page))
    }

    async fn update(&self, post: BlogPost) -> Result<BlogPost> {
        let mut guard = self.0.lock().await;
        if guard.iter().any(|p| p.id != post.id && p.slug == post.slug) {
            return Err(slug_conflict("posts"));
        }

        let stored = find_mut(&mut guard, |p| p.id == post.id)?;
        *stored = post.clone();
        Ok(post)
    }

    async fn increment_views(&self, id: Uuid) -> Result<BlogPost> {
        let mut guard = self.0.lock().await;
        let stored = find_mut(&mut guard, |p| p.id == id)?;
        stored.views += 1;
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut guard = self.0.lock().await;
        match remove_where(&mut guard, |p| p.id == id) {
            0 => Err(RepositoryError::NotFound),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// USERS & ACTIVITY
// =============================================================================

#[async_trait]
impl UserRepository for InMemoryRepository<User> {
    async fn insert(&self, user: User) -> Result<User> {
        let mut guard = self.0.lock().await;
        if guard.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("users_email_key".to_string()));
        }
        guard.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let guard = self.0.lock().await;
        Ok(guard.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let guard = self.0.lock().await;
        Ok(guard.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl ActivityRepository for InMemoryRepository<Activity> {
    async fn record(&self, activity: Activity) -> Result<()> {
        self.0.lock().await.push(activity);
        Ok(())
    }

    async fn for_entity(&self, entity_id: &str) -> Result<Vec<Activity>> {
        let guard = self.0.lock().await;
        Ok(guard
            .iter()
            .rev()
            .filter(|a| a.entity_id == entity_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, Instructor, ProductStatus, ProductType};
    use crate::repositories::{ProductSort, Visibility};

    fn product(slug: &str, status: ProductStatus, owner: Uuid, price: f64) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            title: slug.to_string(),
            description: "A product used in repository tests".to_string(),
            long_description: None,
            product_type: ProductType::Course,
            price,
            original_price: None,
            status,
            category: "Programming".to_string(),
            difficulty: Difficulty::Beginner,
            thumbnail: None,
            featured: false,
            tags: vec![],
            instructor: Instructor {
                name: "Ada".to_string(),
                title: None,
                bio: None,
                avatar: None,
            },
            modules: vec![],
            features: vec![],
            testimonials: vec![],
            faqs: vec![],
            enrollments: 0,
            rating: 0.0,
            total_reviews: 0,
            created_by: owner,
            version: 1,
            created_at: now,
            updated_at: now,
            curriculum_updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_conflict() {
        let repo = InMemoryRepository::<Product>::new();
        let owner = Uuid::new_v4();
        repo.insert(product("dup", ProductStatus::Draft, owner, 1.0))
            .await
            .unwrap();

        let result = repo
            .insert(product("dup", ProductStatus::Draft, owner, 1.0))
            .await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_stale_version_rejected() {
        let repo = InMemoryRepository::<Product>::new();
        let stored = repo
            .insert(product("cas", ProductStatus::Draft, Uuid::new_v4(), 1.0))
            .await
            .unwrap();

        let first = repo
            .replace_modules(stored.id, 1, vec![], Utc::now())
            .await
            .unwrap();
        assert_eq!(first.version, 2);
        assert!(first.curriculum_updated_at.is_some());

        let stale = repo.replace_modules(stored.id, 1, vec![], Utc::now()).await;
        assert!(matches!(stale, Err(RepositoryError::VersionConflict)));

        let stale_update = repo.update(stored.clone(), 1).await;
        assert!(matches!(stale_update, Err(RepositoryError::VersionConflict)));
    }

    #[tokio::test]
    async fn test_list_visibility_and_sort() {
        let repo = InMemoryRepository::<Product>::new();
        let me = Uuid::new_v4();
        let someone_else = Uuid::new_v4();
        repo.insert(product("cheap", ProductStatus::Published, someone_else, 10.0))
            .await
            .unwrap();
        repo.insert(product("pricey", ProductStatus::Published, someone_else, 90.0))
            .await
            .unwrap();
        repo.insert(product("mine", ProductStatus::Draft, me, 50.0))
            .await
            .unwrap();
        repo.insert(product("theirs", ProductStatus::Draft, someone_else, 70.0))
            .await
            .unwrap();

        let query = ProductQuery {
            visibility: Visibility::PublishedOrOwner(me),
            sort: ProductSort {
                field: SortField::Price,
                ascending: true,
            },
            ..Default::default()
        };
        let (items, total) = repo.list(&query).await.unwrap();
        let slugs: Vec<&str> = items.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(total, 3);
        assert_eq!(slugs, vec!["cheap", "mine", "pricey"]);

        let (anonymous, _) = repo.list(&ProductQuery::default()).await.unwrap();
        assert_eq!(anonymous.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let repo = InMemoryRepository::<User>::new();
        let user = User::new(
            "Ada".to_string(),
            "ada@example.com".to_string(),
            "hash".to_string(),
            crate::models::Role::User,
        );
        repo.insert(user).await.unwrap();

        let again = User::new(
            "Ada Again".to_string(),
            "ADA@example.com".to_string(),
            "hash".to_string(),
            crate::models::Role::User,
        );
        assert!(matches!(
            repo.insert(again).await,
            Err(RepositoryError::Conflict(_))
        ));
    }
}
