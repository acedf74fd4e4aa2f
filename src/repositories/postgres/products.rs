use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::instrument;
use uuid::Uuid;

use super::rows::ProductRow;
use crate::db::DieselPool;
use crate::models::{Module, Product, ProductStatus};
use crate::repositories::{
    LookupKey, ProductQuery, ProductRepository, RepositoryError, Result, SortField, Visibility,
};
use crate::schema::products;

pub struct PgProductRepository {
    pool: DieselPool,
}

impl PgProductRepository {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    /// After a guarded write matched nothing, tell a missing row from a stale version
    async fn version_or_missing(&self, id: Uuid) -> RepositoryError {
        let exists = match self.pool.get().await {
            Ok(mut conn) => products::table
                .find(id)
                .select(products::id)
                .first::<Uuid>(&mut conn)
                .await
                .optional(),
            Err(e) => return e.into(),
        };

        match exists {
            Ok(Some(_)) => RepositoryError::VersionConflict,
            Ok(None) => RepositoryError::NotFound,
            Err(e) => e.into(),
        }
    }
}

fn filtered(query: &ProductQuery) -> products::BoxedQuery<'static, Pg> {
    let mut q = products::table.into_boxed();

    if let Visibility::PublishedOrOwner(owner) = query.visibility {
        q = q.filter(
            products::status
                .eq(ProductStatus::Published.as_str())
                .or(products::created_by.eq(owner)),
        );
    }
    if let Some(status) = query.effective_status() {
        q = q.filter(products::status.eq(status.as_str()));
    }
    if let Some(ref search) = query.search {
        let pattern = super::contains_pattern(search);
        q = q.filter(
            products::title
                .ilike(pattern.clone())
                .or(products::description.ilike(pattern.clone()))
                .or(products::category.ilike(pattern)),
        );
    }
    if let Some(product_type) = query.product_type {
        q = q.filter(products::product_type.eq(product_type.as_str()));
    }
    if let Some(ref category) = query.category {
        q = q.filter(products::category.eq(category.clone()));
    }
    if let Some(difficulty) = query.difficulty {
        q = q.filter(products::difficulty.eq(difficulty.as_str()));
    }
    if let Some(featured) = query.featured {
        q = q.filter(products::featured.eq(featured));
    }

    q
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    #[instrument(skip(self, product), fields(slug = %product.slug))]
    async fn insert(&self, product: Product) -> Result<Product> {
        let mut conn = self.pool.get().await?;
        let row = ProductRow::try_from(&product)?;

        diesel::insert_into(products::table)
            .values(&row)
            .returning(ProductRow::as_returning())
            .get_result::<ProductRow>(&mut conn)
            .await?
            .try_into()
    }

    async fn find(&self, key: &LookupKey) -> Result<Option<Product>> {
        let mut conn = self.pool.get().await?;
        let base = products::table.select(ProductRow::as_select()).into_boxed();
        let q = match key {
            LookupKey::Id(id) => base.filter(products::id.eq(*id)),
            LookupKey::Slug(slug) => base.filter(products::slug.eq(slug.clone())),
        };

        q.first::<ProductRow>(&mut conn)
            .await
            .optional()?
            .map(Product::try_from)
            .transpose()
    }

    #[instrument(skip(self, query))]
    async fn list(&self, query: &ProductQuery) -> Result<(Vec<Product>, i64)> {
        let mut conn = self.pool.get().await?;

        let total = filtered(query).count().get_result::<i64>(&mut conn).await?;

        let q = filtered(query).select(ProductRow::as_select());
        let q = match (query.sort.field, query.sort.ascending) {
            (SortField::CreatedAt, true) => q.order(products::created_at.asc()),
            (SortField::CreatedAt, false) => q.order(products::created_at.desc()),
            (SortField::Price, true) => q.order(products::price.asc()),
            (SortField::Price, false) => q.order(products::price.desc()),
            (SortField::Title, true) => q.order(products::title.asc()),
            (SortField::Title, false) => q.order(products::title.desc()),
            (SortField::Enrollments, true) => q.order(products::enrollments.asc()),
            (SortField::Enrollments, false) => q.order(products::enrollments.desc()),
            (SortField::Rating, true) => q.order(products::rating.asc()),
            (SortField::Rating, false) => q.order(products::rating.desc()),
        };

        let rows = q
            .then_order_by(products::id.asc())
            .limit(query.page.limit)
            .offset(query.page.offset())
            .load::<ProductRow>(&mut conn)
            .await?;

        let items = rows
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok((items, total))
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn update(&self, mut product: Product, expected_version: i64) -> Result<Product> {
        let mut conn = self.pool.get().await?;
        product.version = expected_version + 1;
        let row = ProductRow::try_from(&product)?;

        let updated = diesel::update(
            products::table
                .filter(products::id.eq(product.id))
                .filter(products::version.eq(expected_version)),
        )
        .set(&row)
        .returning(ProductRow::as_returning())
        .get_result::<ProductRow>(&mut conn)
        .await
        .optional()?;
        drop(conn);

        match updated {
            Some(row) => row.try_into(),
            None => Err(self.version_or_missing(product.id).await),
        }
    }

    #[instrument(skip(self, modules), fields(module_count = modules.len()))]
    async fn replace_modules(
        &self,
        id: Uuid,
        expected_version: i64,
        modules: Vec<Module>,
        at: DateTime<Utc>,
    ) -> Result<Product> {
        let mut conn = self.pool.get().await?;
        let modules = serde_json::to_value(&modules)?;

        let updated = diesel::update(
            products::table
                .filter(products::id.eq(id))
                .filter(products::version.eq(expected_version)),
        )
        .set((
            products::modules.eq(modules),
            products::updated_at.eq(at),
            products::curriculum_updated_at.eq(Some(at)),
            products::version.eq(products::version + 1i64),
        ))
        .returning(ProductRow::as_returning())
        .get_result::<ProductRow>(&mut conn)
        .await
        .optional()?;
        drop(conn);

        match updated {
            Some(row) => row.try_into(),
            None => Err(self.version_or_missing(id).await),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let deleted = diesel::delete(products::table.find(id))
            .execute(&mut conn)
            .await?;

        match deleted {
            0 => Err(RepositoryError::NotFound),
            _ => Ok(()),
        }
    }
}
