use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::instrument;
use uuid::Uuid;

use super::rows::{ServicePatchRow, ServiceRow};
use crate::db::DieselPool;
use crate::models::{Service, ServicePatch, ServiceStatus};
use crate::repositories::{LookupKey, RepositoryError, Result, ServiceQuery, ServiceRepository};
use crate::schema::services;

pub struct PgServiceRepository {
    pool: DieselPool,
}

impl PgServiceRepository {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }
}

fn filtered(query: &ServiceQuery) -> services::BoxedQuery<'static, Pg> {
    let mut q = services::table.into_boxed();

    if query.hide_inactive {
        q = q.filter(services::status.ne(ServiceStatus::Inactive.as_str()));
    }
    if let Some(ref search) = query.search {
        let pattern = super::contains_pattern(search);
        q = q.filter(
            services::title
                .ilike(pattern.clone())
                .or(services::description.ilike(pattern)),
        );
    }
    if let Some(service_type) = query.service_type {
        q = q.filter(services::service_type.eq(service_type.as_str()));
    }
    if let Some(status) = query.status {
        q = q.filter(services::status.eq(status.as_str()));
    }
    if let Some(featured) = query.featured {
        q = q.filter(services::featured.eq(featured));
    }

    q
}

fn into_services(rows: Vec<ServiceRow>) -> Result<Vec<Service>> {
    rows.into_iter().map(Service::try_from).collect()
}

#[async_trait]
impl ServiceRepository for PgServiceRepository {
    #[instrument(skip(self, service), fields(slug = %service.slug))]
    async fn insert(&self, service: Service) -> Result<Service> {
        let mut conn = self.pool.get().await?;
        let row = ServiceRow::try_from(&service)?;

        diesel::insert_into(services::table)
            .values(&row)
            .returning(ServiceRow::as_returning())
            .get_result::<ServiceRow>(&mut conn)
            .await?
            .try_into()
    }

    async fn find(&self, key: &LookupKey) -> Result<Option<Service>> {
        let mut conn = self.pool.get().await?;
        let base = services::table.select(ServiceRow::as_select()).into_boxed();
        let q = match key {
            LookupKey::Id(id) => base.filter(services::id.eq(*id)),
            LookupKey::Slug(slug) => base.filter(services::slug.eq(slug.clone())),
        };

        q.first::<ServiceRow>(&mut conn)
            .await
            .optional()?
            .map(Service::try_from)
            .transpose()
    }

    #[instrument(skip(self, query))]
    async fn list(&self, query: &ServiceQuery) -> Result<(Vec<Service>, i64)> {
        let mut conn = self.pool.get().await?;

        let total = filtered(query).count().get_result::<i64>(&mut conn).await?;
        let rows = filtered(query)
            .select(ServiceRow::as_select())
            .order(services::created_at.desc())
            .then_order_by(services::id.asc())
            .limit(query.page.limit)
            .offset(query.page.offset())
            .load::<ServiceRow>(&mut conn)
            .await?;

        Ok((into_services(rows)?, total))
    }

    #[instrument(skip(self, service), fields(service_id = %service.id))]
    async fn update(&self, service: Service) -> Result<Service> {
        let mut conn = self.pool.get().await?;
        let row = ServiceRow::try_from(&service)?;

        diesel::update(services::table.find(service.id))
            .set(&row)
            .returning(ServiceRow::as_returning())
            .get_result::<ServiceRow>(&mut conn)
            .await?
            .try_into()
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Service>> {
        let mut conn = self.pool.get().await?;
        let rows = services::table
            .filter(services::id.eq_any(ids.to_vec()))
            .select(ServiceRow::as_select())
            .load::<ServiceRow>(&mut conn)
            .await?;

        into_services(rows)
    }

    #[instrument(skip(self, ids, patch), fields(count = ids.len()))]
    async fn update_many(
        &self,
        ids: &[Uuid],
        patch: &ServicePatch,
        at: DateTime<Utc>,
    ) -> Result<u64> {
        let mut conn = self.pool.get().await?;
        let changes = ServicePatchRow {
            status: patch.status.map(|s| s.as_str()),
            featured: patch.featured,
            service_type: patch.service_type.map(|t| t.as_str()),
            updated_at: at,
        };

        let modified = diesel::update(services::table.filter(services::id.eq_any(ids.to_vec())))
            .set(&changes)
            .execute(&mut conn)
            .await?;

        Ok(modified as u64)
    }

    #[instrument(skip(self, services), fields(count = services.len()))]
    async fn save_many(&self, services: Vec<Service>) -> Result<u64> {
        let rows = services
            .iter()
            .map(ServiceRow::try_from)
            .collect::<Result<Vec<_>>>()?;
        let mut conn = self.pool.get().await?;

        let modified = conn
            .build_transaction()
            .run::<_, diesel::result::Error, _>(|conn| {
                Box::pin(async move {
                    let mut modified = 0;
                    for row in &rows {
                        let touched = diesel::update(services::table.find(row.id))
                            .set(row)
                            .execute(conn)
                            .await?;
                        if touched == 0 {
                            // Rolls back the rows already written
                            return Err(diesel::result::Error::NotFound);
                        }
                        modified += touched;
                    }
                    Ok(modified)
                })
            })
            .await?;

        Ok(modified as u64)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let deleted = diesel::delete(services::table.find(id))
            .execute(&mut conn)
            .await?;

        match deleted {
            0 => Err(RepositoryError::NotFound),
            _ => Ok(()),
        }
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64> {
        let mut conn = self.pool.get().await?;
        let deleted = diesel::delete(services::table.filter(services::id.eq_any(ids.to_vec())))
            .execute(&mut conn)
            .await?;

        Ok(deleted as u64)
    }
}
