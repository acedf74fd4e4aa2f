use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::instrument;
use uuid::Uuid;

use super::rows::PostRow;
use crate::db::DieselPool;
use crate::models::BlogPost;
use crate::repositories::{BlogRepository, LookupKey, PostQuery, RepositoryError, Result};
use crate::schema::posts;

pub struct PgBlogRepository {
    pool: DieselPool,
}

impl PgBlogRepository {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }
}

fn filtered(query: &PostQuery) -> posts::BoxedQuery<'static, Pg> {
    let mut q = posts::table.into_boxed();

    if let Some(status) = query.effective_status() {
        q = q.filter(posts::status.eq(status.as_str()));
    }
    if let Some(ref search) = query.search {
        let pattern = super::contains_pattern(search);
        q = q.filter(
            posts::title
                .ilike(pattern.clone())
                .or(posts::excerpt.ilike(pattern.clone()))
                .or(posts::content.ilike(pattern)),
        );
    }
    if let Some(ref category) = query.category {
        q = q.filter(posts::category.eq(category.clone()));
    }
    if let Some(ref tag) = query.tag {
        q = q.filter(posts::tags.contains(vec![tag.clone()]));
    }

    q
}

#[async_trait]
impl BlogRepository for PgBlogRepository {
    #[instrument(skip(self, post), fields(slug = %post.slug))]
    async fn insert(&self, post: BlogPost) -> Result<BlogPost> {
        let mut conn = self.pool.get().await?;
        let row = PostRow::try_from(&post)?;

        diesel::insert_into(posts::table)
            .values(&row)
            .returning(PostRow::as_returning())
            .get_result::<PostRow>(&mut conn)
            .await?
            .try_into()
    }

    async fn find(&self, key: &LookupKey) -> Result<Option<BlogPost>> {
        let mut conn = self.pool.get().await?;
        let base = posts::table.select(PostRow::as_select()).into_boxed();
        let q = match key {
            LookupKey::Id(id) => base.filter(posts::id.eq(*id)),
            LookupKey::Slug(slug) => base.filter(posts::slug.eq(slug.clone())),
        };

        q.first::<PostRow>(&mut conn)
            .await
            .optional()?
            .map(BlogPost::try_from)
            .transpose()
    }

    #[instrument(skip(self, query))]
    async fn list(&self, query: &PostQuery) -> Result<(Vec<BlogPost>, i64)> {
        let mut conn = self.pool.get().await?;

        let total = filtered(query).count().get_result::<i64>(&mut conn).await?;
        let rows = filtered(query)
            .select(PostRow::as_select())
            .order(posts::created_at.desc())
            .then_order_by(posts::id.asc())
            .limit(query.page.limit)
            .offset(query.page.offset())
            .load::<PostRow>(&mut conn)
            .await?;

        let items = rows
            .into_iter()
            .map(BlogPost::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok((items, total))
    }

    #[instrument(skip(self, post), fields(post_id = %post.id))]
    async fn update(&self, post: BlogPost) -> Result<BlogPost> {
        let mut conn = self.pool.get().await?;
        let row = PostRow::try_from(&post)?;

        diesel::update(posts::table.find(post.id))
            .set(&row)
            .returning(PostRow::as_returning())
            .get_result::<PostRow>(&mut conn)
            .await?
            .try_into()
    }

    async fn increment_views(&self, id: Uuid) -> Result<BlogPost> {
        let mut conn = self.pool.get().await?;

        diesel::update(posts::table.find(id))
            .set(posts::views.eq(posts::views + 1i64))
            .returning(PostRow::as_returning())
            .get_result::<PostRow>(&mut conn)
            .await?
            .try_into()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let deleted = diesel::delete(posts::table.find(id))
            .execute(&mut conn)
            .await?;

        match deleted {
            0 => Err(RepositoryError::NotFound),
            _ => Ok(()),
        }
    }
}
