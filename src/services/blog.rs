// Blog posts: listing, authoring and view counting

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    middleware::AuthenticatedUser,
    models::{
        ActivityAction, Author, BlogPost, CreatePostRequest, Listing, PageRequest, Pagination,
        PostListParams, PostStatus, UpdatePostRequest,
    },
    repositories::{BlogRepository, LookupKey, PostQuery, Visibility},
    services::activity::ActivityService,
    utils::{clean_text, slug_with_id, truncate_chars, ApiError, RequiredFields},
    validators::sanitize_tags,
};

pub const EXCERPT_LENGTH: usize = 160;
const WORDS_PER_MINUTE: usize = 200;
const DEFAULT_CATEGORY: &str = "General";
const MAX_TITLE: usize = 200;
const MAX_CATEGORY: usize = 50;

/// `"{ceil(words / 200)} min read"`
pub fn read_time(content: &str) -> String {
    let words = content.split_whitespace().count();
    format!("{} min read", words.div_ceil(WORDS_PER_MINUTE))
}

pub fn default_excerpt(content: &str) -> String {
    truncate_chars(content.trim(), EXCERPT_LENGTH)
}

fn parse_status(value: &str) -> Result<PostStatus, ApiError> {
    PostStatus::parse(value).ok_or_else(|| ApiError::BadRequest(format!("Invalid status: {}", value)))
}

fn clean_author(author: Author, fallback_name: &str) -> Author {
    Author {
        name: clean_text(Some(&author.name), 100).unwrap_or_else(|| fallback_name.to_string()),
        avatar: clean_text(author.avatar.as_ref(), 500),
        bio: clean_text(author.bio.as_ref(), 1000),
    }
}

#[derive(Clone)]
pub struct BlogService {
    posts: Arc<dyn BlogRepository>,
    activity: ActivityService,
}

impl BlogService {
    pub fn new(posts: Arc<dyn BlogRepository>, activity: ActivityService) -> Self {
        Self { posts, activity }
    }

    /// Only admins may filter by status; everybody else sees published posts
    #[instrument(skip(self, params, caller))]
    pub async fn list(
        &self,
        params: PostListParams,
        caller: Option<&AuthenticatedUser>,
    ) -> Result<Listing<BlogPost>, ApiError> {
        let status = params.status.as_deref().map(parse_status).transpose()?;
        let visibility = if caller.is_some_and(AuthenticatedUser::is_admin) {
            Visibility::Everything
        } else {
            Visibility::PublishedOnly
        };

        let query = PostQuery {
            search: params.search.clone().filter(|s| !s.trim().is_empty()),
            category: params.category.clone(),
            tag: params.tag.clone(),
            status,
            visibility,
            page: PageRequest::new(params.page, params.limit),
        };

        let (posts, total) = self.posts.list(&query).await?;

        Ok(Listing {
            items: posts,
            pagination: Pagination::new(query.page, total),
            filters: json!({
                "search": params.search,
                "category": params.category,
                "tag": params.tag,
                "status": query.effective_status(),
            }),
        })
    }

    #[instrument(skip(self, request, caller), fields(user_id = %caller.user_id))]
    pub async fn create(
        &self,
        request: CreatePostRequest,
        caller: &AuthenticatedUser,
    ) -> Result<BlogPost, ApiError> {
        caller.require_author()?;

        let mut required = RequiredFields::new();
        let title = required.text("title", request.title.as_ref());
        let content = required.text("content", request.content.as_ref());
        let missing = required.into_missing();
        if !missing.is_empty() {
            return Err(ApiError::validation(missing));
        }
        request.validate()?;

        let status = match request.status.as_deref() {
            Some(value) => parse_status(value)?,
            None => PostStatus::Draft,
        };

        let id = Uuid::new_v4();
        let now = Utc::now();
        let title = truncate_chars(&title, MAX_TITLE);
        let post = BlogPost {
            id,
            slug: slug_with_id(&title, id),
            title,
            excerpt: clean_text(request.excerpt.as_ref(), 500)
                .unwrap_or_else(|| default_excerpt(&content)),
            read_time: read_time(&content),
            content,
            status,
            category: clean_text(request.category.as_ref(), MAX_CATEGORY)
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            tags: sanitize_tags(request.tags.unwrap_or_default()),
            featured_image: clean_text(request.featured_image.as_ref(), 500),
            author: clean_author(request.author.unwrap_or_default(), &caller.name),
            views: 0,
            comments: 0,
            created_by: caller.user_id,
            published_at: (status == PostStatus::Published).then_some(now),
            created_at: now,
            updated_at: now,
        };

        let post = self.posts.insert(post).await?;
        info!("Created post {} ({})", post.id, post.slug);

        self.activity
            .record(
                ActivityAction::PostCreated,
                caller.user_id,
                post.id.to_string(),
                json!({ "title": post.title, "status": post.status }),
            )
            .await;

        Ok(post)
    }

    /// Drafts are hidden unless the caller owns the post or is an admin.
    /// Reading a published post counts a view.
    #[instrument(skip(self, caller))]
    pub async fn get(
        &self,
        key: &LookupKey,
        caller: Option<&AuthenticatedUser>,
    ) -> Result<BlogPost, ApiError> {
        let post = self
            .posts
            .find(key)
            .await?
            .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

        if !post.is_published() {
            return if caller.is_some_and(|c| c.can_manage(post.created_by)) {
                Ok(post)
            } else {
                Err(ApiError::NotFound("Post not found".to_string()))
            };
        }

        Ok(self.posts.increment_views(post.id).await?)
    }

    async fn find_managed(
        &self,
        key: &LookupKey,
        caller: &AuthenticatedUser,
    ) -> Result<BlogPost, ApiError> {
        let post = self
            .posts
            .find(key)
            .await?
            .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

        if !caller.can_manage(post.created_by) {
            return Err(ApiError::Forbidden(
                "You can only modify your own posts".to_string(),
            ));
        }
        Ok(post)
    }

    #[instrument(skip(self, request, caller), fields(user_id = %caller.user_id))]
    pub async fn update(
        &self,
        key: &LookupKey,
        request: UpdatePostRequest,
        caller: &AuthenticatedUser,
    ) -> Result<BlogPost, ApiError> {
        request.validate()?;
        let mut post = self.find_managed(key, caller).await?;
        let mut changed = Vec::new();

        if let Some(title) = clean_text(request.title.as_ref(), MAX_TITLE) {
            if title != post.title {
                post.slug = slug_with_id(&title, post.id);
                post.title = title;
                changed.push("title");
            }
        }
        if let Some(content) = clean_text(request.content.as_ref(), usize::MAX) {
            if content != post.content {
                post.read_time = read_time(&content);
                post.content = content;
                changed.push("content");
            }
        }
        if let Some(excerpt) = request.excerpt {
            post.excerpt = clean_text(Some(&excerpt), 500)
                .unwrap_or_else(|| default_excerpt(&post.content));
            changed.push("excerpt");
        }
        if let Some(value) = request.status {
            let status = parse_status(&value)?;
            if status == PostStatus::Published && post.published_at.is_none() {
                post.published_at = Some(Utc::now());
            }
            post.status = status;
            changed.push("status");
        }
        if let Some(category) = clean_text(request.category.as_ref(), MAX_CATEGORY) {
            post.category = category;
            changed.push("category");
        }
        if let Some(tags) = request.tags {
            post.tags = sanitize_tags(tags);
            changed.push("tags");
        }
        if let Some(image) = request.featured_image {
            post.featured_image = clean_text(Some(&image), 500);
            changed.push("featuredImage");
        }
        if let Some(author) = request.author {
            let fallback = post.author.name.clone();
            post.author = clean_author(author, &fallback);
            changed.push("author");
        }

        post.updated_at = Utc::now();
        let post = self.posts.update(post).await?;

        self.activity
            .record(
                ActivityAction::PostUpdated,
                caller.user_id,
                post.id.to_string(),
                json!({ "fields": changed }),
            )
            .await;

        Ok(post)
    }

    #[instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn delete(&self, key: &LookupKey, caller: &AuthenticatedUser) -> Result<Uuid, ApiError> {
        let post = self.find_managed(key, caller).await?;
        self.posts.delete(post.id).await?;
        info!("Deleted post {}", post.id);

        self.activity
            .record(
                ActivityAction::PostDeleted,
                caller.user_id,
                post.id.to_string(),
                json!({ "title": post.title }),
            )
            .await;

        Ok(post.id)
    }
}
