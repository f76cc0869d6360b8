use std::sync::Arc;

use crate::domain::{derive_excerpt, is_reserved_slug, slugify, NewPost, Post, PostChanges, Viewer};
use crate::error::DomainError;
use crate::policy::{self, PostFilter};
use crate::ports::{PostRepository, UserRepository};

/// Display name used when a post's author no longer exists.
pub const UNKNOWN_AUTHOR: &str = "Unknown author";

/// Post use cases.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    /// Posts on the main index for this viewer.
    pub async fn list(&self, viewer: Option<&Viewer>) -> Result<Vec<Post>, DomainError> {
        let filter = policy::visible_posts_filter(viewer);
        Ok(self.posts.list(filter).await?)
    }

    /// Unpublished posts the viewer may work on.
    pub async fn drafts(&self, viewer: Option<&Viewer>) -> Result<Vec<Post>, DomainError> {
        let viewer = viewer.ok_or(DomainError::Unauthorized)?;
        Ok(self.posts.list(policy::drafts_filter(viewer)).await?)
    }

    /// Every published post, newest first.
    pub async fn published(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.list(PostFilter::published_only()).await?)
    }

    /// Fetch a single post. Posts the viewer may not see are reported as missing.
    pub async fn get(&self, viewer: Option<&Viewer>, slug: &str) -> Result<Post, DomainError> {
        match self.posts.find_by_slug(slug).await? {
            Some(post) if policy::can_view(viewer, &post) => Ok(post),
            _ => Err(DomainError::post_not_found(slug)),
        }
    }

    pub async fn create(&self, viewer: Option<&Viewer>, input: NewPost) -> Result<Post, DomainError> {
        let author = match viewer {
            Some(v) if policy::can_create_post(viewer) => v,
            _ => return Err(DomainError::Unauthorized),
        };

        if input.title.trim().is_empty() || input.content.trim().is_empty() {
            return Err(DomainError::Validation("Missing required fields".to_string()));
        }

        let slug = slugify(input.slug.as_deref().unwrap_or(&input.title));
        if slug.is_empty() {
            return Err(DomainError::Validation(
                "Slug must contain at least one letter or digit".to_string(),
            ));
        }
        if is_reserved_slug(&slug) {
            return Err(DomainError::Validation(format!(
                "Slug '{slug}' is reserved; choose another title or slug"
            )));
        }

        // The author must still exist when the post is written.
        if self.users.find_by_id(author.id).await?.is_none() {
            return Err(DomainError::Unauthorized);
        }

        if self.posts.find_by_slug(&slug).await?.is_some() {
            return Err(DomainError::Duplicate(format!("Slug '{slug}' is already in use")));
        }

        let post = self.posts.insert(Post::new(author.id, slug, input)).await?;
        tracing::info!(slug = %post.slug, author_id = %post.author_id, published = post.published, "Post created");
        Ok(post)
    }

    pub async fn update(
        &self,
        viewer: Option<&Viewer>,
        slug: &str,
        mut changes: PostChanges,
    ) -> Result<Post, DomainError> {
        if viewer.is_none() {
            return Err(DomainError::Unauthorized);
        }

        let mut post = self.get(viewer, slug).await?;
        if !policy::can_edit(viewer, &post) {
            return Err(DomainError::Forbidden(
                "You can only edit your own posts".to_string(),
            ));
        }

        let blank = |s: &Option<String>| s.as_deref().is_some_and(|v| v.trim().is_empty());
        if blank(&changes.title) || blank(&changes.content) {
            return Err(DomainError::Validation(
                "Title and content cannot be empty".to_string(),
            ));
        }

        if let Some(excerpt) = changes.excerpt.take() {
            let content = changes.content.as_deref().unwrap_or(&post.content);
            changes.excerpt = Some(derive_excerpt(Some(&excerpt), content));
        } else if let Some(content) = changes.content.as_deref() {
            // A derived excerpt follows the content; a hand-written one stays.
            if post.excerpt == derive_excerpt(None, &post.content) {
                changes.excerpt = Some(derive_excerpt(None, content));
            }
        }

        post.apply(changes);
        let post = self.posts.update(post).await?;
        tracing::info!(slug = %post.slug, published = post.published, "Post updated");
        Ok(post)
    }

    /// Delete a post. Non-admins are rejected before the slug is looked up,
    /// so the outcome never reveals whether a draft exists.
    pub async fn delete(&self, viewer: Option<&Viewer>, slug: &str) -> Result<(), DomainError> {
        if !policy::can_delete_posts(viewer) {
            return Err(DomainError::Unauthorized);
        }

        if self.posts.find_by_slug(slug).await?.is_none() {
            return Err(DomainError::post_not_found(slug));
        }

        self.posts.delete_by_slug(slug).await?;
        tracing::info!(slug = %slug, "Post deleted");
        Ok(())
    }

    /// Display name of the post's author, or [`UNKNOWN_AUTHOR`] if the account is gone.
    pub async fn author_name(&self, post: &Post) -> Result<String, DomainError> {
        Ok(self
            .users
            .find_by_id(post.author_id)
            .await?
            .map(|u| u.name)
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()))
    }
}
