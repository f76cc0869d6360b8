use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use folio_core::domain::Post;
use folio_core::error::RepoError;
use folio_core::policy::{PostFilter, PostOrder};
use folio_core::ports::PostRepository;

/// Post store backed by a `HashMap` keyed on slug.
#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<String, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(slug).cloned())
    }

    async fn list(&self, filter: PostFilter) -> Result<Vec<Post>, RepoError> {
        let mut posts: Vec<Post> = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();

        match filter.order {
            PostOrder::NewestCreated => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            PostOrder::RecentlyUpdated => posts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        }
        Ok(posts)
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        if posts.contains_key(&post.slug) {
            return Err(RepoError::Constraint(format!(
                "Slug '{}' is already in use",
                post.slug
            )));
        }
        posts.insert(post.slug.clone(), post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        let slug = posts
            .iter()
            .find(|(_, p)| p.id == post.id)
            .map(|(slug, _)| slug.clone())
            .ok_or(RepoError::NotFound)?;

        posts.remove(&slug);
        posts.insert(post.slug.clone(), post.clone());
        Ok(post)
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<(), RepoError> {
        self.posts
            .write()
            .await
            .remove(slug)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|_, p| p.author_id != author_id);
        Ok((before - posts.len()) as u64)
    }
}
