use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, User};
use crate::error::RepoError;
use crate::policy::PostFilter;

/// Credential store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    /// Find a user by their (normalized) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// All users, newest first.
    async fn list(&self) -> Result<Vec<User>, RepoError>;

    /// Insert a new user. A duplicate email is a `RepoError::Constraint`.
    async fn insert(&self, user: User) -> Result<User, RepoError>;

    /// Overwrite an existing user, keyed by id.
    async fn update(&self, user: User) -> Result<User, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Post store. Last write wins; no ordering guarantees beyond the filter's.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    async fn list(&self, filter: PostFilter) -> Result<Vec<Post>, RepoError>;

    /// Insert a new post. A duplicate slug is a `RepoError::Constraint`.
    async fn insert(&self, post: Post) -> Result<Post, RepoError>;

    /// Overwrite an existing post, keyed by id.
    async fn update(&self, post: Post) -> Result<Post, RepoError>;

    async fn delete_by_slug(&self, slug: &str) -> Result<(), RepoError>;

    /// Remove every post written by `author_id`, returning how many went.
    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;
}
