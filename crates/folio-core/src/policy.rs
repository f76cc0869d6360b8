//! Authorization rules for posts and users.
//!
//! Every permission decision in the system goes through this module. The
//! functions are total and pure: they take the decoded session claim
//! (`None` for anonymous requests) and the entity in question, and never
//! touch storage.
//!
//! | viewer              | view draft | edit      | delete |
//! |---------------------|------------|-----------|--------|
//! | anonymous           | no         | no        | no     |
//! | contributor, author | yes        | yes       | no     |
//! | contributor, other  | no         | no        | no     |
//! | admin               | yes        | yes       | yes    |
//!
//! Published posts are viewable by everyone.

use uuid::Uuid;

use crate::domain::{Post, Role, Viewer};
use crate::error::DomainError;

/// Ordering applied to post listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostOrder {
    /// Newest `created_at` first.
    #[default]
    NewestCreated,
    /// Most recent `updated_at` first.
    RecentlyUpdated,
}

/// Listing predicate handed to the post store.
///
/// `None` fields do not constrain the query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub published: Option<bool>,
    pub author_id: Option<Uuid>,
    pub order: PostOrder,
}

impl PostFilter {
    /// No constraint: every post.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn published_only() -> Self {
        Self {
            published: Some(true),
            ..Self::default()
        }
    }

    pub fn by_author(author_id: Uuid) -> Self {
        Self {
            author_id: Some(author_id),
            ..Self::default()
        }
    }

    /// Evaluate the predicate against a single post.
    pub fn matches(&self, post: &Post) -> bool {
        self.published.is_none_or(|p| post.published == p)
            && self.author_id.is_none_or(|a| post.author_id == a)
    }
}

/// Whether `viewer` may read `post`.
pub fn can_view(viewer: Option<&Viewer>, post: &Post) -> bool {
    if post.published {
        return true;
    }
    match viewer {
        Some(v) => v.is_admin() || v.id == post.author_id,
        None => false,
    }
}

/// Whether `viewer` may modify `post`.
pub fn can_edit(viewer: Option<&Viewer>, post: &Post) -> bool {
    match viewer {
        Some(v) => match v.role {
            Role::Admin => true,
            Role::Contributor => v.id == post.author_id,
        },
        None => false,
    }
}

/// Whether `viewer` may delete `post`. Only admins delete posts.
pub fn can_delete(viewer: Option<&Viewer>, _post: &Post) -> bool {
    can_delete_posts(viewer)
}

/// Whether `viewer` may delete posts at all; holds for every post alike.
pub fn can_delete_posts(viewer: Option<&Viewer>) -> bool {
    viewer.is_some_and(Viewer::is_admin)
}

/// Any signed-in account may author posts.
pub fn can_create_post(viewer: Option<&Viewer>) -> bool {
    viewer.is_some()
}

/// User administration is reserved to admins.
pub fn can_manage_users(viewer: Option<&Viewer>) -> bool {
    viewer.is_some_and(Viewer::is_admin)
}

/// Listing predicate for the main post index.
///
/// Anonymous viewers see published posts, contributors see their own posts
/// (published and drafts), admins see everything.
pub fn visible_posts_filter(viewer: Option<&Viewer>) -> PostFilter {
    match viewer {
        None => PostFilter::published_only(),
        Some(v) if v.is_admin() => PostFilter::all(),
        Some(v) => PostFilter::by_author(v.id),
    }
}

/// Listing predicate for the drafts view, most recently edited first.
///
/// Admins see every draft; contributors only their own.
pub fn drafts_filter(viewer: &Viewer) -> PostFilter {
    PostFilter {
        published: Some(false),
        author_id: (!viewer.is_admin()).then_some(viewer.id),
        order: PostOrder::RecentlyUpdated,
    }
}

/// Check that `actor` may delete the account `target_id`.
///
/// Non-admins are rejected outright; nobody may delete their own account.
pub fn authorize_user_deletion(actor: Option<&Viewer>, target_id: Uuid) -> Result<(), DomainError> {
    let actor = match actor {
        Some(a) if a.is_admin() => a,
        _ => return Err(DomainError::Unauthorized),
    };
    if actor.id == target_id {
        return Err(DomainError::Validation(
            "You cannot delete your own account".to_string(),
        ));
    }
    Ok(())
}
