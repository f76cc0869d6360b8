//! Domain entities - the core business objects.

mod user;

mod post;
mod slug;

pub use post::{NewPost, Post, PostChanges, SeoMetadata};
pub use slug::{
    derive_excerpt, is_reserved_slug, normalize_tags, slugify, EXCERPT_LENGTH, RESERVED_SLUGS,
};
pub use user::{Role, User, Viewer};
