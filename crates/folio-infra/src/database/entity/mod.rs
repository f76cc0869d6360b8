//! SeaORM entities for the `blog_users` and `blog_posts` tables.

pub mod post;
pub mod user;
