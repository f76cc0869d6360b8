//! Use cases: repositories combined with the authorization rules.
//!
//! HTTP handlers call into these services rather than into repositories so
//! that every enforcement point applies the same rules from [`crate::policy`].

mod posts;
mod users;

pub use posts::{PostService, UNKNOWN_AUTHOR};
pub use users::{DeletedUser, NewAccount, UserChanges, UserService, MIN_PASSWORD_LENGTH};
