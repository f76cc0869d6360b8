//! In-memory repositories.
//!
//! Used when no database is configured and as the backing store for tests.
//! Data is lost on process restart.

mod posts;
mod users;

pub use posts::InMemoryPostRepository;
pub use users::InMemoryUserRepository;
