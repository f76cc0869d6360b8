//! Application state - shared across all handlers.

use std::sync::Arc;

use folio_core::ports::{PasswordService, PostRepository, TokenService, UserRepository};
use folio_core::services::{PostService, UserService};
use folio_infra::{
    Argon2PasswordService, InMemoryPostRepository, InMemoryUserRepository, JwtTokenService,
};

#[cfg(feature = "postgres")]
use folio_infra::{PostgresPostRepository, PostgresUserRepository, database};

use crate::config::AppConfig;

/// Shared application state.
///
/// Handlers receive everything they need from here; there is no ambient
/// session state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub users: UserService,
    pub tokens: Arc<dyn TokenService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build the application state, falling back to in-memory storage when
    /// no database is configured or reachable.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            match database::connect(db_config).await {
                Ok(conn) => {
                    let users = Arc::new(PostgresUserRepository::new(conn.clone()));
                    let posts = Arc::new(PostgresPostRepository::new(conn));
                    tracing::info!("Application state initialized (postgres)");
                    return Self::from_parts(users, posts, config);
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                }
            }
        } else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }

        #[cfg(not(feature = "postgres"))]
        tracing::info!("Running without postgres feature - using in-memory repositories");

        Self::in_memory(config)
    }

    /// State backed by in-memory repositories.
    pub fn in_memory(config: &AppConfig) -> Self {
        Self::from_parts(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryPostRepository::new()),
            config,
        )
    }

    fn from_parts(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        config: &AppConfig,
    ) -> Self {
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));

        Self {
            posts: PostService::new(posts.clone(), users.clone()),
            users: UserService::new(users, posts, passwords),
            tokens,
            config: Arc::new(config.clone()),
        }
    }

    /// Seed the configured bootstrap admin, if any.
    pub async fn bootstrap_admin(&self) {
        let Some(admin) = &self.config.bootstrap_admin else {
            return;
        };
        if let Err(e) = self
            .users
            .ensure_admin(&admin.email, &admin.name, &admin.password)
            .await
        {
            tracing::error!("Failed to seed bootstrap admin: {}", e);
        }
    }
}
