use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Role, User, Viewer};
use crate::error::DomainError;
use crate::policy;
use crate::ports::{PasswordService, PostRepository, UserRepository};

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Input for a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Option<Role>,
}

/// Admin-only changes to an account.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub role: Option<Role>,
}

/// Outcome of a user deletion.
#[derive(Debug, Clone)]
pub struct DeletedUser {
    pub user: User,
    pub posts_removed: u64,
}

/// Account use cases.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            users,
            posts,
            passwords,
        }
    }

    /// Self-service registration. Admin accounts may only be requested by an admin.
    pub async fn register(
        &self,
        actor: Option<&Viewer>,
        account: NewAccount,
    ) -> Result<User, DomainError> {
        if account.role == Some(Role::Admin) && !policy::can_manage_users(actor) {
            return Err(DomainError::Unauthorized);
        }
        self.create_account(account).await
    }

    /// Admin-created account.
    pub async fn create(
        &self,
        actor: Option<&Viewer>,
        account: NewAccount,
    ) -> Result<User, DomainError> {
        if !policy::can_manage_users(actor) {
            return Err(DomainError::Unauthorized);
        }
        self.create_account(account).await
    }

    /// Exchange credentials for the matching account.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let email = normalize_email(email);
        let Some(user) = self.users.find_by_email(&email).await? else {
            tracing::debug!("Sign-in rejected: unknown account");
            return Err(DomainError::Unauthorized);
        };

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if !valid {
            tracing::debug!(user_id = %user.id, "Sign-in rejected: bad password");
            return Err(DomainError::Unauthorized);
        }

        Ok(user)
    }

    pub async fn find(&self, id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    pub async fn list(&self, actor: Option<&Viewer>) -> Result<Vec<User>, DomainError> {
        if !policy::can_manage_users(actor) {
            return Err(DomainError::Unauthorized);
        }
        Ok(self.users.list().await?)
    }

    /// Rename an account or change its role. Admins cannot change their own role.
    pub async fn update(
        &self,
        actor: Option<&Viewer>,
        id: Uuid,
        changes: UserChanges,
    ) -> Result<User, DomainError> {
        let actor = match actor {
            Some(a) if policy::can_manage_users(Some(a)) => a,
            _ => return Err(DomainError::Unauthorized),
        };

        let mut user = self.find(id).await?;

        if let Some(name) = changes.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DomainError::Validation("Name cannot be empty".to_string()));
            }
            user.name = name.to_string();
        }

        if let Some(role) = changes.role {
            if actor.id == user.id && role != user.role {
                return Err(DomainError::Validation(
                    "You cannot change your own role".to_string(),
                ));
            }
            user.role = role;
        }

        user.updated_at = chrono::Utc::now();
        let user = self.users.update(user).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "User updated");
        Ok(user)
    }

    /// Delete an account, removing its posts only when `cascade` is set.
    ///
    /// Without cascading, the posts stay and render with an unknown author.
    pub async fn delete(
        &self,
        actor: Option<&Viewer>,
        id: Uuid,
        cascade: bool,
    ) -> Result<DeletedUser, DomainError> {
        policy::authorize_user_deletion(actor, id)?;

        let user = self.find(id).await?;

        let posts_removed = if cascade {
            self.posts.delete_by_author(id).await?
        } else {
            0
        };

        self.users.delete(id).await?;
        tracing::info!(user_id = %id, cascade, posts_removed, "User deleted");

        Ok(DeletedUser {
            user,
            posts_removed,
        })
    }

    /// Make sure an admin account exists for `email`, creating it if needed.
    ///
    /// An existing account is returned unchanged.
    pub async fn ensure_admin(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<User, DomainError> {
        if let Some(existing) = self.users.find_by_email(&normalize_email(email)).await? {
            return Ok(existing);
        }
        let user = self
            .create_account(NewAccount {
                email: email.to_string(),
                name: name.to_string(),
                password: password.to_string(),
                role: Some(Role::Admin),
            })
            .await?;
        tracing::info!(user_id = %user.id, "Bootstrap admin created");
        Ok(user)
    }

    async fn create_account(&self, account: NewAccount) -> Result<User, DomainError> {
        let email = normalize_email(&account.email);
        let name = account.name.trim();

        if email.is_empty() || name.is_empty() || account.password.is_empty() {
            return Err(DomainError::Validation("Missing required fields".to_string()));
        }
        if !email.contains('@') {
            return Err(DomainError::Validation("Invalid email address".to_string()));
        }
        if account.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::Duplicate("User already exists".to_string()));
        }

        let password_hash = self
            .passwords
            .hash(&account.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let user = User::new(
            email,
            name.to_string(),
            password_hash,
            account.role.unwrap_or_default(),
        );
        let user = self.users.insert(user).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }
}

/// Emails are compared case-insensitively.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
