//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Request to register a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Credential exchange for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Response containing a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// A user's public information. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Admin request to create an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Admin request to rename an account or change its role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Query string of `DELETE /users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteUserQuery {
    pub id: Uuid,
    /// Also delete the user's posts. Defaults to preserving them.
    #[serde(default)]
    pub cascade: bool,
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// Optional SEO fields of a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Derived from the title when omitted.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(flatten)]
    pub seo: SeoFields,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub published: Option<bool>,
    /// Same flat fields as creation; each one present replaces the stored value.
    #[serde(flatten)]
    pub seo: SeoFields,
}

/// Listing entry - everything but the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
    pub slug: String,
    pub tags: Vec<String>,
    pub published: bool,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A full post with its author's display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub content: String,
    pub author_name: String,
    #[serde(flatten)]
    pub seo: SeoFields,
}

// ---------------------------------------------------------------------------
// Snippets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnippetRequest {
    pub code: String,
    pub language: String,
    #[serde(default, rename = "userInputs", alias = "user_inputs")]
    pub user_inputs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnippetResponse {
    pub output: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_accepts_flat_seo_fields() {
        let req: UpdatePostRequest = serde_json::from_value(serde_json::json!({
            "title": "Renamed",
            "meta_title": "Search title",
            "og_image": "https://cdn.example.dev/cover.png",
        }))
        .unwrap();

        assert_eq!(req.title.as_deref(), Some("Renamed"));
        assert_eq!(req.seo.meta_title.as_deref(), Some("Search title"));
        assert_eq!(req.seo.meta_description, None);
        assert_eq!(
            req.seo.og_image.as_deref(),
            Some("https://cdn.example.dev/cover.png")
        );
    }

    #[test]
    fn test_empty_update_changes_nothing() {
        let req: UpdatePostRequest = serde_json::from_str("{}").unwrap();
        assert!(req.title.is_none());
        assert_eq!(req.seo, SeoFields::default());
    }
}
