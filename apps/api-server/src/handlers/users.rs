//! User administration handlers. All routes require an admin session.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use uuid::Uuid;

use folio_core::domain::User;
use folio_core::services::{NewAccount, UserChanges};
use folio_shared::dto::{CreateUserRequest, DeleteUserQuery, UpdateUserRequest, UserResponse};

use super::auth::parse_role;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

pub(super) fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role.to_string(),
        created_at: user.created_at,
    }
}

#[derive(Serialize)]
struct DeletedUserResponse {
    message: String,
    posts_removed: u64,
}

/// GET /api/users
pub async fn list_users(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let users = state.users.list(Some(&identity.viewer())).await?;
    let body: Vec<UserResponse> = users.iter().map(user_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/users
pub async fn create_user(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = state
        .users
        .create(
            Some(&identity.viewer()),
            NewAccount {
                email: req.email,
                name: req.name,
                password: req.password,
                role: parse_role(req.role.as_deref())?,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(user_response(&user)))
}

/// PATCH /api/users/{id}
pub async fn update_user(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = state
        .users
        .update(
            Some(&identity.viewer()),
            path.into_inner(),
            UserChanges {
                name: req.name,
                role: parse_role(req.role.as_deref())?,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(user_response(&user)))
}

/// DELETE /api/users?id={uuid}&cascade={bool}
///
/// Posts are preserved unless `cascade=true`.
pub async fn delete_user(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<DeleteUserQuery>,
) -> AppResult<HttpResponse> {
    let DeleteUserQuery { id, cascade } = query.into_inner();
    let deleted = state
        .users
        .delete(Some(&identity.viewer()), id, cascade)
        .await?;

    Ok(HttpResponse::Ok().json(DeletedUserResponse {
        message: format!("User {} deleted", deleted.user.email),
        posts_removed: deleted.posts_removed,
    }))
}
