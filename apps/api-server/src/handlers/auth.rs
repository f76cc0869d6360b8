//! Authentication handlers.

use actix_web::{
    HttpResponse,
    cookie::{Cookie, SameSite, time::Duration},
    web,
};

use folio_core::domain::{Role, User};
use folio_core::services::NewAccount;
use folio_shared::MessageResponse;
use folio_shared::dto::{AuthResponse, RegisterRequest, SignInRequest};

use super::users::user_response;
use crate::middleware::auth::{Identity, OptionalIdentity, SESSION_COOKIE};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::seconds(max_age_secs))
        .finish()
}

/// Issue a session for `user`: token in the body, and the same token as a cookie.
fn start_session(
    state: &AppState,
    user: &User,
    response: &mut actix_web::HttpResponseBuilder,
) -> AppResult<HttpResponse> {
    let token = state
        .tokens
        .generate_token(user.id, &user.email, user.role)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let lifetime = state.tokens.expiration_seconds();

    Ok(response
        .cookie(session_cookie(&token, lifetime, state.config.production))
        .json(AuthResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: lifetime.max(0) as u64,
            user: user_response(user),
        }))
}

pub(super) fn parse_role(role: Option<&str>) -> AppResult<Option<Role>> {
    role.map(|r| r.parse::<Role>())
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

/// POST /api/auth/register
///
/// Creates a contributor account and signs it in. Requesting the admin role
/// requires an admin session.
pub async fn register(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let actor = identity.viewer();

    let user = state
        .users
        .register(
            actor.as_ref(),
            NewAccount {
                email: req.email,
                name: req.name,
                password: req.password,
                role: parse_role(req.role.as_deref())?,
            },
        )
        .await?;

    // An admin creating an account on someone's behalf keeps their own session
    if actor.is_some() {
        return Ok(HttpResponse::Created().json(user_response(&user)));
    }

    start_session(&state, &user, &mut HttpResponse::Created())
}

/// POST /api/auth/signin
pub async fn signin(
    state: web::Data<AppState>,
    body: web::Json<SignInRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = state.users.authenticate(&req.email, &req.password).await?;

    tracing::info!(user_id = %user.id, "User signed in");
    start_session(&state, &user, &mut HttpResponse::Ok())
}

/// POST /api/auth/signout
///
/// Tokens are stateless; signing out only clears the session cookie.
pub async fn signout() -> HttpResponse {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();

    HttpResponse::Ok()
        .cookie(cookie)
        .json(MessageResponse::new("Signed out"))
}

/// GET /api/auth/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state.users.find(identity.user_id).await.map_err(|e| match e {
        folio_core::DomainError::NotFound { .. } => AppError::Unauthorized,
        other => other.into(),
    })?;

    Ok(HttpResponse::Ok().json(user_response(&user)))
}
