//! HTTP-level tests against in-memory state.

use actix_web::{App, http::StatusCode, http::header, test, web};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

use folio_core::domain::{Role, User};
use folio_infra::{InMemoryRateLimiter, RateLimitConfig};

use super::{RouteOptions, configure_routes};
use crate::config::AppConfig;
use crate::middleware::auth::SESSION_COOKIE;
use crate::middleware::subdomain::Subdomain;
use crate::observability::{REQUEST_ID_HEADER, RequestIdMiddleware};
use crate::state::AppState;

fn options() -> RouteOptions {
    RouteOptions {
        snippets_enabled: true,
        auth_limiter: Arc::new(InMemoryRateLimiter::new(RateLimitConfig::default())),
        trusted_proxies: Vec::new().into(),
    }
}

macro_rules! init_app {
    ($state:expr, $options:expr) => {{
        let state: AppState = $state.clone();
        let options: RouteOptions = $options;
        test::init_service(
            App::new()
                .wrap(Subdomain::new(state.config.subdomains.clone()))
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new(state))
                .configure(move |cfg| configure_routes(cfg, &options)),
        )
        .await
    }};
}

fn bearer(state: &AppState, user: &User) -> (header::HeaderName, String) {
    let token = state
        .tokens
        .generate_token(user.id, &user.email, user.role)
        .unwrap();
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

async fn seed_admin(state: &AppState) -> User {
    state
        .users
        .ensure_admin("admin@example.com", "Admin", "password1")
        .await
        .unwrap()
}

fn new_post(title: &str, published: bool) -> Value {
    json!({
        "title": title,
        "content": "Hello from the test suite",
        "tags": ["rust", " "],
        "published": published,
    })
}

#[actix_web::test]
async fn test_health_echoes_request_id() {
    let state = AppState::in_memory(&AppConfig::for_tests());
    let app = init_app!(state, options());

    let req = test::TestRequest::get()
        .uri("/api/health")
        .insert_header((REQUEST_ID_HEADER, "trace-42"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(REQUEST_ID_HEADER).unwrap(), "trace-42");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["request_id"], "trace-42");
}

#[actix_web::test]
async fn test_register_starts_cookie_session() {
    let state = AppState::in_memory(&AppConfig::for_tests());
    let app = init_app!(state, options());

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "email": "Writer@Example.com",
            "name": "Writer",
            "password": "secret1",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .unwrap()
        .into_owned();
    assert_eq!(cookie.http_only(), Some(true));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 1800);
    assert_eq!(body["user"]["email"], "writer@example.com");
    assert_eq!(body["user"]["role"], "contributor");
    assert!(body["user"].get("password_hash").is_none());

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .cookie(cookie)
        .to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["name"], "Writer");

    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_public_registration_cannot_claim_admin() {
    let state = AppState::in_memory(&AppConfig::for_tests());
    let app = init_app!(state, options());

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "email": "boss@example.com",
            "name": "Boss",
            "password": "secret1",
            "role": "admin",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_drafts_stay_private() {
    let state = AppState::in_memory(&AppConfig::for_tests());
    let app = init_app!(state, options());
    let admin = seed_admin(&state).await;

    for (title, published) in [("Launch notes", true), ("Secret plans", false)] {
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(&state, &admin))
            .set_json(new_post(title, published))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, s-maxage=60, stale-while-revalidate=300"
    );
    let listed: Value = test::read_body_json(resp).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["slug"], "launch-notes");
    assert_eq!(listed[0]["tags"], json!(["rust"]));

    let req = test::TestRequest::get()
        .uri("/api/posts/secret-plans")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/posts/launch-notes")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, s-maxage=300, stale-while-revalidate=600"
    );
    let post: Value = test::read_body_json(resp).await;
    assert_eq!(post["author_name"], "Admin");
    assert_eq!(post["content"], "Hello from the test suite");

    let req = test::TestRequest::get()
        .uri("/api/posts/drafts")
        .insert_header(bearer(&state, &admin))
        .to_request();
    let drafts: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(drafts[0]["slug"], "secret-plans");
}

#[actix_web::test]
async fn test_contributor_permissions() {
    let state = AppState::in_memory(&AppConfig::for_tests());
    let app = init_app!(state, options());
    let admin = seed_admin(&state).await;
    let writer = state
        .users
        .create(
            Some(&admin.viewer()),
            folio_core::services::NewAccount {
                email: "writer@example.com".to_string(),
                name: "Writer".to_string(),
                password: "secret1".to_string(),
                role: Some(Role::Contributor),
            },
        )
        .await
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&state, &admin))
        .set_json(new_post("Admin post", true))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::put()
        .uri("/api/posts/admin-post")
        .insert_header(bearer(&state, &writer))
        .set_json(json!({ "title": "Hijacked" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&state, &writer))
        .set_json(new_post("Writer post", false))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::put()
        .uri("/api/posts/writer-post")
        .insert_header(bearer(&state, &writer))
        .set_json(json!({ "title": "Edited", "published": true }))
        .to_request();
    let edited: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(edited["title"], "Edited");
    assert_eq!(edited["slug"], "writer-post");

    let req = test::TestRequest::delete()
        .uri("/api/posts/writer-post")
        .insert_header(bearer(&state, &writer))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Same answer whether or not the slug exists
    let req = test::TestRequest::delete()
        .uri("/api/posts/no-such-post")
        .insert_header(bearer(&state, &writer))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/users")
        .insert_header(bearer(&state, &writer))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::delete()
        .uri("/api/posts/writer-post")
        .insert_header(bearer(&state, &admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_post_update_uses_flat_seo_fields() {
    let state = AppState::in_memory(&AppConfig::for_tests());
    let app = init_app!(state, options());
    let admin = seed_admin(&state).await;

    let mut body = new_post("Search friendly", true);
    body["meta_description"] = json!("Original description");
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&state, &admin))
        .set_json(body)
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::put()
        .uri("/api/posts/search-friendly")
        .insert_header(bearer(&state, &admin))
        .set_json(json!({ "meta_title": "Better title" }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["meta_title"], "Better title");
    assert_eq!(updated["meta_description"], "Original description");

    let req = test::TestRequest::get()
        .uri("/api/posts/search-friendly")
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(post["meta_title"], "Better title");
}

#[actix_web::test]
async fn test_post_titled_like_a_route_is_rejected() {
    let state = AppState::in_memory(&AppConfig::for_tests());
    let app = init_app!(state, options());
    let admin = seed_admin(&state).await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&state, &admin))
        .set_json(new_post("Drafts", true))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/posts/drafts")
        .insert_header(bearer(&state, &admin))
        .to_request();
    let drafts: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(drafts, json!([]));
}

#[actix_web::test]
async fn test_user_deletion_cascade_flag() {
    let state = AppState::in_memory(&AppConfig::for_tests());
    let app = init_app!(state, options());
    let admin = seed_admin(&state).await;

    let req = test::TestRequest::post()
        .uri("/api/users")
        .insert_header(bearer(&state, &admin))
        .set_json(json!({
            "email": "writer@example.com",
            "name": "Writer",
            "password": "secret1",
        }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let writer_id = created["id"].as_str().unwrap().to_string();
    let writer = state
        .users
        .find(writer_id.parse().unwrap())
        .await
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&state, &writer))
        .set_json(new_post("Left behind", true))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/users?id={}", admin.id))
        .insert_header(bearer(&state, &admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/users?id={writer_id}"))
        .insert_header(bearer(&state, &admin))
        .to_request();
    let deleted: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(deleted["posts_removed"], 0);

    let req = test::TestRequest::get()
        .uri("/api/posts/left-behind")
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(post["author_name"], "Unknown author");
}

#[actix_web::test]
async fn test_blog_subdomain_routing() {
    let state = AppState::in_memory(&AppConfig::for_tests());
    let app = init_app!(state, options());
    let admin = seed_admin(&state).await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&state, &admin))
        .set_json(new_post("On the blog", true))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header((header::HOST, "blog.localhost:8080"))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed[0]["slug"], "on-the-blog");

    let req = test::TestRequest::get()
        .uri("/on-the-blog")
        .insert_header((header::HOST, "blog.localhost:8080"))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(post["title"], "On the blog");

    let req = test::TestRequest::get()
        .uri("/auth/signin?next=%2F")
        .insert_header((header::HOST, "blog.babalola.dev"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "http://babalola.dev/auth/signin?next=%2F"
    );

    let req = test::TestRequest::get()
        .uri("/on-the-blog")
        .insert_header((header::HOST, "localhost:8080"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_auth_scope_is_rate_limited() {
    let state = AppState::in_memory(&AppConfig::for_tests());
    let app = init_app!(
        state,
        RouteOptions {
            snippets_enabled: false,
            auth_limiter: Arc::new(InMemoryRateLimiter::new(RateLimitConfig {
                max_requests: 1,
                window: Duration::from_secs(60),
            })),
            trusted_proxies: Vec::new().into(),
        }
    );

    let signin = |forwarded_for: &str| {
        test::TestRequest::post()
            .uri("/api/auth/signin")
            .peer_addr("203.0.113.7:40000".parse().unwrap())
            .insert_header(("X-Forwarded-For", forwarded_for.to_string()))
            .set_json(json!({ "email": "nobody@example.com", "password": "whatever" }))
            .to_request()
    };

    let resp = test::call_service(&app, signin("10.0.0.1")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Rotating the forwarded-for header does not mint a fresh budget
    for i in 2..6 {
        let resp = test::call_service(&app, signin(&format!("10.0.0.{i}"))).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(resp.headers().contains_key(header::RETRY_AFTER));
    }

    // Other scopes are unaffected
    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_snippet_echo_can_be_disabled() {
    let state = AppState::in_memory(&AppConfig::for_tests());

    let app = init_app!(state, options());
    let req = test::TestRequest::post()
        .uri("/api/execute-code")
        .set_json(json!({
            "code": "console.log('hi'); prompt('Name?')",
            "language": "javascript",
            "userInputs": ["Ada"],
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["output"], "hi\n> Name? Ada");

    let req = test::TestRequest::post()
        .uri("/api/execute-code")
        .set_json(json!({ "code": "require('fs')", "language": "js" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let app = init_app!(
        state,
        RouteOptions {
            snippets_enabled: false,
            ..options()
        }
    );
    let req = test::TestRequest::post()
        .uri("/api/execute-code")
        .set_json(json!({ "code": "print(1)", "language": "python" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_sitemap_lists_published_posts() {
    let state = AppState::in_memory(&AppConfig::for_tests());
    let app = init_app!(state, options());
    let admin = seed_admin(&state).await;

    for (title, published) in [("Public one", true), ("Hidden one", false)] {
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(&state, &admin))
            .set_json(new_post(title, published))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::get().uri("/sitemap.xml").to_request();
    let body = test::call_and_read_body(&app, req).await;
    let xml = String::from_utf8(body.to_vec()).unwrap();

    assert!(xml.contains("https://example.dev/blog/public-one"));
    assert!(!xml.contains("hidden-one"));
}
