//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;
mod sitemap;
mod snippets;
mod users;

#[cfg(test)]
mod tests;

use actix_web::web;
use std::net::IpAddr;
use std::sync::Arc;

use folio_core::ports::RateLimiter;

use crate::middleware::rate_limit::RateLimitMiddleware;

/// Route-level switches decided at startup.
#[derive(Clone)]
pub struct RouteOptions {
    /// Mount `POST /api/execute-code`.
    pub snippets_enabled: bool,
    /// Limiter guarding the `/api/auth` scope.
    pub auth_limiter: Arc<dyn RateLimiter>,
    /// Proxies whose forwarded-for headers identify the client.
    pub trusted_proxies: Arc<[IpAddr]>,
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig, options: &RouteOptions) {
    let mut api = web::scope("/api")
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/auth")
                .wrap(RateLimitMiddleware::new(
                    options.auth_limiter.clone(),
                    options.trusted_proxies.clone(),
                ))
                .route("/register", web::post().to(auth::register))
                .route("/signin", web::post().to(auth::signin))
                .route("/signout", web::post().to(auth::signout))
                .route("/me", web::get().to(auth::me)),
        )
        .service(
            web::scope("/posts")
                .route("", web::get().to(posts::list_posts))
                .route("", web::post().to(posts::create_post))
                .route("/drafts", web::get().to(posts::list_drafts))
                .route("/{slug}", web::get().to(posts::get_post))
                .route("/{slug}", web::put().to(posts::update_post))
                .route("/{slug}", web::delete().to(posts::delete_post)),
        )
        .service(
            web::scope("/users")
                .route("", web::get().to(users::list_users))
                .route("", web::post().to(users::create_user))
                .route("", web::delete().to(users::delete_user))
                .route("/{id}", web::patch().to(users::update_user)),
        );

    if options.snippets_enabled {
        api = api.route("/execute-code", web::post().to(snippets::execute_code));
    }

    cfg.route("/sitemap.xml", web::get().to(sitemap::sitemap))
        .service(api);
}
