//! # Folio API Server
//!
//! Blog backend: posts, accounts and role-based access, served with Actix-web.

use actix_web::{App, HttpServer, web};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use folio_core::ports::RateLimiter;
use folio_infra::InMemoryRateLimiter;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use handlers::RouteOptions;
use middleware::subdomain::Subdomain;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Folio API Server on {}:{}",
        config.host,
        config.port
    );
    tracing::info!(blog_hosts = ?config.subdomains.blog_hosts, "Blog subdomain routing");
    if config.snippet_echo_enabled {
        tracing::warn!("Snippet echo endpoint enabled (not sandboxed)");
    }

    let state = AppState::new(&config).await;
    state.bootstrap_admin().await;

    // Shared across workers so the limit is per process, not per worker
    let auth_limiter: Arc<dyn RateLimiter> =
        Arc::new(InMemoryRateLimiter::new(config.rate_limit.clone()));
    let routes = RouteOptions {
        snippets_enabled: config.snippet_echo_enabled,
        auth_limiter,
        trusted_proxies: config.trusted_proxies.clone().into(),
    };
    let subdomains = config.subdomains.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(Subdomain::new(subdomains.clone()))
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
            .app_data(web::Data::new(state.clone()))
            .configure(|cfg| handlers::configure_routes(cfg, &routes))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
