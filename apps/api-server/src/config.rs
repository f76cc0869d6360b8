//! Application configuration loaded from environment variables.

use std::env;
use std::net::IpAddr;

use folio_infra::{DatabaseConfig, JwtConfig, RateLimitConfig};

use crate::middleware::subdomain::SubdomainConfig;

/// Credentials of the admin account seeded at startup.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub production: bool,
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    /// Reverse proxies allowed to report the client address.
    pub trusted_proxies: Vec<IpAddr>,
    pub subdomains: SubdomainConfig,
    /// Public base URL used in the sitemap.
    pub site_url: String,
    /// Mount the (non-sandboxed) snippet echo endpoint.
    pub snippet_echo_enabled: bool,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let production = env::var("RUST_ENV")
            .map(|v| v == "production" || v == "prod")
            .unwrap_or(false);

        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_env("DB_MAX_CONNECTIONS").unwrap_or(20),
            min_connections: parse_env("DB_MIN_CONNECTIONS").unwrap_or(2),
        });

        let subdomains = env::var("BLOG_HOSTS")
            .map(|hosts| SubdomainConfig::new(hosts.split(',')))
            .unwrap_or_default();

        let trusted_proxies = env::var("TRUSTED_PROXIES")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .filter_map(|s| match s.parse::<IpAddr>() {
                        Ok(ip) => Some(ip),
                        Err(e) => {
                            tracing::warn!("Ignoring TRUSTED_PROXIES entry {:?}: {}", s, e);
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let bootstrap_admin = match (
            env::var("BOOTSTRAP_ADMIN_EMAIL"),
            env::var("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) => Some(BootstrapAdmin {
                email,
                password,
                name: env::var("BOOTSTRAP_ADMIN_NAME").unwrap_or_else(|_| "Admin".to_string()),
            }),
            _ => None,
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_env("PORT").unwrap_or(8080),
            production,
            database,
            jwt: JwtConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
            trusted_proxies,
            subdomains,
            site_url: env::var("SITE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://babalola.dev".to_string()),
            snippet_echo_enabled: env::var("SNIPPET_ECHO_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(!production),
            bootstrap_admin,
        }
    }

    /// Defaults suitable for tests: in-memory storage, everything enabled.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            production: false,
            database: None,
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
                ..JwtConfig::default()
            },
            rate_limit: RateLimitConfig::default(),
            trusted_proxies: Vec::new(),
            subdomains: SubdomainConfig::default(),
            site_url: "https://example.dev".to_string(),
            snippet_echo_enabled: true,
            bootstrap_admin: None,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}
