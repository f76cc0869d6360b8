//! Blog subdomain routing.
//!
//! Requests for a configured blog host are mapped onto the posts API:
//! `/` serves the listing, `/{slug}` a single post. Sign-in pages live on the
//! main site, so `/auth/...` is redirected there.

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::{Uri, header},
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;

const DEFAULT_BLOG_HOSTS: &[&str] = &["blog.localhost", "blog.babalola.dev"];

/// Single path segments that keep their meaning on a blog host.
const RESERVED_SEGMENTS: &[&str] = &["api", "health", "sitemap.xml"];

#[derive(Debug, Clone)]
pub struct SubdomainConfig {
    pub blog_hosts: Vec<String>,
    pub listing_path: String,
}

impl SubdomainConfig {
    pub fn new<'a>(hosts: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            blog_hosts: hosts
                .into_iter()
                .map(|h| h.trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
            listing_path: "/api/posts".to_string(),
        }
    }

    /// Whether `host` (optionally with a port) is a blog host.
    pub fn is_blog_host(&self, host: &str) -> bool {
        let host = strip_port(host).to_ascii_lowercase();
        self.blog_hosts.iter().any(|h| *h == host)
    }
}

impl Default for SubdomainConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BLOG_HOSTS.iter().copied())
    }
}

/// What to do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    PassThrough,
    /// Serve the request from this path instead.
    Rewrite(String),
    /// Send the client to the same path on another host.
    Redirect { host: String },
}

/// Decide how a request for `host` + `path` is routed.
pub fn resolve(config: &SubdomainConfig, host: &str, path: &str) -> Route {
    if !config.is_blog_host(host) {
        return Route::PassThrough;
    }

    if path == "/auth" || path.starts_with("/auth/") {
        let bare = strip_port(host);
        let main = bare.strip_prefix("blog.").unwrap_or(bare);
        let host = match host.get(bare.len()..) {
            Some(port) if !port.is_empty() => format!("{main}{port}"),
            _ => main.to_string(),
        };
        return Route::Redirect { host };
    }

    if path == "/" || path.is_empty() {
        return Route::Rewrite(config.listing_path.clone());
    }

    let segment = path.trim_start_matches('/');
    if segment.is_empty() || segment.contains('/') || RESERVED_SEGMENTS.contains(&segment) {
        return Route::PassThrough;
    }

    Route::Rewrite(format!("{}/{}", config.listing_path, segment))
}

fn strip_port(host: &str) -> &str {
    host.rsplit_once(':')
        .map(|(name, _)| name)
        .unwrap_or(host)
}

/// Subdomain routing middleware factory.
pub struct Subdomain {
    config: Rc<SubdomainConfig>,
}

impl Subdomain {
    pub fn new(config: SubdomainConfig) -> Self {
        Self {
            config: Rc::new(config),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Subdomain
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = SubdomainService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SubdomainService {
            service,
            config: self.config.clone(),
        }))
    }
}

pub struct SubdomainService<S> {
    service: S,
    config: Rc<SubdomainConfig>,
}

impl<S, B> Service<ServiceRequest> for SubdomainService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let host = req.connection_info().host().to_string();
        let route = resolve(&self.config, &host, req.path());

        match route {
            Route::PassThrough => {}
            Route::Rewrite(path) => {
                let target = match req.query_string() {
                    "" => path,
                    query => format!("{path}?{query}"),
                };
                match target.parse::<Uri>() {
                    Ok(uri) => {
                        tracing::debug!(host = %host, target = %uri, "Rewriting blog request");
                        req.match_info_mut().get_mut().update(&uri);
                        req.head_mut().uri = uri;
                    }
                    Err(e) => tracing::warn!("Could not rewrite blog path: {}", e),
                }
            }
            Route::Redirect { host: main_host } => {
                let scheme = req.connection_info().scheme().to_string();
                let location = match req.uri().path_and_query() {
                    Some(pq) => format!("{scheme}://{main_host}{pq}"),
                    None => format!("{scheme}://{main_host}{}", req.path()),
                };

                let response = HttpResponse::TemporaryRedirect()
                    .insert_header((header::LOCATION, location))
                    .finish();
                let (http_req, _payload) = req.into_parts();
                let srv_response = ServiceResponse::new(http_req, response);

                return Box::pin(async move { Ok(srv_response.map_into_right_body()) });
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SubdomainConfig {
        SubdomainConfig::default()
    }

    #[test]
    fn test_main_host_passes_through() {
        assert_eq!(resolve(&config(), "babalola.dev", "/"), Route::PassThrough);
        assert_eq!(
            resolve(&config(), "localhost:8080", "/hello"),
            Route::PassThrough
        );
    }

    #[test]
    fn test_blog_root_serves_listing() {
        assert_eq!(
            resolve(&config(), "blog.babalola.dev", "/"),
            Route::Rewrite("/api/posts".to_string())
        );
        assert_eq!(
            resolve(&config(), "Blog.Localhost:3000", "/"),
            Route::Rewrite("/api/posts".to_string())
        );
    }

    #[test]
    fn test_blog_slug_serves_post() {
        assert_eq!(
            resolve(&config(), "blog.babalola.dev", "/hello-world"),
            Route::Rewrite("/api/posts/hello-world".to_string())
        );
    }

    #[test]
    fn test_reserved_and_nested_paths_pass_through() {
        for path in ["/api/posts", "/health", "/sitemap.xml", "/a/b"] {
            assert_eq!(
                resolve(&config(), "blog.babalola.dev", path),
                Route::PassThrough,
                "{path}"
            );
        }
    }

    #[test]
    fn test_auth_redirects_to_main_host() {
        assert_eq!(
            resolve(&config(), "blog.babalola.dev", "/auth/signin"),
            Route::Redirect {
                host: "babalola.dev".to_string()
            }
        );
        assert_eq!(
            resolve(&config(), "blog.localhost:3000", "/auth"),
            Route::Redirect {
                host: "localhost:3000".to_string()
            }
        );
    }

    #[test]
    fn test_hosts_from_list() {
        let config = SubdomainConfig::new(" blog.example.com , ,".split(','));
        assert_eq!(config.blog_hosts, vec!["blog.example.com".to_string()]);
        assert!(config.is_blog_host("BLOG.example.com:443"));
        assert!(!config.is_blog_host("example.com"));
    }
}
