//! Route identity and resolvers.
//!
//! A resolver maps a request head to the `(method, path)` pair metrics are
//! keyed on. It must be pure and must not fail: when nothing better is known,
//! return the raw method and path.

use http::{Extensions, Method, Uri};

/// Logical endpoint used as the aggregation key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteIdentity {
    pub method: String,
    pub path: String,
}

impl RouteIdentity {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
        }
    }
}

/// Resolves the route identity of a request.
///
/// Takes the request head piecewise so resolvers stay independent of the
/// body type. Framework-specific route info (e.g. a matched template) is
/// expected in `extensions`.
pub trait RouteResolver: Send + Sync {
    fn resolve(&self, method: &Method, uri: &Uri, extensions: &Extensions) -> RouteIdentity;
}

/// Raw method and raw URI path.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRouteResolver;

impl RouteResolver for DefaultRouteResolver {
    fn resolve(&self, method: &Method, uri: &Uri, _extensions: &Extensions) -> RouteIdentity {
        RouteIdentity::new(method.as_str(), uri.path())
    }
}

/// Raw path with dynamic segments collapsed, for routers that expose no
/// route template.
///
/// Numeric and UUID segments become `:id`; a trailing slash is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizingRouteResolver;

impl RouteResolver for NormalizingRouteResolver {
    fn resolve(&self, method: &Method, uri: &Uri, _extensions: &Extensions) -> RouteIdentity {
        RouteIdentity::new(method.as_str(), normalize_path(uri.path()))
    }
}

/// Collapse numeric and UUID path segments to `:id`.
///
/// ```
/// use routemeter_core::route::normalize_path;
///
/// assert_eq!(normalize_path("/widgets/7"), "/widgets/:id");
/// assert_eq!(normalize_path("/jobs/550e8400-e29b-41d4-a716-446655440000/log"), "/jobs/:id/log");
/// assert_eq!(normalize_path("/healthz/"), "/healthz");
/// ```
pub fn normalize_path(path: &str) -> String {
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        return "/".to_string();
    }

    path.split('/')
        .map(|seg| if is_numeric(seg) || is_uuid(seg) { ":id" } else { seg })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// 8-4-4-4-12 hex groups.
fn is_uuid(s: &str) -> bool {
    if s.len() != 36 {
        return false;
    }
    let parts: Vec<&str> = s.split('-').collect();
    parts.len() == 5
        && parts
            .iter()
            .zip([8, 4, 4, 4, 12])
            .all(|(part, want)| part.len() == want && part.bytes().all(|b| b.is_ascii_hexdigit()))
}
