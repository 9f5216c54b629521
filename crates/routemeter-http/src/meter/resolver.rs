use std::sync::Arc;

use axum::extract::MatchedPath;
use axum::http::{Extensions, Method, Uri};
use routemeter_core::route::{
    DefaultRouteResolver, NormalizingRouteResolver, RouteIdentity, RouteResolver,
};

use crate::config::ResolverKind;

/// Route template from axum's router (`/widgets/:id`), or the raw path for
/// requests no route matched.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchedPathResolver;

impl RouteResolver for MatchedPathResolver {
    fn resolve(&self, method: &Method, uri: &Uri, extensions: &Extensions) -> RouteIdentity {
        let path = extensions
            .get::<MatchedPath>()
            .map(|p| p.as_str().to_owned())
            .unwrap_or_else(|| uri.path().to_owned());
        RouteIdentity::new(method.as_str(), path)
    }
}

pub fn resolver_for(kind: ResolverKind) -> Arc<dyn RouteResolver> {
    match kind {
        ResolverKind::Matched => Arc::new(MatchedPathResolver),
        ResolverKind::Raw => Arc::new(DefaultRouteResolver),
        ResolverKind::Normalized => Arc::new(NormalizingRouteResolver),
    }
}
