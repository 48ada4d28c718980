//! Integration tests for the web boundary.
//!
//! These tests walk the full flow from a framework request through context
//! extraction to a bound route's authentication verdict.

use std::sync::Arc;

use authn_resolver::web::{
    authenticate_request, authenticate_route, ExtractRequestContext, RequestContext,
};
use authn_resolver::{
    ApiKeyHandler, Contract, FailureKind, Principal, RegistrationSet, ResolverConfig, Router,
    SchemeHandler, SecurityRequirementResolver,
};

/// Minimal stand-in for a framework's request type.
struct HttpRequest {
    id: &'static str,
    method: &'static str,
    path: &'static str,
    headers: Vec<(&'static str, &'static str)>,
}

impl ExtractRequestContext for HttpRequest {
    fn extract_context(&self) -> RequestContext {
        let mut ctx = RequestContext::new(self.id, self.method, self.path);
        for (name, value) in &self.headers {
            ctx.add_header(name, *value);
        }
        ctx
    }
}

fn bound_router() -> Router {
    let contract = Contract::from_json(
        r#"{
            "paths": {
                "/reports": {
                    "get": { "security": [{ "api_key": ["reports:read"] }] }
                },
                "/status": {
                    "get": { "security": [{}, { "api_key": [] }] }
                }
            }
        }"#,
    )
    .unwrap();

    let keys = ApiKeyHandler::new()
        .with_key(
            "k-analyst",
            Principal::new("analyst", "Analyst").with_scopes(["reports:read"]),
        )
        .with_key("k-intern", Principal::new("intern", "Intern"));

    let mut set = RegistrationSet::new();
    set.register("api_key", SchemeHandler::scoped(Arc::new(keys)), None)
        .unwrap();

    let resolver = SecurityRequirementResolver::new(set.build(), ResolverConfig::default());
    let mut router = Router::new();
    resolver.bind_contract(&contract, &mut router).unwrap();
    router
}

#[tokio::test]
async fn scoped_route_full_flow() {
    let router = bound_router();
    let route = router.find("GET", "/reports").unwrap();

    let request = HttpRequest {
        id: "req-web-001",
        method: "get",
        path: "/reports",
        headers: vec![("X-API-Key", "k-analyst")],
    };

    let authenticated = authenticate_request(route, &request).await.unwrap();
    assert_eq!(authenticated.context.request_id(), "req-web-001");
    assert_eq!(authenticated.principal.unwrap().id, "analyst");
}

#[tokio::test]
async fn insufficient_scope_is_forbidden() {
    let router = bound_router();
    let route = router.find("GET", "/reports").unwrap();

    let request = HttpRequest {
        id: "req-web-002",
        method: "GET",
        path: "/reports",
        headers: vec![("x-api-key", "k-intern")],
    };

    let failure = authenticate_request(route, &request).await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::Forbidden);
    assert_eq!(failure.status_code(), 403);
}

#[tokio::test]
async fn missing_credentials_are_unauthorized() {
    let router = bound_router();
    let route = router.find("GET", "/reports").unwrap();

    let ctx = RequestContext::new("req-web-003", "GET", "/reports");
    let failure = authenticate_route(route, ctx).await.unwrap_err();
    assert_eq!(failure.status_code(), 401);
}

#[tokio::test]
async fn optional_route_accepts_anonymous_and_identified_callers() {
    let router = bound_router();
    let route = router.find("GET", "/status").unwrap();

    let anonymous = authenticate_route(route, RequestContext::new("req-web-004", "GET", "/status"))
        .await
        .unwrap();
    assert!(anonymous.is_anonymous());

    let identified = authenticate_route(
        route,
        RequestContext::new("req-web-005", "GET", "/status").with_header("X-API-Key", "k-intern"),
    )
    .await
    .unwrap();
    assert_eq!(identified.principal.unwrap().id, "intern");

    // a bad key on an optional route still falls through to anonymous
    let bad_key = authenticate_route(
        route,
        RequestContext::new("req-web-006", "GET", "/status").with_header("X-API-Key", "nope"),
    )
    .await
    .unwrap();
    assert!(bad_key.is_anonymous());
}

#[test]
fn unknown_routes_are_not_bound() {
    let router = bound_router();
    assert!(router.find("POST", "/reports").is_none());
    assert_eq!(router.routes().len(), 2);
}
