//! In-memory route table that resolved handlers are attached to.
//!
//! Hosts mirror this table into their own routing layer; the resolver only
//! needs somewhere to put the composed handler, the scope metadata and the
//! callback routes.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::composite::CompositeAuthHandler;
use crate::handler::{AuthenticationHandler, AuthnResult, CallbackAuthentication};
use crate::web::RequestContext;

/// One method + path entry of a [`Router`].
#[derive(Clone)]
pub struct Route {
    method: String,
    path: String,
    metadata: BTreeMap<String, Value>,
    authentication: Option<CompositeAuthHandler>,
    callback: Option<Arc<dyn CallbackAuthentication>>,
}

impl Route {
    /// Creates an empty route.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            path: path.into(),
            metadata: BTreeMap::new(),
            authentication: None,
            callback: None,
        }
    }

    /// Returns the upper-cased HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the route path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Stores a metadata entry for downstream tooling, replacing any previous value.
    pub fn put_metadata(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }

    /// Reads a metadata entry.
    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Attaches the authentication handler, replacing any previous one.
    pub fn set_authentication(&mut self, handler: CompositeAuthHandler) {
        self.authentication = Some(handler);
    }

    /// Returns the attached authentication handler.
    pub fn authentication(&self) -> Option<&CompositeAuthHandler> {
        self.authentication.as_ref()
    }

    /// Marks this route as the callback endpoint of `handler`.
    pub fn set_callback(&mut self, handler: Arc<dyn CallbackAuthentication>) {
        self.callback = Some(handler);
    }

    /// Returns true if a callback handler was installed here.
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Runs the attached handler for one request.
    ///
    /// A route without a handler lets every request through anonymously.
    pub async fn authenticate(&self, ctx: &RequestContext) -> AuthnResult {
        match &self.authentication {
            Some(handler) => handler.authenticate(ctx).await,
            None => Ok(None),
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("metadata", &self.metadata)
            .field("authentication", &self.authentication)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// An ordered table of routes.
#[derive(Debug, Default, Clone)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the route for `method` and `path`, creating it on first use.
    pub fn route(&mut self, method: &str, path: &str) -> &mut Route {
        let method = method.to_ascii_uppercase();
        let index = match self
            .routes
            .iter()
            .position(|r| r.method == method && r.path == path)
        {
            Some(index) => index,
            None => {
                self.routes.push(Route::new(method, path));
                self.routes.len() - 1
            }
        };
        &mut self.routes[index]
    }

    /// Shorthand for `route("GET", path)`.
    pub fn get(&mut self, path: &str) -> &mut Route {
        self.route("GET", path)
    }

    /// Looks up an existing route.
    pub fn find(&self, method: &str, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|r| r.method.eq_ignore_ascii_case(method) && r.path == path)
    }

    /// Returns all routes in insertion order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn route_is_created_once() {
        let mut router = Router::new();
        router.route("get", "/pets").put_metadata("k", json!(1));
        router.route("GET", "/pets").put_metadata("k2", json!(2));

        assert_eq!(router.routes().len(), 1);
        let route = router.find("GET", "/pets").unwrap();
        assert_eq!(route.metadata("k"), Some(&json!(1)));
        assert_eq!(route.metadata("k2"), Some(&json!(2)));
    }

    #[test]
    fn methods_are_distinct_routes() {
        let mut router = Router::new();
        router.get("/pets");
        router.route("POST", "/pets");

        assert_eq!(router.routes().len(), 2);
        assert!(router.find("post", "/pets").is_some());
        assert!(router.find("DELETE", "/pets").is_none());
    }

    #[tokio::test]
    async fn route_without_handler_is_anonymous() {
        let route = Route::new("GET", "/public");
        let ctx = RequestContext::new("req-1", "GET", "/public");

        assert_eq!(route.authenticate(&ctx).await, Ok(None));
    }

    #[tokio::test]
    async fn route_runs_attached_handler() {
        let mut route = Route::new("GET", "/pets");
        route.set_authentication(CompositeAuthHandler::AnyOf(Vec::new()));
        let ctx = RequestContext::new("req-1", "GET", "/pets");

        let err = route.authenticate(&ctx).await.unwrap_err();
        assert_eq!(err.status_code(), 401);
    }
}
