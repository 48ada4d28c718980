//! Framework-agnostic view of an incoming request.

use std::collections::HashMap;

use crate::logging::AuthnLog;

/// The per-request context authentication handlers evaluate.
///
/// `RequestContext` holds simple, owned data so it stays independent of any
/// particular framework's request types. Framework integrations build one via
/// [`ExtractRequestContext`](super::ExtractRequestContext) or the builder-style
/// methods below.
///
/// Header names are matched case-insensitively.
///
/// # Examples
///
/// ```
/// use authn_resolver::web::RequestContext;
///
/// let ctx = RequestContext::new("req-12345", "GET", "/pets")
///     .with_header("X-API-Key", "k-1")
///     .with_query_param("limit", "10");
///
/// assert_eq!(ctx.header("x-api-key"), Some("k-1"));
/// assert_eq!(ctx.query_param("limit"), Some("10"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    method: String,
    path: String,
    headers: HashMap<String, String>,
    query_params: HashMap<String, String>,
}

impl RequestContext {
    /// Creates a context with no headers or query parameters.
    pub fn new(
        request_id: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            method: method.into().to_ascii_uppercase(),
            path: path.into(),
            headers: HashMap::new(),
            query_params: HashMap::new(),
        }
    }

    /// Adds a header, replacing any previous value with the same name.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.add_header(name, value);
        self
    }

    /// Adds a query parameter.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(key.into(), value.into());
        self
    }

    /// Adds a header in place.
    pub fn add_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Returns the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the upper-cased HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Looks up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Looks up a query parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query_params.get(key).map(String::as_str)
    }

    /// Returns the bearer token from the `Authorization` header, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.header("authorization")
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Returns a logger bound to this request.
    pub fn log(&self) -> AuthnLog<'_> {
        AuthnLog::new(self)
    }
}
