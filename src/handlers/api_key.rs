use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AuthnFailure;
use crate::handler::{AuthenticationHandler, AuthnResult, ScopedAuthentication};
use crate::request::Principal;
use crate::web::RequestContext;

const DEFAULT_HEADER: &str = "X-API-Key";

/// Authenticates requests by an API key header.
///
/// Keys map to principals. When narrowed with
/// [`with_scopes`](ScopedAuthentication::with_scopes), the principal must
/// also have been granted every required scope; otherwise the request is
/// `Forbidden`.
///
/// Keys never appear in `Debug` output.
///
/// # Examples
///
/// ```
/// use authn_resolver::{ApiKeyHandler, Principal};
///
/// let handler = ApiKeyHandler::new()
///     .with_header("X-Service-Key")
///     .with_key("k-1", Principal::new("svc", "Billing").with_scopes(["invoices:read"]));
///
/// assert_eq!(handler.header(), "X-Service-Key");
/// assert!(!format!("{:?}", handler).contains("k-1"));
/// ```
#[derive(Clone)]
pub struct ApiKeyHandler {
    header: String,
    keys: Arc<HashMap<String, Principal>>,
    required_scopes: Vec<String>,
}

impl ApiKeyHandler {
    /// Creates a handler reading `X-API-Key` with no known keys.
    pub fn new() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
            keys: Arc::new(HashMap::new()),
            required_scopes: Vec::new(),
        }
    }

    /// Sets the header the key is read from.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Adds a key and the principal it authenticates as.
    pub fn with_key(mut self, key: impl Into<String>, principal: Principal) -> Self {
        Arc::make_mut(&mut self.keys).insert(key.into(), principal);
        self
    }

    /// Returns the header name.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Returns the scopes this handler enforces.
    pub fn required_scopes(&self) -> &[String] {
        &self.required_scopes
    }
}

impl Default for ApiKeyHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthenticationHandler for ApiKeyHandler {
    async fn authenticate(&self, ctx: &RequestContext) -> AuthnResult {
        let key = ctx.header(&self.header).ok_or_else(|| {
            AuthnFailure::unauthenticated(format!("missing API key header {}", self.header))
        })?;

        let principal = self
            .keys
            .get(key)
            .ok_or_else(|| AuthnFailure::unauthenticated("unknown API key"))?;

        if let Some(scope) = principal.missing_scope(&self.required_scopes) {
            ctx.log().debug(format_args!(
                "principal {} lacks scope '{}'",
                principal.id, scope
            ));
            return Err(AuthnFailure::forbidden(format!(
                "missing required scope '{}'",
                scope
            )));
        }

        Ok(Some(principal.clone()))
    }
}

impl ScopedAuthentication for ApiKeyHandler {
    fn with_scopes(&self, scopes: &[String]) -> Arc<dyn AuthenticationHandler> {
        Arc::new(Self {
            required_scopes: scopes.to_vec(),
            ..self.clone()
        })
    }
}

impl fmt::Debug for ApiKeyHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyHandler")
            .field("header", &self.header)
            .field("keys", &self.keys.len())
            .field("required_scopes", &self.required_scopes)
            .finish()
    }
}
