//! Authentication handler capability traits.
//!
//! Every handler implements [`AuthenticationHandler`]. Two further
//! capabilities are optional and declared explicitly when a handler is
//! registered (see [`SchemeHandler`](crate::SchemeHandler)):
//!
//! - [`ScopedAuthentication`]: produce a copy that enforces a set of scopes
//! - [`CallbackAuthentication`]: install redirect-completion logic on a route

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AuthnFailure;
use crate::request::Principal;
use crate::router::Route;
use crate::web::RequestContext;

/// Outcome of authenticating one request.
///
/// `Ok(Some(_))` carries the authenticated principal, `Ok(None)` is an
/// anonymous success.
pub type AuthnResult = Result<Option<Principal>, AuthnFailure>;

/// Validates the credentials carried by a request.
///
/// Implementations must be safe to call concurrently: composed handlers are
/// shared across all requests hitting a route.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use authn_resolver::{AuthenticationHandler, AuthnFailure, AuthnResult, Principal};
/// use authn_resolver::web::RequestContext;
///
/// struct HeaderUser;
///
/// #[async_trait]
/// impl AuthenticationHandler for HeaderUser {
///     async fn authenticate(&self, ctx: &RequestContext) -> AuthnResult {
///         match ctx.header("x-user") {
///             Some(user) => Ok(Some(Principal::new(user, user))),
///             None => Err(AuthnFailure::unauthenticated("missing x-user")),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait AuthenticationHandler: Send + Sync {
    /// Authenticates the request.
    async fn authenticate(&self, ctx: &RequestContext) -> AuthnResult;
}

/// Capability: narrow a handler to a set of required scopes.
pub trait ScopedAuthentication: Send + Sync {
    /// Returns an equivalent handler that additionally enforces `scopes`.
    fn with_scopes(&self, scopes: &[String]) -> Arc<dyn AuthenticationHandler>;
}

/// Capability: complete an OAuth2-style flow at a callback route.
pub trait CallbackAuthentication: Send + Sync {
    /// Installs whatever the handler needs on the callback route.
    fn setup_callback(&self, route: &mut Route);
}

