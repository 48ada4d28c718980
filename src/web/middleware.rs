//! Per-request authentication against a bound route.
//!
//! ```text
//! HTTP Request
//!   ↓
//! Framework code builds RequestContext (ExtractRequestContext)
//!   ↓
//! authenticate_route(route, ctx)
//!   ↓
//! Ok(AuthenticatedRequest) or Err(AuthnFailure) → 401/403 response
//! ```

use crate::error::AuthnFailure;
use crate::request::Principal;
use crate::router::Route;

use super::{ExtractRequestContext, RequestContext};

/// A request that passed its route's authentication.
///
/// `principal` is `None` when the route needs no authentication or the
/// anonymous branch of an optional requirement matched.
#[derive(Debug, Clone)]
pub struct AuthenticatedRequest {
    /// The request that was authenticated
    pub context: RequestContext,
    /// The authenticated principal, if any
    pub principal: Option<Principal>,
}

impl AuthenticatedRequest {
    /// Returns true if no principal was established.
    pub fn is_anonymous(&self) -> bool {
        self.principal.is_none()
    }
}

/// Runs `route`'s composed handler for one request.
///
/// # Errors
///
/// Returns the handler's [`AuthnFailure`]; the host should answer with
/// [`AuthnFailure::status_code`].
///
/// # Examples
///
/// ```
/// use authn_resolver::Route;
/// use authn_resolver::web::{authenticate_route, RequestContext};
///
/// # tokio_test_block_on(async {
/// let route = Route::new("GET", "/health");
/// let ctx = RequestContext::new("req-1", "GET", "/health");
///
/// let authenticated = authenticate_route(&route, ctx).await.unwrap();
/// assert!(authenticated.is_anonymous());
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub async fn authenticate_route(
    route: &Route,
    context: RequestContext,
) -> Result<AuthenticatedRequest, AuthnFailure> {
    match route.authenticate(&context).await {
        Ok(principal) => {
            if let Some(p) = &principal {
                context
                    .log()
                    .debug(format_args!("authenticated as {}", p.id));
            }
            Ok(AuthenticatedRequest { context, principal })
        }
        Err(failure) => {
            context.log().warn(format_args!(
                "authentication failed ({}): {}",
                failure.status_code(),
                failure.message
            ));
            Err(failure)
        }
    }
}

/// Extracts the request view from a framework request, then authenticates it.
pub async fn authenticate_request<R>(
    route: &Route,
    request: &R,
) -> Result<AuthenticatedRequest, AuthnFailure>
where
    R: ExtractRequestContext + ?Sized,
{
    authenticate_route(route, request.extract_context()).await
}
