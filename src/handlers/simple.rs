use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AuthnFailure, FailureKind};
use crate::handler::{AuthenticationHandler, AuthnResult};
use crate::request::Principal;
use crate::web::RequestContext;

/// Boxed error accepted from authentication closures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type AuthnFn = dyn Fn(&RequestContext) -> Result<Option<Principal>, BoxError> + Send + Sync;

/// A handler backed by a closure.
///
/// Errors returned by the closure that are already an [`AuthnFailure`] are
/// passed through; any other error becomes `Unauthenticated`. A handler with
/// no closure fails every request with `Internal`.
///
/// # Examples
///
/// ```
/// use authn_resolver::{Principal, SimpleAuthenticationHandler};
///
/// let handler = SimpleAuthenticationHandler::new().authenticate_with(|ctx| {
///     match ctx.header("x-user") {
///         Some(user) => Ok(Some(Principal::new(user, user))),
///         None => Err("missing x-user header".into()),
///     }
/// });
/// # let _ = handler;
/// ```
#[derive(Clone, Default)]
pub struct SimpleAuthenticationHandler {
    authn: Option<Arc<AuthnFn>>,
}

impl SimpleAuthenticationHandler {
    /// Creates a handler without an authentication function.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the authentication function.
    pub fn authenticate_with<F>(mut self, authn: F) -> Self
    where
        F: Fn(&RequestContext) -> Result<Option<Principal>, BoxError> + Send + Sync + 'static,
    {
        self.authn = Some(Arc::new(authn));
        self
    }
}

#[async_trait]
impl AuthenticationHandler for SimpleAuthenticationHandler {
    async fn authenticate(&self, ctx: &RequestContext) -> AuthnResult {
        let Some(authn) = &self.authn else {
            return Err(AuthnFailure::new(
                FailureKind::Internal,
                "no authenticate function",
            ));
        };

        authn(ctx).map_err(|err| match err.downcast::<AuthnFailure>() {
            Ok(failure) => *failure,
            Err(other) => AuthnFailure::unauthenticated(other.to_string()),
        })
    }
}

impl fmt::Debug for SimpleAuthenticationHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleAuthenticationHandler")
            .field("configured", &self.authn.is_some())
            .finish()
    }
}
