//! Sequential AND/OR composition of authentication handlers.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AuthnFailure;
use crate::handler::{AuthenticationHandler, AuthnResult};
use crate::web::RequestContext;

/// A composed authentication handler attached to a route.
///
/// Composition is fixed when an operation is bound; evaluating it touches no
/// shared mutable state, so one instance serves any number of concurrent
/// requests. Children are always evaluated one after another in the order
/// they were added, never in parallel, so a later child's side effects do not
/// happen once the outcome is decided.
#[derive(Clone)]
pub enum CompositeAuthHandler {
    /// One handler, used as is.
    Single(Arc<dyn AuthenticationHandler>),
    /// Every handler must succeed. Stops at the first failure.
    AllOf(Vec<Arc<dyn AuthenticationHandler>>),
    /// At least one alternative must succeed. Stops at the first success.
    AnyOf(Vec<CompositeAuthHandler>),
    /// Always succeeds without a principal.
    Anonymous,
}

impl CompositeAuthHandler {
    /// Returns true if this is an `AnyOf` containing an anonymous branch,
    /// i.e. authentication is optional.
    pub fn is_optional(&self) -> bool {
        match self {
            CompositeAuthHandler::Anonymous => true,
            CompositeAuthHandler::AnyOf(alternatives) => {
                alternatives.iter().any(CompositeAuthHandler::is_optional)
            }
            _ => false,
        }
    }

    /// Short label used in logs.
    pub fn shape(&self) -> String {
        match self {
            CompositeAuthHandler::Single(_) => "single".to_string(),
            CompositeAuthHandler::AllOf(handlers) => format!("all_of({})", handlers.len()),
            CompositeAuthHandler::AnyOf(alternatives) => {
                let inner: Vec<String> = alternatives.iter().map(Self::shape).collect();
                format!("any_of[{}]", inner.join(", "))
            }
            CompositeAuthHandler::Anonymous => "anonymous".to_string(),
        }
    }

    async fn all_of(
        handlers: &[Arc<dyn AuthenticationHandler>],
        ctx: &RequestContext,
    ) -> AuthnResult {
        let mut principal = None;
        for handler in handlers {
            // the last identity wins, as each step refines the request user
            if let Some(p) = handler.authenticate(ctx).await? {
                principal = Some(p);
            }
        }
        Ok(principal)
    }

    async fn any_of(alternatives: &[CompositeAuthHandler], ctx: &RequestContext) -> AuthnResult {
        let mut last_failure = None;
        for (index, alternative) in alternatives.iter().enumerate() {
            match alternative.authenticate(ctx).await {
                Ok(principal) => return Ok(principal),
                Err(failure) => {
                    ctx.log().debug(format_args!(
                        "authentication alternative {} failed: {}",
                        index, failure
                    ));
                    last_failure = Some(failure);
                }
            }
        }
        Err(last_failure.unwrap_or_else(|| {
            AuthnFailure::unauthenticated("no authentication alternative matched")
        }))
    }
}

#[async_trait]
impl AuthenticationHandler for CompositeAuthHandler {
    async fn authenticate(&self, ctx: &RequestContext) -> AuthnResult {
        match self {
            CompositeAuthHandler::Single(handler) => handler.authenticate(ctx).await,
            CompositeAuthHandler::AllOf(handlers) => Self::all_of(handlers, ctx).await,
            CompositeAuthHandler::AnyOf(alternatives) => Self::any_of(alternatives, ctx).await,
            CompositeAuthHandler::Anonymous => Ok(None),
        }
    }
}

impl fmt::Debug for CompositeAuthHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.shape())
    }
}
