//! Web framework integration surface.
//!
//! This module is the boundary between HTTP frameworks and the resolver's
//! composed handlers. It contains no framework-specific code; integrations
//! implement [`ExtractRequestContext`] for their request type and hand the
//! result to [`authenticate_route`] for the matched [`Route`](crate::Route).
//!
//! # Integration Model
//!
//! ```ignore
//! // at startup
//! let resolver = SecurityRequirementResolver::new(set.build(), config);
//! resolver.bind_contract(&contract, &mut router)?;
//!
//! // per request, in framework middleware
//! let ctx = http_req.extract_context();
//! let route = router.find(ctx.method(), matched_path).unwrap();
//! match authenticate_route(route, ctx).await {
//!     Ok(authenticated) => { /* continue with authenticated.principal */ }
//!     Err(failure) => { /* respond with failure.status_code() */ }
//! }
//! ```

mod adapter;
mod extract;
mod middleware;

pub use adapter::RequestContext;
pub use extract::ExtractRequestContext;
pub use middleware::{authenticate_request, authenticate_route, AuthenticatedRequest};
