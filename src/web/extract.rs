//! Extraction boundary trait for web integration.

use super::RequestContext;

/// Builds a [`RequestContext`] from a framework-specific request.
///
/// This trait only maps framework types to the resolver's request view. It
/// does not authenticate anything; that is the job of the route's composed
/// handler.
///
/// # Examples
///
/// ```
/// use authn_resolver::web::{ExtractRequestContext, RequestContext};
///
/// struct MyFrameworkRequest {
///     id: String,
///     method: String,
///     path: String,
///     headers: Vec<(String, String)>,
/// }
///
/// impl ExtractRequestContext for MyFrameworkRequest {
///     fn extract_context(&self) -> RequestContext {
///         let mut ctx = RequestContext::new(self.id.clone(), self.method.clone(), self.path.clone());
///         for (name, value) in &self.headers {
///             ctx.add_header(name, value.clone());
///         }
///         ctx
///     }
/// }
/// ```
pub trait ExtractRequestContext {
    /// Returns the request view handlers evaluate.
    fn extract_context(&self) -> RequestContext;
}
