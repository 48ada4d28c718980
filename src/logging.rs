use std::fmt;

use crate::web::RequestContext;

/// A request-scoped logging interface.
///
/// `AuthnLog` is obtained from [`RequestContext::log`] and is lifetime-bound
/// to the context it describes. Every event carries the request ID, method and
/// path so authentication decisions can be traced per request.
#[derive(Debug)]
pub struct AuthnLog<'a> {
    request_id: &'a str,
    method: &'a str,
    path: &'a str,
}

impl<'a> AuthnLog<'a> {
    /// Creates a logger for a request.
    ///
    /// This is `pub(crate)`; only `RequestContext` hands these out.
    pub(crate) fn new(ctx: &'a RequestContext) -> Self {
        Self {
            request_id: ctx.request_id(),
            method: ctx.method(),
            path: ctx.path(),
        }
    }

    /// Returns the request ID associated with this logger.
    pub fn request_id(&self) -> &str {
        self.request_id
    }

    /// Logs an info-level message.
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(
            request_id = %self.request_id,
            method = %self.method,
            path = %self.path,
            "{}",
            args
        );
    }

    /// Logs a warning-level message.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(
            request_id = %self.request_id,
            method = %self.method,
            path = %self.path,
            "{}",
            args
        );
    }

    /// Logs a debug-level message.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(
            request_id = %self.request_id,
            method = %self.method,
            path = %self.path,
            "{}",
            args
        );
    }
}
