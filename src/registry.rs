//! Scheme-name to handler registrations.
//!
//! Registration happens in two phases. During application setup a mutable
//! [`RegistrationSet`] collects handlers and callback paths from a single
//! thread. [`RegistrationSet::build`] then freezes it into a
//! [`ResolvedRegistry`], which is immutable and can be shared freely.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::error::Error;
use crate::handler::{AuthenticationHandler, CallbackAuthentication, ScopedAuthentication};

/// A registered authentication handler together with its optional
/// capabilities.
///
/// The capabilities are fixed by the constructor: [`new`](Self::new) for a
/// plain handler, [`scoped`](Self::scoped) for one that supports scope
/// narrowing, [`oauth2`](Self::oauth2) for one that also serves a callback
/// route.
#[derive(Clone)]
pub struct SchemeHandler {
    handler: Arc<dyn AuthenticationHandler>,
    scoping: Option<Arc<dyn ScopedAuthentication>>,
    callback: Option<Arc<dyn CallbackAuthentication>>,
}

impl SchemeHandler {
    /// Wraps a handler without optional capabilities.
    pub fn new<H>(handler: Arc<H>) -> Self
    where
        H: AuthenticationHandler + 'static,
    {
        Self {
            handler,
            scoping: None,
            callback: None,
        }
    }

    /// Wraps a handler that can be narrowed to required scopes.
    pub fn scoped<H>(handler: Arc<H>) -> Self
    where
        H: AuthenticationHandler + ScopedAuthentication + 'static,
    {
        Self {
            handler: handler.clone(),
            scoping: Some(handler),
            callback: None,
        }
    }

    /// Wraps an OAuth2-style handler: scope-narrowable and able to serve a
    /// callback route.
    pub fn oauth2<H>(handler: Arc<H>) -> Self
    where
        H: AuthenticationHandler + ScopedAuthentication + CallbackAuthentication + 'static,
    {
        Self {
            handler: handler.clone(),
            scoping: Some(handler.clone()),
            callback: Some(handler),
        }
    }

    /// Returns the handler as registered.
    pub fn handler(&self) -> &Arc<dyn AuthenticationHandler> {
        &self.handler
    }

    /// Returns true if the handler supports scope narrowing.
    pub fn supports_scopes(&self) -> bool {
        self.scoping.is_some()
    }

    /// Returns true if the handler can serve a callback route.
    pub fn supports_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Returns the handler to use when `scopes` are required.
    ///
    /// Handlers without scope support are returned unchanged.
    pub(crate) fn narrowed(&self, scopes: &[String]) -> Arc<dyn AuthenticationHandler> {
        match &self.scoping {
            Some(scoping) if !scopes.is_empty() => scoping.with_scopes(scopes),
            _ => self.handler.clone(),
        }
    }
}

impl fmt::Debug for SchemeHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeHandler")
            .field("scoped", &self.supports_scopes())
            .field("callback", &self.supports_callback())
            .finish()
    }
}

/// Mutable registrations collected during application setup.
///
/// Not synchronized; register everything from one thread, then call
/// [`build`](Self::build).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use authn_resolver::{ApiKeyHandler, Principal, RegistrationSet, SchemeHandler};
///
/// let api_key = ApiKeyHandler::new().with_key("k-1", Principal::new("svc", "Billing"));
///
/// let mut set = RegistrationSet::new();
/// set.register("api_key", SchemeHandler::scoped(Arc::new(api_key)), None)
///     .expect("no callback involved");
///
/// let registry = set.build();
/// assert_eq!(registry.handlers_for("api_key").map(|h| h.len()), Some(1));
/// ```
#[derive(Default)]
pub struct RegistrationSet {
    handlers: HashMap<String, Vec<SchemeHandler>>,
    callbacks: BTreeMap<String, Arc<dyn CallbackAuthentication>>,
}

impl RegistrationSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under the security scheme `name`.
    ///
    /// Handlers registered under the same name accumulate in registration
    /// order. When `callback` is given, the handler also claims that path for
    /// its callback route.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateCallback`] if another handler already owns `callback`
    /// - [`Error::CallbackUnsupported`] if `handler` cannot serve callbacks
    ///
    /// On error nothing is registered.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: SchemeHandler,
        callback: Option<&str>,
    ) -> Result<(), Error> {
        let name = name.into();

        if let Some(path) = callback {
            let owner = handler
                .callback
                .clone()
                .ok_or_else(|| Error::CallbackUnsupported {
                    name: name.clone(),
                    path: path.to_string(),
                })?;

            match self.callbacks.get(path) {
                Some(existing) if !Arc::ptr_eq(existing, &owner) => {
                    return Err(Error::DuplicateCallback {
                        path: path.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    self.callbacks.insert(path.to_string(), owner);
                }
            }
        }

        tracing::debug!(
            scheme = %name,
            scoped = handler.supports_scopes(),
            callback = ?callback,
            "registered security handler"
        );
        self.handlers.entry(name).or_default().push(handler);
        Ok(())
    }

    /// Freezes the registrations.
    pub fn build(self) -> ResolvedRegistry {
        ResolvedRegistry {
            handlers: self.handlers,
            callbacks: self.callbacks,
        }
    }
}

impl fmt::Debug for RegistrationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationSet")
            .field("handlers", &self.handlers)
            .field("callbacks", &self.callbacks.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Immutable registrations, read by the resolver.
#[derive(Clone, Default)]
pub struct ResolvedRegistry {
    handlers: HashMap<String, Vec<SchemeHandler>>,
    callbacks: BTreeMap<String, Arc<dyn CallbackAuthentication>>,
}

impl ResolvedRegistry {
    /// Returns the handlers registered under `name`, in registration order.
    pub fn handlers_for(&self, name: &str) -> Option<&[SchemeHandler]> {
        self.handlers.get(name).map(Vec::as_slice)
    }

    /// Returns true if any handler is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Iterates over callback paths and their owning handlers, ordered by path.
    pub fn callbacks(&self) -> impl Iterator<Item = (&str, &Arc<dyn CallbackAuthentication>)> {
        self.callbacks.iter().map(|(path, h)| (path.as_str(), h))
    }

    /// Returns the number of registered callback paths.
    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }
}

impl fmt::Debug for ResolvedRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedRegistry")
            .field("handlers", &self.handlers)
            .field("callbacks", &self.callbacks.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::AuthnResult;
    use crate::router::Route;
    use crate::web::RequestContext;
    use async_trait::async_trait;

    struct Plain;

    #[async_trait]
    impl AuthenticationHandler for Plain {
        async fn authenticate(&self, _ctx: &RequestContext) -> AuthnResult {
            Ok(None)
        }
    }

    struct OAuth;

    #[async_trait]
    impl AuthenticationHandler for OAuth {
        async fn authenticate(&self, _ctx: &RequestContext) -> AuthnResult {
            Ok(None)
        }
    }

    impl ScopedAuthentication for OAuth {
        fn with_scopes(&self, _scopes: &[String]) -> Arc<dyn AuthenticationHandler> {
            Arc::new(OAuth)
        }
    }

    impl CallbackAuthentication for OAuth {
        fn setup_callback(&self, _route: &mut Route) {}
    }

    #[test]
    fn handlers_accumulate_per_name() {
        let mut set = RegistrationSet::new();
        set.register("a", SchemeHandler::new(Arc::new(Plain)), None).unwrap();
        set.register("a", SchemeHandler::new(Arc::new(Plain)), None).unwrap();
        set.register("b", SchemeHandler::new(Arc::new(Plain)), None).unwrap();

        let registry = set.build();
        assert_eq!(registry.handlers_for("a").unwrap().len(), 2);
        assert_eq!(registry.handlers_for("b").unwrap().len(), 1);
        assert!(registry.handlers_for("c").is_none());
    }

    #[test]
    fn duplicate_callback_is_rejected() {
        let mut set = RegistrationSet::new();
        set.register("google", SchemeHandler::oauth2(Arc::new(OAuth)), Some("/callback"))
            .unwrap();

        let err = set
            .register("github", SchemeHandler::oauth2(Arc::new(OAuth)), Some("/callback"))
            .unwrap_err();

        assert!(matches!(err, Error::DuplicateCallback { ref path } if path == "/callback"));

        let registry = set.build();
        assert_eq!(registry.callback_count(), 1);
        assert!(!registry.contains("github"));
    }

    #[test]
    fn same_handler_may_reclaim_its_callback() {
        let oauth = SchemeHandler::oauth2(Arc::new(OAuth));
        let mut set = RegistrationSet::new();
        set.register("read", oauth.clone(), Some("/callback")).unwrap();
        set.register("write", oauth, Some("/callback")).unwrap();

        assert_eq!(set.build().callback_count(), 1);
    }

    #[test]
    fn callback_requires_capability() {
        let mut set = RegistrationSet::new();
        let err = set
            .register("basic", SchemeHandler::new(Arc::new(Plain)), Some("/callback"))
            .unwrap_err();

        assert!(matches!(err, Error::CallbackUnsupported { .. }));
        assert!(!set.build().contains("basic"));
    }

    #[test]
    fn narrowing_passes_plain_handlers_through() {
        let plain = SchemeHandler::new(Arc::new(Plain));
        let narrowed = plain.narrowed(&["read".to_string()]);
        assert!(Arc::ptr_eq(&narrowed, plain.handler()));

        let oauth = SchemeHandler::oauth2(Arc::new(OAuth));
        let narrowed = oauth.narrowed(&["read".to_string()]);
        assert!(!Arc::ptr_eq(&narrowed, oauth.handler()));
    }
}
