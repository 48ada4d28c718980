//! Turns OpenAPI security requirements into composed authentication handlers.
//!
//! An operation's security is an OR of alternatives, each alternative an AND
//! of named schemes. The resolver maps every scheme name to its registered
//! handlers, narrows them to the required scopes, and builds a single
//! [`CompositeAuthHandler`] for the operation's route:
//!
//! ```text
//! [ {api_key}, {oauth: [read], session} ]
//!   => AnyOf[ Single(api_key), AllOf(oauth+read, session) ]
//!
//! [ {}, {api_key} ]
//!   => AnyOf[ Single(api_key), Anonymous ]
//! ```
//!
//! All of this happens once, while routes are being bound. Only the composed
//! handler runs per request.

use std::sync::Arc;

use serde_json::Value;

use crate::composite::CompositeAuthHandler;
use crate::config::ResolverConfig;
use crate::contract::{Contract, Operation, SecurityRequirement};
use crate::error::Error;
use crate::handler::AuthenticationHandler;
use crate::registry::ResolvedRegistry;
use crate::router::{Route, Router};

/// Resolves security requirements against a frozen [`ResolvedRegistry`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use authn_resolver::{
///     ApiKeyHandler, Operation, Principal, RegistrationSet, ResolverConfig, Route,
///     SchemeHandler, SecurityRequirement, SecurityRequirementResolver,
/// };
///
/// let mut set = RegistrationSet::new();
/// let api_key = ApiKeyHandler::new().with_key("k-1", Principal::new("svc", "Billing"));
/// set.register("api_key", SchemeHandler::scoped(Arc::new(api_key)), None).unwrap();
///
/// let resolver = SecurityRequirementResolver::new(set.build(), ResolverConfig::default());
///
/// let operation = Operation::new("GET", "/invoices").with_security(vec![
///     SecurityRequirement::new(),
///     SecurityRequirement::new().with("api_key", Vec::<String>::new()),
/// ]);
///
/// let mut route = Route::new("GET", "/invoices");
/// resolver.solve(&operation, &mut route).unwrap();
///
/// assert!(route.authentication().unwrap().is_optional());
/// ```
#[derive(Debug, Clone)]
pub struct SecurityRequirementResolver {
    registry: ResolvedRegistry,
    config: ResolverConfig,
}

impl SecurityRequirementResolver {
    /// Creates a resolver over frozen registrations.
    pub fn new(registry: ResolvedRegistry, config: ResolverConfig) -> Self {
        Self { registry, config }
    }

    /// Returns the registrations this resolver reads.
    pub fn registry(&self) -> &ResolvedRegistry {
        &self.registry
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Returns the handlers for scheme `name`, narrowed to `scopes`.
    ///
    /// Handlers that support scope narrowing are replaced by a copy enforcing
    /// exactly `scopes`; others pass through unchanged. Non-empty `scopes` are
    /// also published on the route under the configured metadata key.
    ///
    /// # Errors
    ///
    /// [`Error::MissingSecurityHandler`] if `name` has no handlers and
    /// `fail_on_missing` is set. Otherwise a missing name yields an empty list.
    pub fn resolve_handlers_for_name(
        &self,
        route: &mut Route,
        name: &str,
        scopes: &[String],
        fail_on_missing: bool,
    ) -> Result<Vec<Arc<dyn AuthenticationHandler>>, Error> {
        let registered = match self.registry.handlers_for(name) {
            Some(handlers) => handlers,
            None if fail_on_missing => {
                return Err(Error::MissingSecurityHandler {
                    name: name.to_string(),
                });
            }
            None => {
                tracing::warn!(
                    scheme = %name,
                    path = %route.path(),
                    "no security handler registered, scheme ignored"
                );
                return Ok(Vec::new());
            }
        };

        if !scopes.is_empty() {
            route.put_metadata(
                self.config.scopes_metadata_key.clone(),
                Value::from(scopes.to_vec()),
            );
        }

        tracing::debug!(
            scheme = %name,
            handlers = registered.len(),
            scopes = ?scopes,
            "resolved security scheme"
        );

        Ok(registered.iter().map(|h| h.narrowed(scopes)).collect())
    }

    /// Builds the handler for one requirement (an AND of schemes).
    ///
    /// Returns `None` when no scheme resolves to any handler, the handler
    /// itself when exactly one does, and an `AllOf` composite otherwise.
    /// Handlers keep requirement order, then registration order.
    pub fn compose_conjunction(
        &self,
        route: &mut Route,
        requirement: &SecurityRequirement,
        fail_on_missing: bool,
    ) -> Result<Option<CompositeAuthHandler>, Error> {
        let mut handlers = Vec::new();
        for (name, scopes) in requirement.iter() {
            handlers.extend(self.resolve_handlers_for_name(route, name, scopes, fail_on_missing)?);
        }

        Ok(match handlers.len() {
            0 => None,
            1 => handlers.pop().map(CompositeAuthHandler::Single),
            _ => Some(CompositeAuthHandler::AllOf(handlers)),
        })
    }

    /// Builds the handler for an operation's alternatives (an OR of ANDs).
    ///
    /// - No alternatives: `None`, nothing to enforce.
    /// - The first empty alternative marks authentication as optional and is
    ///   set aside; later empty alternatives are treated like any other.
    /// - Nothing left after that: `None`.
    /// - A single alternative and no empty one: its conjunction, unwrapped.
    /// - Otherwise an `AnyOf` over every alternative that resolved to a
    ///   handler, ending in an anonymous branch if authentication is optional
    ///   or if no alternative resolved at all.
    pub fn compose_disjunction(
        &self,
        route: &mut Route,
        requirements: Option<&[SecurityRequirement]>,
        fail_on_missing: bool,
    ) -> Result<Option<CompositeAuthHandler>, Error> {
        let requirements = match requirements {
            Some(reqs) if !reqs.is_empty() => reqs,
            _ => return Ok(None),
        };

        let mut remaining: Vec<&SecurityRequirement> = requirements.iter().collect();
        let optional = match remaining.iter().position(|r| r.is_empty()) {
            Some(index) => {
                remaining.remove(index);
                true
            }
            None => false,
        };

        match remaining.as_slice() {
            [] => return Ok(None),
            [single] if !optional => {
                return self.compose_conjunction(route, single, fail_on_missing);
            }
            _ => {}
        }

        let mut alternatives = Vec::with_capacity(remaining.len() + 1);
        for requirement in remaining {
            if let Some(handler) = self.compose_conjunction(route, requirement, fail_on_missing)? {
                alternatives.push(handler);
            }
        }

        if optional || alternatives.is_empty() {
            alternatives.push(CompositeAuthHandler::Anonymous);
        }

        Ok(Some(CompositeAuthHandler::AnyOf(alternatives)))
    }

    /// Resolves `operation`'s security and attaches the result to `route`.
    ///
    /// Uses the configured missing-handler policy. A route whose operation
    /// requires nothing is left without a handler.
    pub fn solve(&self, operation: &Operation, route: &mut Route) -> Result<(), Error> {
        let handler = self.compose_disjunction(
            route,
            operation.security_requirements(),
            self.config.fail_on_missing_handler,
        )?;

        match handler {
            Some(handler) => {
                tracing::info!(
                    operation = %operation.operation_id(),
                    method = %route.method(),
                    path = %route.path(),
                    shape = %handler.shape(),
                    "attached authentication handler"
                );
                route.set_authentication(handler);
            }
            None => {
                tracing::debug!(
                    operation = %operation.operation_id(),
                    path = %route.path(),
                    "operation requires no authentication"
                );
            }
        }
        Ok(())
    }

    /// Lets every callback-owning handler install itself on its `GET` route.
    pub fn bind_callbacks(&self, router: &mut Router) {
        for (path, handler) in self.registry.callbacks() {
            let route = router.get(path);
            route.set_callback(handler.clone());
            handler.setup_callback(route);
            tracing::debug!(path = %path, "installed authentication callback");
        }
    }

    /// Binds every operation of `contract` to `router`, then installs
    /// callbacks.
    ///
    /// # Errors
    ///
    /// Stops at the first operation that fails to resolve.
    pub fn bind_contract(&self, contract: &Contract, router: &mut Router) -> Result<(), Error> {
        let declared = contract.security_schemes();
        for operation in contract.operations() {
            if !declared.is_empty() {
                for requirement in operation.security_requirements().unwrap_or_default() {
                    for name in requirement.names() {
                        if !declared.iter().any(|d| d == name) {
                            tracing::warn!(
                                operation = %operation.operation_id(),
                                scheme = %name,
                                "security scheme is not declared in components"
                            );
                        }
                    }
                }
            }

            let route = router.route(operation.method(), operation.path());
            self.solve(operation, route)?;
        }

        self.bind_callbacks(router);
        Ok(())
    }
}
