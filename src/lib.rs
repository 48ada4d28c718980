//! Binds OpenAPI security requirements to composed authentication handlers.
//!
//! An OpenAPI operation declares who may call it as a list of security
//! requirements: the caller must satisfy *any one* requirement, and a
//! requirement is satisfied when *all* of its named schemes authenticate.
//! This crate resolves that structure, once per route at startup, into a
//! single [`CompositeAuthHandler`] that runs per request.
//!
//! - **Registration**: handlers are registered per scheme name in a
//!   [`RegistrationSet`], then frozen into a [`ResolvedRegistry`]
//! - **Resolution**: the [`SecurityRequirementResolver`] narrows handlers to
//!   their required scopes and composes them for each [`Route`]
//! - **Callbacks**: OAuth2-style handlers that need a callback route get it
//!   wired once every operation is bound
//! - **Evaluation**: [`web::authenticate_route`] runs a route's handler and
//!   maps failures to HTTP status codes
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use authn_resolver::{
//!     ApiKeyHandler, Contract, Principal, RegistrationSet, ResolverConfig, Router,
//!     SchemeHandler, SecurityRequirementResolver,
//! };
//!
//! let contract = Contract::from_json(r#"{
//!     "security": [{ "api_key": [] }],
//!     "paths": {
//!         "/pets": {
//!             "get": { "operationId": "listPets" },
//!             "post": { "operationId": "createPet", "security": [{ "api_key": ["pets:write"] }] }
//!         },
//!         "/health": { "get": { "operationId": "health", "security": [] } }
//!     },
//!     "components": { "securitySchemes": { "api_key": { "type": "apiKey" } } }
//! }"#).unwrap();
//!
//! let api_key = ApiKeyHandler::new()
//!     .with_key("k-1", Principal::new("svc", "Pets").with_scopes(["pets:write"]));
//!
//! let mut set = RegistrationSet::new();
//! set.register("api_key", SchemeHandler::scoped(Arc::new(api_key)), None).unwrap();
//!
//! let resolver = SecurityRequirementResolver::new(set.build(), ResolverConfig::default());
//! let mut router = Router::new();
//! resolver.bind_contract(&contract, &mut router).unwrap();
//!
//! assert!(router.find("GET", "/pets").unwrap().authentication().is_some());
//! assert!(router.find("GET", "/health").unwrap().authentication().is_none());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod composite;
mod config;
mod contract;
mod error;
mod handler;
mod handlers;
mod logging;
mod registry;
mod request;
mod resolver;
mod router;
pub mod web;

pub use composite::CompositeAuthHandler;
pub use config::{ResolverConfig, ENV_FAIL_ON_MISSING_HANDLER, ENV_SCOPES_METADATA_KEY};
pub use contract::{Contract, Operation, SecurityRequirement};
pub use error::{AuthnFailure, ContractError, Error, FailureKind};
pub use handler::{AuthenticationHandler, AuthnResult, CallbackAuthentication, ScopedAuthentication};
pub use handlers::{ApiKeyHandler, BoxError, SimpleAuthenticationHandler};
pub use logging::AuthnLog;
pub use registry::{RegistrationSet, ResolvedRegistry, SchemeHandler};
pub use request::Principal;
pub use resolver::SecurityRequirementResolver;
pub use router::{Route, Router};
