//! Ready-made authentication handlers.
//!
//! - `SimpleAuthenticationHandler`: wraps a closure
//! - `ApiKeyHandler`: header-based API keys with scope narrowing

mod api_key;
mod simple;

pub use api_key::ApiKeyHandler;
pub use simple::{BoxError, SimpleAuthenticationHandler};
