use thiserror::Error;

/// Configuration-time errors raised while registering handlers or binding
/// operations to routes.
///
/// None of these are recoverable: they indicate a broken setup and should
/// abort application startup.
#[derive(Debug, Error)]
pub enum Error {
    /// A callback path is already owned by a different handler.
    #[error("callback already in use: {path} [only 1 callback per handler is allowed]")]
    DuplicateCallback {
        /// The contested callback path
        path: String,
    },
    /// A security requirement names a scheme with no registered handler.
    #[error("missing security handler for: '{name}'")]
    MissingSecurityHandler {
        /// The unresolved scheme name
        name: String,
    },
    /// A callback path was given for a handler that cannot install callbacks.
    #[error("handler registered for '{name}' cannot serve callback path {path}")]
    CallbackUnsupported {
        /// The scheme name the handler was registered under
        name: String,
        /// The requested callback path
        path: String,
    },
    /// The API contract could not be read.
    #[error(transparent)]
    Contract(#[from] ContractError),
    /// A configuration value is invalid.
    #[error("invalid configuration {key}: {reason}")]
    Config {
        /// The offending configuration key
        key: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Errors raised while reading an OpenAPI contract.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The document is not valid JSON.
    #[error("contract is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The document is JSON but a security-related node has the wrong shape.
    #[error("invalid contract at {pointer}: {reason}")]
    Invalid {
        /// JSON pointer of the offending node
        pointer: String,
        /// What was expected there
        reason: String,
    },
}

impl ContractError {
    pub(crate) fn invalid(pointer: impl Into<String>, reason: impl Into<String>) -> Self {
        ContractError::Invalid {
            pointer: pointer.into(),
            reason: reason.into(),
        }
    }
}

/// A per-request authentication failure.
///
/// Produced by authentication handlers at request time. Inside an `AnyOf`
/// composite a failure only moves evaluation on to the next alternative;
/// otherwise it is surfaced to the host framework, which maps it to an HTTP
/// status via [`status_code`](Self::status_code).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct AuthnFailure {
    /// The kind of failure
    pub kind: FailureKind,
    /// Human-readable message explaining the failure
    pub message: String,
}

impl AuthnFailure {
    /// Creates a new failure.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for an [`FailureKind::Unauthenticated`] failure.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Unauthenticated, message)
    }

    /// Shorthand for a [`FailureKind::Forbidden`] failure.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Forbidden, message)
    }

    /// Returns the HTTP status code the host should answer with.
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }
}

/// The kind of per-request authentication failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FailureKind {
    /// Credentials are missing or invalid
    #[error("Unauthenticated")]
    Unauthenticated,
    /// Credentials are valid but lack the required scopes
    #[error("Forbidden")]
    Forbidden,
    /// Credentials are malformed
    #[error("Bad request")]
    BadRequest,
    /// The handler itself is misconfigured
    #[error("Internal error")]
    Internal,
}

impl FailureKind {
    /// Returns the HTTP status code for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            FailureKind::Unauthenticated => 401,
            FailureKind::Forbidden => 403,
            FailureKind::BadRequest => 400,
            FailureKind::Internal => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_kinds_map_to_status_codes() {
        assert_eq!(AuthnFailure::unauthenticated("no key").status_code(), 401);
        assert_eq!(AuthnFailure::forbidden("no scope").status_code(), 403);
        assert_eq!(FailureKind::BadRequest.status_code(), 400);
        assert_eq!(FailureKind::Internal.status_code(), 500);
    }

    #[test]
    fn duplicate_callback_message_names_path() {
        let err = Error::DuplicateCallback {
            path: "/callback".to_string(),
        };
        assert!(err.to_string().contains("/callback"));
    }

    #[test]
    fn failure_display_includes_kind_and_message() {
        let failure = AuthnFailure::forbidden("missing scope 'write'");
        assert_eq!(failure.to_string(), "Forbidden: missing scope 'write'");
    }

    #[test]
    fn contract_errors_convert_into_error() {
        let err: Error = ContractError::invalid("/security/0", "expected an object").into();
        assert!(matches!(err, Error::Contract(ContractError::Invalid { .. })));
    }
}
