use serde::{Deserialize, Serialize};

/// An authenticated user or service principal.
///
/// Handlers return a principal on successful authentication. `scopes` holds
/// the authorization scopes granted to it, which scope-narrowed handlers check
/// against the scopes an operation requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Unique identifier for this principal
    pub id: String,
    /// Display name
    pub name: String,
    /// Scopes granted to this principal
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl Principal {
    /// Creates a principal with no granted scopes.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            scopes: Vec::new(),
        }
    }

    /// Adds granted scopes.
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes.extend(scopes.into_iter().map(Into::into));
        self
    }

    /// Returns the first of `required` that this principal was not granted.
    pub fn missing_scope<'a>(&self, required: &'a [String]) -> Option<&'a str> {
        required
            .iter()
            .find(|scope| !self.scopes.contains(scope))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_scope_reports_first_gap() {
        let principal = Principal::new("u1", "Alice").with_scopes(["read"]);
        let required = vec!["read".to_string(), "write".to_string()];

        assert_eq!(principal.missing_scope(&required), Some("write"));
    }

    #[test]
    fn no_required_scopes_is_never_missing() {
        let principal = Principal::new("u1", "Alice");
        assert_eq!(principal.missing_scope(&[]), None);
    }

    #[test]
    fn scopes_default_when_absent_in_json() {
        let principal: Principal =
            serde_json::from_str(r#"{"id":"svc","name":"Billing"}"#).unwrap();
        assert!(principal.scopes.is_empty());
    }
}
