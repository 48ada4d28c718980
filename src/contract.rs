//! Security requirements as declared by an OpenAPI 3 contract.

use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;

use crate::error::ContractError;

const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// A conjunction of security schemes, each with the scopes it must carry.
///
/// Every named scheme has to authenticate the request. Entries keep the
/// order in which they were declared; a name appears at most once.
/// An empty requirement stands for "no authentication needed".
///
/// Deserializes from the OpenAPI security requirement object shape,
/// `{"scheme": ["scope", ...]}`.
///
/// # Examples
///
/// ```
/// use authn_resolver::SecurityRequirement;
///
/// let req = SecurityRequirement::new()
///     .with("api_key", Vec::<String>::new())
///     .with("oauth", ["pets:read"]);
///
/// assert_eq!(req.names().collect::<Vec<_>>(), vec!["api_key", "oauth"]);
/// assert_eq!(req.scopes("oauth"), ["pets:read".to_string()]);
/// assert!(req.scopes("api_key").is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityRequirement {
    entries: Vec<(String, Vec<String>)>,
}

impl SecurityRequirement {
    /// Creates an empty requirement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a scheme with its required scopes, replacing an earlier entry
    /// for the same name.
    pub fn with<I, S>(mut self, name: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let scopes: Vec<String> = scopes.into_iter().map(Into::into).collect();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = scopes,
            None => self.entries.push((name, scopes)),
        }
        self
    }

    /// Returns true if no scheme is named.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the scheme names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Returns the scopes required for `name`; empty if none or not named.
    pub fn scopes(&self, name: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, scopes)| scopes.as_slice())
            .unwrap_or(&[])
    }

    /// Iterates over `(name, scopes)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, scopes)| (name.as_str(), scopes.as_slice()))
    }
}

impl<'de> Deserialize<'de> for SecurityRequirement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RequirementVisitor;

        impl<'de> Visitor<'de> for RequirementVisitor {
            type Value = SecurityRequirement;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of security scheme names to scope lists")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut requirement = SecurityRequirement::new();
                while let Some((name, scopes)) = map.next_entry::<String, Vec<String>>()? {
                    requirement = requirement.with(name, scopes);
                }
                Ok(requirement)
            }
        }

        deserializer.deserialize_map(RequirementVisitor)
    }
}

/// One API operation and the security alternatives that apply to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    operation_id: String,
    method: String,
    path: String,
    security: Option<Vec<SecurityRequirement>>,
}

impl Operation {
    /// Creates an operation without security requirements.
    ///
    /// The operation id defaults to `"METHOD path"`.
    pub fn new(method: &str, path: impl Into<String>) -> Self {
        let method = method.to_ascii_uppercase();
        let path = path.into();
        Self {
            operation_id: format!("{} {}", method, path),
            method,
            path,
            security: None,
        }
    }

    /// Sets the operation id.
    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = operation_id.into();
        self
    }

    /// Sets the security alternatives (OR of requirements).
    pub fn with_security(mut self, security: Vec<SecurityRequirement>) -> Self {
        self.security = Some(security);
        self
    }

    /// Returns the operation id.
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Returns the upper-cased HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the path template.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the effective security alternatives, if any are declared.
    pub fn security_requirements(&self) -> Option<&[SecurityRequirement]> {
        self.security.as_deref()
    }
}

/// The security-relevant view of an OpenAPI 3 document.
#[derive(Debug, Clone, Default)]
pub struct Contract {
    operations: Vec<Operation>,
    security_schemes: Vec<String>,
}

impl Contract {
    /// Parses a JSON OpenAPI document.
    ///
    /// # Errors
    ///
    /// [`ContractError::Json`] for malformed JSON, [`ContractError::Invalid`]
    /// for security nodes of the wrong shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use authn_resolver::Contract;
    ///
    /// let contract = Contract::from_json(r#"{
    ///     "openapi": "3.0.3",
    ///     "security": [{"api_key": []}],
    ///     "paths": {
    ///         "/pets": {
    ///             "get": {"operationId": "listPets"},
    ///             "post": {"operationId": "createPet", "security": []}
    ///         }
    ///     }
    /// }"#).unwrap();
    ///
    /// let list = contract.operation("listPets").unwrap();
    /// assert_eq!(list.security_requirements().map(|s| s.len()), Some(1));
    ///
    /// let create = contract.operation("createPet").unwrap();
    /// assert_eq!(create.security_requirements().map(|s| s.len()), Some(0));
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ContractError> {
        let document: Value = serde_json::from_str(json)?;
        Self::from_value(&document)
    }

    /// Reads an already parsed OpenAPI document.
    pub fn from_value(document: &Value) -> Result<Self, ContractError> {
        let default_security = match document.get("security") {
            Some(value) => Some(parse_security(value, "/security")?),
            None => None,
        };

        let security_schemes = document
            .pointer("/components/securitySchemes")
            .and_then(Value::as_object)
            .map(|schemes| schemes.keys().cloned().collect())
            .unwrap_or_default();

        let mut operations = Vec::new();
        if let Some(paths) = document.get("paths") {
            let paths = paths
                .as_object()
                .ok_or_else(|| ContractError::invalid("/paths", "expected an object"))?;

            for (path, item) in paths {
                let item_pointer = format!("/paths/{}", escape_pointer(path));
                let item = item.as_object().ok_or_else(|| {
                    ContractError::invalid(item_pointer.as_str(), "expected a path item object")
                })?;

                for (method, op) in item {
                    if !HTTP_METHODS.contains(&method.as_str()) {
                        continue;
                    }
                    let op_pointer = format!("{}/{}", item_pointer, method);
                    operations.push(parse_operation(
                        method,
                        path,
                        op,
                        &op_pointer,
                        default_security.as_ref(),
                    )?);
                }
            }
        }

        Ok(Self {
            operations,
            security_schemes,
        })
    }

    /// Returns every operation in document order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Looks up an operation by id.
    pub fn operation(&self, operation_id: &str) -> Option<&Operation> {
        self.operations
            .iter()
            .find(|op| op.operation_id == operation_id)
    }

    /// Returns the names declared under `components.securitySchemes`.
    pub fn security_schemes(&self) -> &[String] {
        &self.security_schemes
    }
}

fn parse_operation(
    method: &str,
    path: &str,
    op: &Value,
    pointer: &str,
    default_security: Option<&Vec<SecurityRequirement>>,
) -> Result<Operation, ContractError> {
    let op = op
        .as_object()
        .ok_or_else(|| ContractError::invalid(pointer, "expected an operation object"))?;

    let mut operation = Operation::new(method, path);
    if let Some(id) = op.get("operationId") {
        let id = id.as_str().ok_or_else(|| {
            ContractError::invalid(format!("{}/operationId", pointer), "expected a string")
        })?;
        operation = operation.with_operation_id(id);
    }

    // an explicit `security: []` opts out of the document default
    let security = match op.get("security") {
        Some(value) => Some(parse_security(value, &format!("{}/security", pointer))?),
        None => default_security.cloned(),
    };
    operation.security = security;

    Ok(operation)
}

fn parse_security(value: &Value, pointer: &str) -> Result<Vec<SecurityRequirement>, ContractError> {
    Vec::<SecurityRequirement>::deserialize(value)
        .map_err(|err| ContractError::invalid(pointer, err.to_string()))
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
