use serde::Deserialize;

use crate::error::Error;

/// Environment variable controlling [`ResolverConfig::fail_on_missing_handler`].
pub const ENV_FAIL_ON_MISSING_HANDLER: &str = "AUTHN_FAIL_ON_MISSING_HANDLER";
/// Environment variable controlling [`ResolverConfig::scopes_metadata_key`].
pub const ENV_SCOPES_METADATA_KEY: &str = "AUTHN_SCOPES_METADATA_KEY";

/// Settings for binding contract operations to routes.
///
/// # Examples
///
/// ```
/// use authn_resolver::ResolverConfig;
///
/// let config: ResolverConfig =
///     serde_json::from_str(r#"{"fail_on_missing_handler": false}"#).unwrap();
///
/// assert!(!config.fail_on_missing_handler);
/// assert_eq!(config.scopes_metadata_key, "scopes");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Abort binding when a requirement names a scheme with no handler.
    /// When false, such schemes contribute nothing.
    pub fail_on_missing_handler: bool,
    /// Route metadata key under which required scopes are published.
    pub scopes_metadata_key: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fail_on_missing_handler: true,
            scopes_metadata_key: "scopes".to_string(),
        }
    }
}

impl ResolverConfig {
    /// Reads overrides from the process environment.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_FAIL_ON_MISSING_HANDLER) {
            config.fail_on_missing_handler = parse_bool(&raw).ok_or_else(|| Error::Config {
                key: ENV_FAIL_ON_MISSING_HANDLER,
                reason: format!("expected a boolean, got '{}'", raw),
            })?;
        }

        if let Some(raw) = lookup(ENV_SCOPES_METADATA_KEY) {
            let key = raw.trim();
            if key.is_empty() {
                return Err(Error::Config {
                    key: ENV_SCOPES_METADATA_KEY,
                    reason: "must not be empty".to_string(),
                });
            }
            config.scopes_metadata_key = key.to_string();
        }

        Ok(config)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_variables() {
        let config = ResolverConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ResolverConfig::default());
        assert!(config.fail_on_missing_handler);
    }

    #[test]
    fn variables_override_defaults() {
        let config = ResolverConfig::from_lookup(lookup(&[
            (ENV_FAIL_ON_MISSING_HANDLER, "No"),
            (ENV_SCOPES_METADATA_KEY, "x-scopes"),
        ]))
        .unwrap();

        assert!(!config.fail_on_missing_handler);
        assert_eq!(config.scopes_metadata_key, "x-scopes");
    }

    #[test]
    fn invalid_boolean_is_rejected() {
        let err = ResolverConfig::from_lookup(lookup(&[(ENV_FAIL_ON_MISSING_HANDLER, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config { key, .. } if key == ENV_FAIL_ON_MISSING_HANDLER));
    }

    #[test]
    fn blank_metadata_key_is_rejected() {
        assert!(ResolverConfig::from_lookup(lookup(&[(ENV_SCOPES_METADATA_KEY, "  ")])).is_err());
    }
}
