//! Environment variable source

use crate::core::resolve::escape_value;
use crate::core::{Bindings, ConfigResult, ConfigSource, Tree};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Source reading process environment variables.
///
/// Variable names are split on the separator into nested keys, so
/// `APP_DB_HOST=x` with prefix `APP` becomes `db.host = "x"`. Values are
/// typed: booleans, numbers, JSON arrays/objects and comma lists are
/// recognised, anything else stays a string. Values are data, never
/// substitution templates: a `${` inside one survives resolution as written.
#[derive(Debug, Clone)]
pub struct EnvironmentSource {
    /// Prefix variables must carry; stripped before splitting
    pub prefix: Option<String>,

    /// Separator for nested keys
    pub separator: String,

    /// Keep key case instead of lower-casing
    pub case_sensitive: bool,

    /// Whether to log sensitive values
    pub log_sensitive: bool,

    vars: Option<Vec<(String, String)>>,
}

impl EnvironmentSource {
    /// Read the whole process environment
    pub fn new() -> Self {
        Self {
            prefix: None,
            separator: "_".to_string(),
            case_sensitive: false,
            log_sensitive: false,
            vars: None,
        }
    }

    /// Read only variables starting with `prefix`
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::new()
        }
    }

    /// Read from a fixed set of variables instead of the process environment
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            ..Self::new()
        }
    }

    /// Set the prefix
    #[must_use = "builder methods must be chained or built"]
    pub fn prefixed(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set separator for nested keys
    #[must_use = "builder methods must be chained or built"]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Set case sensitivity
    #[must_use = "builder methods must be chained or built"]
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Set whether to log sensitive values
    #[must_use = "builder methods must be chained or built"]
    pub fn with_log_sensitive(mut self, log_sensitive: bool) -> Self {
        self.log_sensitive = log_sensitive;
        self
    }

    /// Check if a key is sensitive
    fn is_sensitive_key(key: &str) -> bool {
        let key_lower = key.to_lowercase();
        key_lower.contains("password")
            || key_lower.contains("secret")
            || key_lower.contains("token")
            || key_lower.contains("api_key")
            || key_lower.contains("private")
            || key_lower.contains("credential")
    }

    fn raw_vars(&self) -> Vec<(String, String)> {
        match &self.vars {
            Some(vars) => vars.clone(),
            None => std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    /// Variables that pass the prefix filter, prefix stripped, sorted by key
    fn filtered_vars(&self) -> BTreeMap<String, String> {
        let prefix = self.prefix.as_deref().map(|p| {
            if self.case_sensitive {
                p.to_string()
            } else {
                p.to_ascii_uppercase()
            }
        });

        self.raw_vars()
            .into_iter()
            .filter_map(|(key, value)| {
                let Some(prefix) = &prefix else {
                    return Some((key, value));
                };
                let key_to_check = if self.case_sensitive {
                    key.clone()
                } else {
                    key.to_ascii_uppercase()
                };
                let stripped = key_to_check
                    .strip_prefix(prefix.as_str())?
                    .trim_start_matches(self.separator.as_str());
                if stripped.is_empty() {
                    None
                } else {
                    // keep the original spelling of the remaining key
                    let start = key.len() - stripped.len();
                    Some((key[start..].to_string(), value))
                }
            })
            .collect()
    }

    /// Convert environment variables to nested JSON structure
    fn env_to_tree(&self, vars: BTreeMap<String, String>) -> Tree {
        let mut result = Map::new();

        for (key, value) in vars {
            if Self::is_sensitive_key(&key) && !self.log_sensitive {
                tracing::trace!(key = %key, "Loading env config: [REDACTED]");
            } else {
                tracing::trace!(key = %key, value = %value, "Loading env config");
            }

            let parts: Vec<&str> = key
                .split(self.separator.as_str())
                .filter(|p| !p.is_empty())
                .collect();
            self.insert_nested(&mut result, &parts, &value);
        }

        Tree::from_map(result).with_origin("environment")
    }

    /// Insert value into nested structure; later variables replace scalars
    fn insert_nested(&self, obj: &mut Map<String, Value>, parts: &[&str], value: &str) {
        let Some((first, rest)) = parts.split_first() else {
            return;
        };
        let key = if self.case_sensitive {
            (*first).to_string()
        } else {
            first.to_lowercase()
        };

        if rest.is_empty() {
            obj.insert(key, escape_value(parse_env_value(value)));
            return;
        }

        let nested = obj
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()));
        if !nested.is_object() {
            *nested = Value::Object(Map::new());
        }
        if let Value::Object(nested_obj) = nested {
            self.insert_nested(nested_obj, rest, value);
        }
    }
}

impl Default for EnvironmentSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for EnvironmentSource {
    fn load(&self, _bindings: &Bindings) -> ConfigResult<Tree> {
        let vars = self.filtered_vars();

        match &self.prefix {
            Some(prefix) if vars.is_empty() => {
                tracing::debug!(prefix = %prefix, "No environment variables found with prefix");
            }
            Some(prefix) => {
                tracing::debug!(count = vars.len(), prefix = %prefix, "Loaded environment variables");
            }
            None => {
                tracing::debug!(count = vars.len(), "Loaded environment variables");
            }
        }

        Ok(self.env_to_tree(vars))
    }
}

impl fmt::Display for EnvironmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "environment variables (prefix: {prefix})"),
            None => write!(f, "environment variables"),
        }
    }
}

/// Parse environment variable value
fn parse_env_value(value: &str) -> Value {
    if value.is_empty() {
        return Value::String(String::new());
    }

    if value.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if value.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    if let Ok(int_val) = value.parse::<i64>() {
        return Value::Number(int_val.into());
    }

    if let Ok(float_val) = value.parse::<f64>()
        && float_val.is_finite()
        && let Some(num) = serde_json::Number::from_f64(float_val)
    {
        return Value::Number(num);
    }

    if ((value.starts_with('{') && value.ends_with('}'))
        || (value.starts_with('[') && value.ends_with(']')))
        && let Ok(json_val) = serde_json::from_str(value)
    {
        return json_val;
    }

    if value.contains(',') && !value.starts_with('"') {
        let items = value.split(',').map(|s| parse_env_value(s.trim())).collect();
        return Value::Array(items);
    }

    Value::String(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_env_value() {
        assert_eq!(parse_env_value("true"), Value::Bool(true));
        assert_eq!(parse_env_value("FALSE"), Value::Bool(false));
        assert_eq!(parse_env_value("42"), json!(42));
        assert_eq!(parse_env_value("2.5"), json!(2.5));
        assert_eq!(parse_env_value("one,two,3"), json!(["one", "two", 3]));
        assert_eq!(parse_env_value(r#"{"key":"value"}"#), json!({"key": "value"}));
        assert_eq!(parse_env_value("hello world"), json!("hello world"));
        assert_eq!(parse_env_value("inf"), json!("inf"));
    }

    #[test]
    fn test_is_sensitive_key() {
        assert!(EnvironmentSource::is_sensitive_key("PASSWORD"));
        assert!(EnvironmentSource::is_sensitive_key("api_key"));
        assert!(EnvironmentSource::is_sensitive_key("SECRET_TOKEN"));
        assert!(!EnvironmentSource::is_sensitive_key("USERNAME"));
        assert!(!EnvironmentSource::is_sensitive_key("PORT"));
    }

    #[test]
    fn test_prefix_is_stripped_and_keys_nest() {
        let source = EnvironmentSource::from_vars([
            ("APP_DB_HOST", "db.local"),
            ("APP_DB_PORT", "5432"),
            ("APP_DEBUG", "true"),
            ("OTHER_VAR", "ignored"),
            ("APP", "no key left"),
        ])
        .prefixed("app");

        let tree = source.load(&Bindings::none()).unwrap();
        assert_eq!(
            tree.as_value(),
            json!({"db": {"host": "db.local", "port": 5432}, "debug": true})
        );
        assert_eq!(tree.origin(), Some("environment"));
    }

    #[test]
    fn test_case_sensitive_and_separator() {
        let source = EnvironmentSource::from_vars([("Svc__Name", "api")])
            .with_separator("__")
            .with_case_sensitive(true);
        let tree = source.load(&Bindings::none()).unwrap();
        assert_eq!(tree.as_value(), json!({"Svc": {"Name": "api"}}));
    }

    #[test]
    fn test_nested_key_replaces_scalar() {
        let source = EnvironmentSource::from_vars([("A_B", "2"), ("A", "1")]);
        let tree = source.load(&Bindings::none()).unwrap();
        assert_eq!(tree.as_value(), json!({"a": {"b": 2}}));
    }

    #[test]
    fn test_values_are_escaped() {
        let source = EnvironmentSource::from_vars([
            ("PS1", "${debian_chroot:+($debian_chroot)}\\u@\\h"),
            ("LIST", r#"["${a}", 1]"#),
        ]);
        let tree = source.load(&Bindings::none()).unwrap();
        assert_eq!(
            tree.as_value(),
            json!({"ps1": "$${debian_chroot:+($debian_chroot)}\\u@\\h", "list": ["$${a}", 1]})
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(EnvironmentSource::new().to_string(), "environment variables");
        assert_eq!(
            EnvironmentSource::with_prefix("APP").to_string(),
            "environment variables (prefix: APP)"
        );
    }
}
