//! `${...}` substitution
//!
//! References live inside string values and name a dot-separated path from
//! the root of the same tree. `${path}` is required, `${?path}` is optional.
//! A string that is exactly one reference takes the referenced value with
//! its type; references inside longer strings are spliced in as text.
//! `$${` is an escape for a literal `${`.

use super::tree::{json_type_name, lookup};
use super::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options controlling substitution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    /// Leave unresolvable required references in place instead of failing
    pub allow_unresolved: bool,
    /// Fall back to an environment variable named by the path
    pub use_environment: bool,
}

impl ResolveOptions {
    /// Default options: strict, with environment fallback
    pub fn defaults() -> Self {
        Self {
            allow_unresolved: false,
            use_environment: true,
        }
    }

    /// Strict options without environment fallback
    pub fn no_environment() -> Self {
        Self {
            allow_unresolved: false,
            use_environment: false,
        }
    }

    /// Set whether unresolved references are allowed
    #[must_use = "builder methods must be chained or built"]
    pub fn with_allow_unresolved(mut self, allow: bool) -> Self {
        self.allow_unresolved = allow;
        self
    }

    /// Set whether to fall back to environment variables
    #[must_use = "builder methods must be chained or built"]
    pub fn with_use_environment(mut self, use_environment: bool) -> Self {
        self.use_environment = use_environment;
        self
    }
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Escape `s` so that substitution reproduces it unchanged
pub fn escape_literal(s: &str) -> String {
    s.replace("${", "$${")
}

/// [`escape_literal`] applied to every string inside `value`
pub(crate) fn escape_value(value: Value) -> Value {
    match value {
        Value::String(s) if s.contains("${") => Value::String(escape_literal(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(escape_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, escape_value(value)))
                .collect(),
        ),
        other => other,
    }
}

/// Resolve every reference in `root` against `root` itself
pub(crate) fn resolve(
    root: &Map<String, Value>,
    options: &ResolveOptions,
) -> ConfigResult<Map<String, Value>> {
    resolve_with_env(root, options, &|name| std::env::var(name).ok())
}

pub(crate) fn resolve_with_env(
    root: &Map<String, Value>,
    options: &ResolveOptions,
    env: &dyn Fn(&str) -> Option<String>,
) -> ConfigResult<Map<String, Value>> {
    let mut resolver = Resolver {
        root,
        options,
        env,
        stack: Vec::new(),
    };
    resolver.resolve_map(root)
}

#[derive(Debug, PartialEq)]
enum Token<'s> {
    Text(&'s str),
    Reference {
        path: &'s str,
        optional: bool,
        raw: &'s str,
    },
}

/// Split a string into literal text and `${...}` references
fn tokenize(s: &str) -> ConfigResult<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut rest = s;

    while let Some(start) = rest.find("${") {
        if start > 0 && rest.as_bytes()[start - 1] == b'$' {
            if start > 1 {
                tokens.push(Token::Text(&rest[..start - 1]));
            }
            tokens.push(Token::Text(&rest[start..start + 2]));
            rest = &rest[start + 2..];
            continue;
        }
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        if start > 0 {
            tokens.push(Token::Text(&rest[..start]));
        }
        let raw = &rest[start..start + len + 1];
        let inner = raw[2..raw.len() - 1].trim();
        let (path, optional) = match inner.strip_prefix('?') {
            Some(path) => (path.trim(), true),
            None => (inner, false),
        };
        if path.is_empty() || path.split('.').any(str::is_empty) {
            return Err(ConfigError::substitution_error(
                path,
                format!("Malformed reference '{raw}'"),
            ));
        }
        tokens.push(Token::Reference {
            path,
            optional,
            raw,
        });
        rest = &rest[start + len + 1..];
    }

    if !rest.is_empty() {
        tokens.push(Token::Text(rest));
    }
    Ok(tokens)
}

enum Outcome {
    Found(Value),
    /// Optional reference with nothing behind it
    Absent,
    /// Required reference left as written (`allow_unresolved`)
    Unresolved,
}

struct Resolver<'a> {
    root: &'a Map<String, Value>,
    options: &'a ResolveOptions,
    env: &'a dyn Fn(&str) -> Option<String>,
    stack: Vec<String>,
}

impl Resolver<'_> {
    fn resolve_map(&mut self, map: &Map<String, Value>) -> ConfigResult<Map<String, Value>> {
        let mut out = Map::new();
        for (key, value) in map {
            if let Some(resolved) = self.resolve_value(value)? {
                out.insert(key.clone(), resolved);
            }
        }
        Ok(out)
    }

    /// `None` means the value was an absent optional reference
    fn resolve_value(&mut self, value: &Value) -> ConfigResult<Option<Value>> {
        match value {
            Value::String(s) => self.resolve_string(s),
            Value::Object(map) => Ok(Some(Value::Object(self.resolve_map(map)?))),
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(resolved) = self.resolve_value(item)? {
                        out.push(resolved);
                    }
                }
                Ok(Some(Value::Array(out)))
            }
            other => Ok(Some(other.clone())),
        }
    }

    fn resolve_string(&mut self, s: &str) -> ConfigResult<Option<Value>> {
        if !s.contains("${") {
            return Ok(Some(Value::String(s.to_string())));
        }

        let tokens = tokenize(s)?;
        if let [
            Token::Reference {
                path,
                optional,
                raw,
            },
        ] = tokens.as_slice()
        {
            return Ok(match self.reference(path, *optional)? {
                Outcome::Found(value) => Some(value),
                Outcome::Absent => None,
                Outcome::Unresolved => Some(Value::String((*raw).to_string())),
            });
        }

        let mut text = String::with_capacity(s.len());
        for token in tokens {
            match token {
                Token::Text(t) => text.push_str(t),
                Token::Reference {
                    path,
                    optional,
                    raw,
                } => match self.reference(path, optional)? {
                    Outcome::Found(value) => push_scalar(&mut text, path, &value)?,
                    Outcome::Absent => {}
                    Outcome::Unresolved => text.push_str(raw),
                },
            }
        }
        Ok(Some(Value::String(text)))
    }

    fn reference(&mut self, path: &str, optional: bool) -> ConfigResult<Outcome> {
        if self.stack.iter().any(|p| p == path) {
            let mut chain = self.stack.clone();
            chain.push(path.to_string());
            return Err(ConfigError::substitution_error(
                path,
                format!("Cycle in substitutions: {}", chain.join(" -> ")),
            ));
        }

        if let Some(value) = lookup(self.root, path) {
            self.stack.push(path.to_string());
            let resolved = self.resolve_value(value);
            self.stack.pop();
            return Ok(match resolved? {
                Some(value) => Outcome::Found(value),
                None => Outcome::Absent,
            });
        }

        if self.options.use_environment
            && let Some(value) = (self.env)(path)
        {
            return Ok(Outcome::Found(Value::String(value)));
        }

        if optional {
            Ok(Outcome::Absent)
        } else if self.options.allow_unresolved {
            tracing::trace!(path, "Leaving unresolved substitution in place");
            Ok(Outcome::Unresolved)
        } else {
            Err(ConfigError::substitution_error(
                path,
                "No configuration setting found for key",
            ))
        }
    }
}

fn push_scalar(text: &mut String, path: &str, value: &Value) -> ConfigResult<()> {
    match value {
        Value::Null => {}
        Value::String(s) => text.push_str(s),
        Value::Number(n) => text.push_str(&n.to_string()),
        Value::Bool(b) => text.push_str(if *b { "true" } else { "false" }),
        other => {
            return Err(ConfigError::substitution_error(
                path,
                format!(
                    "Cannot concatenate {} into a string",
                    json_type_name(other)
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn run(value: Value, options: ResolveOptions) -> ConfigResult<Value> {
        let Value::Object(map) = value else {
            panic!("test input must be an object")
        };
        resolve_with_env(&map, &options, &no_env).map(Value::Object)
    }

    #[test]
    fn test_tokenize() {
        let tokens = tokenize("http://${host}:${?port}/x").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Text("http://"),
                Token::Reference {
                    path: "host",
                    optional: false,
                    raw: "${host}"
                },
                Token::Text(":"),
                Token::Reference {
                    path: "port",
                    optional: true,
                    raw: "${?port}"
                },
                Token::Text("/x"),
            ]
        );
        assert_eq!(tokenize("no end ${x").unwrap(), vec![Token::Text("no end ${x")]);
        assert!(tokenize("${}").is_err());
        assert!(tokenize("${a..b}").is_err());
        assert_eq!(
            tokenize("a$${b}").unwrap(),
            vec![Token::Text("a"), Token::Text("${"), Token::Text("b}")]
        );
    }

    #[test]
    fn test_escaped_text_stays_literal() {
        let raw = ["${debian_chroot:+($debian_chroot)}\\u@\\h:\\w\\$ ", "$${x}", "$", "${"];
        let Value::Object(map) = json!({
            "ps1": escape_literal(raw[0]),
            "dollars": escape_literal(raw[1]),
            "lone": escape_literal(raw[2]),
            "open": escape_literal(raw[3]),
            "list": escape_value(json!(["${a}", {"k": "${b}"}, 3])),
        }) else {
            unreachable!()
        };

        let resolved = resolve_with_env(&map, &ResolveOptions::defaults(), &no_env).unwrap();
        assert_eq!(
            Value::Object(resolved),
            json!({
                "ps1": raw[0],
                "dollars": raw[1],
                "lone": raw[2],
                "open": raw[3],
                "list": ["${a}", {"k": "${b}"}, 3],
            })
        );
    }

    #[test]
    fn test_reference_to_escaped_value() {
        let resolved = run(
            json!({"raw": escape_literal("${x}"), "copy": "${raw}", "text": "<${raw}>"}),
            ResolveOptions::no_environment(),
        )
        .unwrap();
        assert_eq!(resolved["copy"], json!("${x}"));
        assert_eq!(resolved["text"], json!("<${x}>"));
    }

    #[test]
    fn test_whole_value_keeps_type() {
        let resolved = run(
            json!({
                "base": {"port": 8080, "tags": ["a"]},
                "port": "${base.port}",
                "copy": "${base}",
            }),
            ResolveOptions::no_environment(),
        )
        .unwrap();
        assert_eq!(resolved["port"], json!(8080));
        assert_eq!(resolved["copy"], json!({"port": 8080, "tags": ["a"]}));
    }

    #[test]
    fn test_concatenation_and_chains() {
        let resolved = run(
            json!({
                "host": "localhost",
                "port": 5432,
                "alias": "${host}",
                "url": "postgres://${alias}:${port}/app",
            }),
            ResolveOptions::no_environment(),
        )
        .unwrap();
        assert_eq!(resolved["url"], json!("postgres://localhost:5432/app"));
    }

    #[test]
    fn test_optional_reference() {
        let resolved = run(
            json!({"a": "${?missing}", "b": "x${?missing}y", "list": ["${?missing}", 1]}),
            ResolveOptions::no_environment(),
        )
        .unwrap();
        assert_eq!(resolved, json!({"b": "xy", "list": [1]}));
    }

    #[test]
    fn test_missing_required_reference() {
        let err = run(json!({"a": "${db.host}"}), ResolveOptions::no_environment()).unwrap_err();
        assert!(matches!(err, ConfigError::SubstitutionError { ref path, .. } if path == "db.host"));
    }

    #[test]
    fn test_allow_unresolved_keeps_text() {
        let options = ResolveOptions::no_environment().with_allow_unresolved(true);
        let resolved = run(json!({"a": "${x}", "b": "pre-${x}"}), options).unwrap();
        assert_eq!(resolved, json!({"a": "${x}", "b": "pre-${x}"}));
    }

    #[test]
    fn test_environment_fallback() {
        let env = |name: &str| (name == "HOME_DIR").then(|| "/home/app".to_string());
        let Value::Object(map) = json!({"home": "${HOME_DIR}", "local": "${home}/.app"}) else {
            unreachable!()
        };

        let resolved = resolve_with_env(&map, &ResolveOptions::defaults(), &env).unwrap();
        assert_eq!(resolved["local"], json!("/home/app/.app"));

        let err = resolve_with_env(&map, &ResolveOptions::no_environment(), &env).unwrap_err();
        assert!(matches!(err, ConfigError::SubstitutionError { .. }));
    }

    #[test]
    fn test_tree_value_wins_over_environment() {
        let env = |_: &str| Some("from-env".to_string());
        let Value::Object(map) = json!({"name": "tree", "greeting": "${name}"}) else {
            unreachable!()
        };
        let resolved = resolve_with_env(&map, &ResolveOptions::defaults(), &env).unwrap();
        assert_eq!(resolved["greeting"], json!("tree"));
    }

    #[test]
    fn test_cycles_are_errors() {
        let err = run(json!({"a": "${b}", "b": "${a}"}), ResolveOptions::no_environment())
            .unwrap_err();
        assert!(err.to_string().contains("Cycle"));

        let err = run(json!({"a": {"b": "${a}"}}), ResolveOptions::no_environment()).unwrap_err();
        assert!(matches!(err, ConfigError::SubstitutionError { ref path, .. } if path == "a"));
    }

    #[test]
    fn test_cannot_concatenate_objects() {
        let err = run(
            json!({"obj": {"k": 1}, "s": "x-${obj}"}),
            ResolveOptions::no_environment(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Cannot concatenate object"));
    }
}
