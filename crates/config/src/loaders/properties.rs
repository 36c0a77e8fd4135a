//! Key/value properties source

use crate::core::parse::insert_dotted;
use crate::core::resolve::escape_literal;
use crate::core::{Bindings, ConfigResult, ConfigSource, Tree};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Source built from dot-notation `key = value` pairs.
///
/// Values stay literal strings; `a.b = 1` becomes `{"a": {"b": "1"}}` and
/// a `${` inside a value is not a substitution.
#[derive(Debug, Clone, Default)]
pub struct PropertiesSource {
    properties: BTreeMap<String, String>,
}

impl PropertiesSource {
    /// Source over `properties`
    pub fn new<K, V>(properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            properties: properties
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Add one property
    #[must_use = "builder methods must be chained or built"]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// The raw properties
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}

impl ConfigSource for PropertiesSource {
    fn load(&self, _bindings: &Bindings) -> ConfigResult<Tree> {
        let mut root = Map::new();
        for (key, value) in &self.properties {
            insert_dotted(&mut root, key, Value::String(escape_literal(value)));
        }
        Ok(Tree::from_map(root).with_origin("properties"))
    }
}

impl fmt::Display for PropertiesSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "properties ({} keys)", self.properties.len())
    }
}
