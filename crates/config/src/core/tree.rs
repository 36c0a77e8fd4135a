//! Configuration tree
//!
//! A [`Tree`] is an object-rooted [`serde_json::Value`] together with an
//! optional origin description. Trees are values: every operation that
//! changes one returns a new tree.

use super::resolve::{ResolveOptions, resolve};
use super::{ConfigError, ConfigResult};
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Merged or unmerged configuration data
#[derive(Clone, Default)]
pub struct Tree {
    root: Map<String, Value>,
    origin: Option<Arc<str>>,
}

impl Tree {
    /// The empty tree
    pub fn empty() -> Self {
        Self::default()
    }

    /// The empty tree, tagged with where it came from
    pub fn empty_with_origin(origin: impl Into<Arc<str>>) -> Self {
        Self {
            root: Map::new(),
            origin: Some(origin.into()),
        }
    }

    /// Build a tree from an object map
    pub fn from_map(root: Map<String, Value>) -> Self {
        Self { root, origin: None }
    }

    /// Build a tree from a JSON value.
    ///
    /// `null` becomes the empty tree; any other non-object is a type error.
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        match value {
            Value::Object(root) => Ok(Self::from_map(root)),
            Value::Null => Ok(Self::empty()),
            other => Err(ConfigError::type_error(
                "Configuration root must be an object",
                "object",
                json_type_name(&other),
            )),
        }
    }

    /// Replace the origin description
    pub fn with_origin(mut self, origin: impl Into<Arc<str>>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Where this tree came from, if known
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Root object
    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Whether the tree has no keys
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Root keys
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }

    /// Copy of the tree as a JSON value
    pub fn as_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    /// Consume the tree into a JSON value
    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// Fallback merge: values already in `self` win, `low` fills the gaps.
    ///
    /// Objects present on both sides merge key by key; any other value in
    /// `self` shadows whatever `low` holds at the same path.
    #[must_use = "with_fallback returns a new tree"]
    pub fn with_fallback(mut self, low: Tree) -> Tree {
        merge_objects(&mut self.root, low.root);
        if self.origin.is_none() {
            self.origin = low.origin;
        }
        self
    }

    /// Value at a dot-separated path
    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup(&self.root, path)
    }

    /// Whether `path` holds a non-null value
    pub fn has_path(&self, path: &str) -> bool {
        self.get(path).is_some_and(|v| !v.is_null())
    }

    /// Read `path` as a string.
    ///
    /// Numbers and booleans are rendered as strings. A missing or null value
    /// is `Ok(None)`; objects and arrays are a type error.
    pub fn get_string(&self, path: &str) -> ConfigResult<Option<String>> {
        match self.get(path) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(other) => Err(ConfigError::type_error(
                format!("Value at '{path}' is not a string"),
                "string",
                json_type_name(other),
            )),
        }
    }

    /// Deserialize the value at `path`, if present
    pub fn get_as<T>(&self, path: &str) -> ConfigResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.get(path) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| {
                    ConfigError::type_error(
                        format!("Failed to deserialize '{path}': {e}"),
                        std::any::type_name::<T>(),
                        json_type_name(value),
                    )
                }),
        }
    }

    /// Deserialize the whole tree
    pub fn deserialize<T>(&self) -> ConfigResult<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(self.as_value()).map_err(|e| {
            ConfigError::type_error(
                format!("Failed to deserialize configuration: {e}"),
                std::any::type_name::<T>(),
                "object",
            )
        })
    }

    /// Return a tree with `value` stored at `path`.
    ///
    /// Intermediate values that are not objects are replaced by objects.
    pub fn with_value(mut self, path: &str, value: Value) -> ConfigResult<Tree> {
        let parts = split_path(path)?;
        let (last, parents) = parts
            .split_last()
            .ok_or_else(|| ConfigError::path_error("Empty path", path))?;

        let mut current = &mut self.root;
        for part in parents {
            let entry = current
                .entry((*part).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            let Value::Object(map) = entry else {
                return Err(ConfigError::path_error("Cannot descend into value", path));
            };
            current = map;
        }
        current.insert((*last).to_string(), value);
        Ok(self)
    }

    /// Return a tree with `path` (and everything under it) removed
    pub fn without_path(mut self, path: &str) -> Tree {
        remove_path(&mut self.root, path);
        self
    }

    /// Nest this tree under a dot-separated path
    pub fn at_path(self, path: &str) -> ConfigResult<Tree> {
        let parts = split_path(path)?;
        let mut value = Value::Object(self.root);
        for part in parts.iter().rev() {
            let mut map = Map::new();
            map.insert((*part).to_string(), value);
            value = Value::Object(map);
        }
        let mut tree = Tree::from_value(value)?;
        tree.origin = self.origin;
        Ok(tree)
    }

    /// Nest this tree under a single key (no path splitting)
    pub fn at_key(self, key: impl Into<String>) -> Tree {
        let mut root = Map::new();
        root.insert(key.into(), Value::Object(self.root));
        Tree {
            root,
            origin: self.origin,
        }
    }

    /// Flatten into dot-notation keys
    pub fn flatten(&self) -> BTreeMap<String, Value> {
        let mut map = BTreeMap::new();
        for (key, value) in &self.root {
            flatten_into(key, value, &mut map);
        }
        map
    }

    /// Substitute `${...}` references against this tree
    pub fn resolve(&self, options: &ResolveOptions) -> ConfigResult<Tree> {
        let root = resolve(&self.root, options)?;
        Ok(Tree {
            root,
            origin: self.origin.clone(),
        })
    }
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("origin", &self.origin)
            .field("root", &self.root)
            .finish()
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.root) {
            Ok(s) => f.write_str(&s),
            Err(_) => f.write_str("{}"),
        }
    }
}

impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

impl TryFrom<Value> for Tree {
    type Error = ConfigError;

    fn try_from(value: Value) -> ConfigResult<Self> {
        Tree::from_value(value)
    }
}

/// Get human-readable type name for a JSON value
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Split a dot-separated path, rejecting empty segments
pub(crate) fn split_path(path: &str) -> ConfigResult<Vec<&str>> {
    if path.is_empty() {
        return Err(ConfigError::path_error("Empty path", path));
    }
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::path_error(
            format!("Path '{path}' has an empty segment"),
            path,
        ));
    }
    Ok(parts)
}

/// Walk `path` from `root`; array segments must be indices
pub(crate) fn lookup<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = root.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Value::Object(obj) => obj.get(part)?,
            Value::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn remove_path(root: &mut Map<String, Value>, path: &str) {
    match path.split_once('.') {
        None => {
            root.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Value::Object(child)) = root.get_mut(head) {
                remove_path(child, rest);
            }
        }
    }
}

fn merge_objects(high: &mut Map<String, Value>, low: Map<String, Value>) {
    for (key, low_value) in low {
        match high.get_mut(&key) {
            Some(Value::Object(high_obj)) => {
                if let Value::Object(low_obj) = low_value {
                    merge_objects(high_obj, low_obj);
                }
            }
            Some(_) => {}
            None => {
                high.insert(key, low_value);
            }
        }
    }
}

fn flatten_into(prefix: &str, value: &Value, map: &mut BTreeMap<String, Value>) {
    match value {
        Value::Object(obj) if !obj.is_empty() => {
            for (key, val) in obj {
                flatten_into(&format!("{prefix}.{key}"), val, map);
            }
        }
        Value::Array(arr) if !arr.is_empty() => {
            for (index, val) in arr.iter().enumerate() {
                flatten_into(&format!("{prefix}[{index}]"), val, map);
            }
        }
        _ => {
            map.insert(prefix.to_string(), value.clone());
        }
    }
}
