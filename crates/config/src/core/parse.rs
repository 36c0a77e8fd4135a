//! Parsing text and files into trees

use super::syntax::{ParseOptions, Syntax};
use super::tree::json_type_name;
use super::{ConfigError, ConfigResult, ConfigResultExt, Tree};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Syntax assumed for text whose syntax is neither forced nor detectable
pub const DEFAULT_SYNTAX: Syntax = Syntax::Toml;

/// Parse configuration text
pub fn parse_str(text: &str, syntax: Syntax, origin: &str) -> ConfigResult<Tree> {
    let value = parse_content(text, syntax, origin)?;
    let tree = match value {
        Value::Object(map) => Tree::from_map(map),
        Value::Null => Tree::empty(),
        other => {
            return Err(ConfigError::parse_error(
                origin,
                format!(
                    "Document root must be an object, found {}",
                    json_type_name(&other)
                ),
            ));
        }
    };
    Ok(tree.with_origin(origin))
}

/// Parse a single file.
///
/// The syntax is the forced one from `options`, else the one implied by the
/// extension, else [`DEFAULT_SYNTAX`].
pub fn parse_file(path: &Path, options: &ParseOptions) -> ConfigResult<Tree> {
    let origin = origin_for(path, options);

    let content = match read_file(path).or_missing()? {
        Some(content) => content,
        None if options.allow_missing => {
            tracing::trace!(path = %path.display(), "Configuration file not found, using empty tree");
            return Ok(Tree::empty_with_origin(origin));
        }
        None => return Err(ConfigError::file_not_found(path)),
    };

    let syntax = options
        .syntax
        .or_else(|| Syntax::from_path(path))
        .unwrap_or(DEFAULT_SYNTAX);

    tracing::trace!(path = %path.display(), %syntax, "Parsing configuration file");
    parse_str(&content, syntax, &origin)
}

/// Read a whole file as text.
///
/// A missing path or a directory is reported as
/// [`ConfigError::FileNotFound`].
pub(crate) fn read_file(path: &Path) -> ConfigResult<String> {
    if path.is_dir() {
        return Err(ConfigError::file_not_found(path));
    }
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::file_not_found(path),
        _ => ConfigError::file_read_error(path, e.to_string()),
    })
}

/// Parse a file, probing extensions when the path has none.
///
/// A path with a known extension is parsed directly. Otherwise every
/// `<path>.<ext>` from [`Syntax::PROBE_ORDER`] that exists is parsed and the
/// results are folded with fallback merge, earlier extensions winning.
pub fn parse_file_any_syntax(path: &Path, options: &ParseOptions) -> ConfigResult<Tree> {
    if Syntax::from_path(path).is_some() {
        return parse_file(path, options);
    }

    let candidates: Vec<(PathBuf, Syntax)> = Syntax::PROBE_ORDER
        .iter()
        .filter(|(_, syntax)| options.syntax.is_none_or(|forced| forced == *syntax))
        .filter(|(_, syntax)| syntax.is_supported())
        .map(|(ext, syntax)| (with_extra_extension(path, ext), *syntax))
        .filter(|(candidate, _)| candidate.is_file())
        .collect();

    if candidates.is_empty() {
        return parse_file(path, options);
    }

    let mut tree = Tree::empty();
    for (candidate, syntax) in candidates {
        let forced = options.clone().with_syntax(syntax);
        tree = tree.with_fallback(parse_file(&candidate, &forced)?);
    }
    Ok(tree)
}

fn origin_for(path: &Path, options: &ParseOptions) -> String {
    options
        .origin_description
        .clone()
        .unwrap_or_else(|| path.display().to_string())
}

/// `app` + `toml` -> `app.toml`, keeping any dots already in the file name
fn with_extra_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Parse configuration content based on syntax
pub(crate) fn parse_content(content: &str, syntax: Syntax, origin: &str) -> ConfigResult<Value> {
    match syntax {
        Syntax::Json => serde_json::from_str(content)
            .map_err(|e| ConfigError::parse_error(origin, format!("JSON parse error: {e}"))),
        #[cfg(feature = "toml")]
        Syntax::Toml => toml::from_str::<Value>(content)
            .map_err(|e| ConfigError::parse_error(origin, format!("TOML parse error: {e}"))),
        #[cfg(feature = "yaml")]
        Syntax::Yaml => serde_yaml::from_str::<Value>(content)
            .map_err(|e| ConfigError::parse_error(origin, format!("YAML parse error: {e}"))),
        Syntax::Ini => parse_ini(content, origin),
        Syntax::Properties => parse_properties(content, origin),
        #[allow(unreachable_patterns)]
        other => Err(ConfigError::format_not_supported(other.to_string())),
    }
}

/// Parse a scalar value from string (bool, int, float, or string).
///
/// Surrounding single or double quotes are stripped.
pub fn parse_scalar_value(value: &str) -> Value {
    let value = if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        &value[1..value.len() - 1]
    } else {
        value
    };

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
        && let Some(num) = serde_json::Number::from_f64(float_val)
    {
        return Value::Number(num);
    }
    Value::String(value.to_string())
}

fn parse_ini(content: &str, origin: &str) -> ConfigResult<Value> {
    let mut result = Map::new();
    let mut current_section: Option<String> = None;

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            let section = line[1..line.len() - 1].trim();
            if section.is_empty() {
                return Err(ConfigError::parse_error(
                    origin,
                    format!("Section header missing name at line {}", line_num + 1),
                ));
            }
            result
                .entry(section.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            current_section = Some(section.to_string());
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(ConfigError::parse_error(
                origin,
                format!("Invalid INI format at line {}", line_num + 1),
            ));
        };
        let parsed_value = parse_scalar_value(value.trim());

        match &current_section {
            Some(section) => {
                if let Some(Value::Object(section_obj)) = result.get_mut(section) {
                    section_obj.insert(key.trim().to_string(), parsed_value);
                }
            }
            None => {
                result.insert(key.trim().to_string(), parsed_value);
            }
        }
    }

    Ok(Value::Object(result))
}

fn parse_properties(content: &str, origin: &str) -> ConfigResult<Value> {
    let mut result = Map::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let separator_pos = line.find('=').or_else(|| line.find(':'));
        let Some(pos) = separator_pos else {
            return Err(ConfigError::parse_error(
                origin,
                format!("Invalid properties format at line {}", line_num + 1),
            ));
        };
        insert_dotted(
            &mut result,
            line[..pos].trim(),
            parse_scalar_value(line[pos + 1..].trim()),
        );
    }

    Ok(Value::Object(result))
}

/// Insert `value` under a dot-notation key, creating intermediate objects.
///
/// A scalar already sitting where an object is needed is replaced.
pub(crate) fn insert_dotted(obj: &mut Map<String, Value>, key: &str, value: Value) {
    match key.split_once('.') {
        None => {
            obj.insert(key.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = obj
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(map) = entry {
                insert_dotted(map, rest, value);
            }
        }
    }
}
