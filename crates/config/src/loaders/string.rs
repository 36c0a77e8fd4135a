//! Inline string source

use super::bound_parse_options;
use crate::core::parse::{DEFAULT_SYNTAX, parse_str};
use crate::core::{Bindings, ConfigResult, ConfigSource, Tree};
use std::fmt;

const MAX_DISPLAY_CHARS: usize = 40;
const ELLIPSIS: &str = " ...";

/// Source parsing a configuration string.
///
/// The syntax comes from the bound parse options, TOML when none is forced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringSource {
    text: String,
}

impl StringSource {
    /// Source over `text`
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The configuration text
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl ConfigSource for StringSource {
    fn load(&self, bindings: &Bindings) -> ConfigResult<Tree> {
        let options = bound_parse_options(bindings);
        let syntax = options.syntax.unwrap_or(DEFAULT_SYNTAX);
        let origin = options.origin_description.as_deref().unwrap_or("string");
        parse_str(&self.text, syntax, origin)
    }
}

impl fmt::Display for StringSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "string: {}", ellipsize(&self.text))
    }
}

fn ellipsize(text: &str) -> String {
    if text.chars().count() <= MAX_DISPLAY_CHARS {
        return text.to_string();
    }
    let keep = MAX_DISPLAY_CHARS - ELLIPSIS.len();
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}
