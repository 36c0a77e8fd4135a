//! Core configuration functionality

pub mod bindings;
pub mod equivalence;
pub mod error;
pub mod factory;
pub mod insertion;
pub mod list;
pub mod parse;
pub mod resolve;
pub mod result;
pub mod source;
pub mod syntax;
pub mod tree;

pub use bindings::{Bindings, CurrentTree};
pub use equivalence::{EqualsEquivalence, Equivalence, EquivalenceKey, IgnoreAsciiCase, MappedEquivalence};
pub use error::{ConfigError, ErrorCategory};
pub use factory::{
    BindStep, ConfigFactory, FileSourceStep, LOAD_PASSES, SourceInsertionStep, config_file,
    config_string, environment, properties, resource,
};
pub use insertion::{ListInsertionStep, Precedence, PrecedenceOrderStep, check_no_duplicates};
pub use list::{SourceList, SourceListInsertion};
pub use parse::{parse_file, parse_file_any_syntax, parse_scalar_value, parse_str};
pub use resolve::{ResolveOptions, escape_literal};
pub use result::{ConfigResult, ConfigResultExt};
pub use source::{
    ConfigSource, ConfigSourceExt, FnSource, NamedSource, SourceName, TreeSource, source_named,
};
pub use syntax::{ParseOptions, Syntax};
pub use tree::Tree;
