//! End-to-end loading through `ConfigFactory`.

use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;
use std::fs;
use stratum_config::prelude::*;
use stratum_config::{Tree, loaders::PropertiesSource};

fn tree_source(name: &str, value: serde_json::Value) -> NamedSource {
    stratum_config::core::TreeSource(Tree::from_value(value).unwrap()).named(name)
}

fn strict() -> ResolveOptions {
    ResolveOptions::no_environment()
}

#[test]
fn test_precedence_correctness() {
    let factory = ConfigFactory::empty()
        .with_sources(vec![
            tree_source("a", json!({"x": 1})),
            tree_source("b", json!({"x": 2})),
        ])
        .from_highest_to_lowest_precedence()
        .unwrap();
    assert_eq!(factory.load().unwrap().get("x"), Some(&json!(1)));

    let reversed = ConfigFactory::empty()
        .with_sources(vec![
            tree_source("a", json!({"x": 1})),
            tree_source("b", json!({"x": 2})),
        ])
        .from_lowest_to_highest_precedence()
        .unwrap();
    assert_eq!(reversed.load().unwrap().get("x"), Some(&json!(2)));
}

#[test]
fn test_nested_objects_merge() {
    let tree = ConfigFactory::empty()
        .with_resolve_options(strict())
        .with_sources(vec![
            tree_source("high", json!({"db": {"host": "prod"}})),
            tree_source("low", json!({"db": {"host": "dev", "port": 5432}, "name": "svc"})),
        ])
        .from_highest_to_lowest_precedence()
        .unwrap()
        .load()
        .unwrap();
    assert_eq!(
        tree.as_value(),
        json!({"db": {"host": "prod", "port": 5432}, "name": "svc"})
    );
}

#[test]
fn test_two_pass_path_dependency() {
    let dir = tempfile::tempdir().unwrap();
    let b_conf = dir.path().join("b.json");
    fs::write(&b_conf, r#"{"from_b": true, "path": "ignored"}"#).unwrap();

    let factory = ConfigFactory::empty()
        .with_resolve_options(strict())
        .with_sources(vec![
            tree_source("a", json!({"path": b_conf.display().to_string()})),
            config_file().by_key("path"),
        ])
        .from_highest_to_lowest_precedence()
        .unwrap();

    let tree = factory.load().unwrap();
    assert_eq!(tree.get("from_b"), Some(&json!(true)));
    assert_eq!(
        tree.get("path"),
        Some(&json!(b_conf.display().to_string()))
    );
}

#[test]
fn test_second_pass_path_is_not_chased_further() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");
    fs::write(
        &first,
        json!({"next": second.display().to_string()}).to_string(),
    )
    .unwrap();
    fs::write(&second, r#"{"reached": true}"#).unwrap();

    let tree = ConfigFactory::empty()
        .with_resolve_options(strict())
        .with_sources(vec![
            tree_source("start", json!({"entry": first.display().to_string()})),
            config_file().by_key("entry").renamed("entry file"),
            config_file().by_key("next").renamed("next file"),
        ])
        .from_highest_to_lowest_precedence()
        .unwrap()
        .load()
        .unwrap();

    assert!(tree.has_path("next"));
    assert!(!tree.has_path("reached"));
}

#[test]
fn test_substitution_across_sources() {
    let tree = ConfigFactory::empty()
        .with_resolve_options(strict())
        .with_sources(vec![
            tree_source("app", json!({"url": "http://${host}:${port}/"})),
            PropertiesSource::new([("host", "localhost"), ("port", "8080")]).named("props"),
        ])
        .from_highest_to_lowest_precedence()
        .unwrap()
        .load()
        .unwrap();
    assert_eq!(tree.get("url"), Some(&json!("http://localhost:8080/")));
}

#[test]
fn test_substitution_error_names_path() {
    let err = ConfigFactory::empty()
        .with_resolve_options(strict())
        .insert_source(tree_source("a", json!({"x": "${missing.key}"})))
        .with_highest_precedence()
        .unwrap()
        .load()
        .unwrap_err();
    assert!(err.to_string().contains("missing.key"));
}

#[test]
fn test_malformed_file_aborts_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let err = ConfigFactory::empty()
        .insert_source(config_file().by_path(&path))
        .with_highest_precedence()
        .unwrap()
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_resources_and_strings() {
    let resources = EmbeddedResources::new()
        .with("reference.json", r#"{"server": {"port": 80, "host": "0.0.0.0"}}"#)
        .with("application.properties", "server.port=8080");

    #[derive(Debug, Deserialize, PartialEq)]
    struct Server {
        host: String,
        port: u16,
        debug: bool,
    }

    let tree = ConfigFactory::empty()
        .bind_defaults()
        .with_resource_loader(resources)
        .with_resolve_options(strict())
        .with_sources(vec![
            config_string("server.debug = true").named("overrides"),
            resource("application"),
            resource("reference"),
        ])
        .from_highest_to_lowest_precedence()
        .unwrap()
        .load()
        .unwrap();

    let server: Server = tree.get_as("server").unwrap().unwrap();
    assert_eq!(
        server,
        Server {
            host: "0.0.0.0".into(),
            port: 8080,
            debug: true,
        }
    );
}

#[test]
fn test_environment_source_in_factory() {
    let env = EnvironmentSource::from_vars([("SVC_DB_PORT", "6543"), ("UNRELATED", "x")])
        .prefixed("SVC");

    let tree = ConfigFactory::empty()
        .with_resolve_options(strict())
        .with_sources(vec![
            env.named("environment"),
            tree_source("defaults", json!({"db": {"port": 5432, "host": "db"}})),
        ])
        .from_highest_to_lowest_precedence()
        .unwrap()
        .load()
        .unwrap();
    assert_eq!(tree.as_value(), json!({"db": {"port": 6543, "host": "db"}}));
}

#[test]
fn test_environment_and_properties_values_are_not_substituted() {
    let ps1 = "${debian_chroot:+($debian_chroot)}\\u@\\h:\\w\\$ ";
    let env = EnvironmentSource::from_vars([("APP_NAME", "shop"), ("PS1", ps1)]);
    let props = PropertiesSource::new([("greeting", "hello ${user}"), ("copy", "${ps1}")]);

    let tree = ConfigFactory::empty()
        .bind_defaults()
        .with_sources(vec![env.named("environment"), props.named("properties")])
        .from_highest_to_lowest_precedence()
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(tree.get("app.name"), Some(&json!("shop")));
    assert_eq!(tree.get("ps1"), Some(&json!(ps1)));
    assert_eq!(tree.get("greeting"), Some(&json!("hello ${user}")));
    assert_eq!(tree.get("copy"), Some(&json!("${ps1}")));
}

#[test]
fn test_editing_a_factory_leaves_the_original() {
    let base = ConfigFactory::empty()
        .with_sources(vec![
            tree_source("one", json!({"v": 1})),
            tree_source("two", json!({"v": 2})),
        ])
        .from_highest_to_lowest_precedence()
        .unwrap();

    let edited = base.remove_source("one");
    assert_eq!(edited.load().unwrap().get("v"), Some(&json!(2)));
    assert_eq!(base.load().unwrap().get("v"), Some(&json!(1)));

    let err = base
        .insert_source(tree_source("two", json!({})))
        .with_lowest_precedence()
        .unwrap_err();
    assert!(err.is_ordering());
    assert_eq!(base.sources().len(), 2);
}

#[test]
fn test_concurrent_loads_share_one_factory() {
    let factory = std::sync::Arc::new(
        ConfigFactory::empty()
            .with_resolve_options(strict())
            .insert_source(tree_source("a", json!({"a": "${b}", "b": 1})))
            .with_highest_precedence()
            .unwrap(),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let factory = std::sync::Arc::clone(&factory);
            std::thread::spawn(move || factory.load().unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().get("a"), Some(&json!(1)));
    }
}

#[test]
fn test_value_helpers_at_crate_root() {
    assert_eq!(stratum_config::parse_scalar_value("8080"), json!(8080));
    assert_eq!(stratum_config::parse_scalar_value("'quoted'"), json!("quoted"));
    assert_eq!(stratum_config::escape_literal("a ${b}"), "a $${b}");
}
