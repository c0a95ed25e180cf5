use super::*;
use serde_json::json;

#[test]
fn defaults_match_spec() {
    let config = Config::default();
    assert!(config.enabled);
    assert_eq!(config.intercepted_tool_names, vec![ToolName::Shell]);
    assert_eq!(config.runtime_binary, "docker");
    assert_eq!(config.bypass_prefixes, vec!["docker ".to_string()]);
    assert_eq!(config.scope, RoutingScope::Root);
    assert!(!config.fallback_to_host);
    assert_eq!(config.container.name_prefix, "opencode");
    assert_eq!(config.container.workdir, "/workspace");
    assert!(!config.container.auto_create);
    assert!(config.container.auto_start);
}

#[test]
fn merge_overrides_only_specified_fields() {
    let value = json!({
        "enabled": false,
        "container": { "image": "img:1", "autoCreate": true }
    });
    let config = Config::default().merge_file_value("router.jsonc", value).unwrap();
    assert!(!config.enabled);
    assert_eq!(config.container.image, "img:1");
    assert!(config.container.auto_create);
    // Untouched fields keep their defaults.
    assert_eq!(config.runtime_binary, "docker");
    assert_eq!(config.container.workdir, "/workspace");
}

#[test]
fn merge_rejects_unknown_top_level_fields() {
    let value = json!({ "totallyUnknown": true });
    let err = Config::default().merge_file_value("router.jsonc", value).unwrap_err();
    match err {
        ConfigError::UnknownFields { fields, .. } => assert!(fields.contains("totallyUnknown")),
        other => panic!("expected UnknownFields, got {other:?}"),
    }
}

#[test]
fn merge_rejects_non_object_top_level() {
    let value = json!([1, 2, 3]);
    let err = Config::default().merge_file_value("router.jsonc", value).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn merge_applies_routing_scope() {
    let value = json!({ "routing": { "scope": "session", "fallbackToHost": true } });
    let config = Config::default().merge_file_value("router.jsonc", value).unwrap();
    assert_eq!(config.scope, RoutingScope::Session);
    assert!(config.fallback_to_host);
}

#[test]
fn merge_applies_tool_names() {
    let value = json!({ "toolNames": ["shell", "read", "grep"] });
    let config = Config::default().merge_file_value("router.jsonc", value).unwrap();
    assert_eq!(
        config.intercepted_tool_names,
        vec![ToolName::Shell, ToolName::Read, ToolName::Grep]
    );
}
