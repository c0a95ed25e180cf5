// SPDX-License-Identifier: MIT

//! `Config`: frozen configuration for one agent process (spec §3, §6).
//!
//! This module only defines the data shape, its defaults, and the pure
//! merge of a parsed file overlay onto an existing `Config`. Reading
//! environment variables and the `.sandbox/router.jsonc` file itself is
//! `oc-sandbox-router::config_load`'s job, grounded on the teacher's
//! `daemon/src/env.rs` / `lifecycle/mod.rs::Config::load()` split between
//! a pure core crate and an I/O-performing daemon crate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tool::ToolName;

/// `routing.scope`: whether a session's routing key is the live session
/// id or the root of its parent chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingScope {
    Session,
    Root,
}

impl Default for RoutingScope {
    fn default() -> Self {
        RoutingScope::Root
    }
}

/// `container.*`: how to create/reach this process's managed container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerConfig {
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,
    #[serde(default)]
    pub image: String,
    #[serde(default = "default_workdir")]
    pub workdir: String,
    #[serde(default)]
    pub project_path_override: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub mounts: Vec<String>,
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default)]
    pub auto_create: bool,
    #[serde(default = "default_true")]
    pub auto_start: bool,
    /// If set, pins every scope to this single shared container name.
    #[serde(default)]
    pub name: Option<String>,
}

fn default_name_prefix() -> String {
    "opencode".to_string()
}

fn default_workdir() -> String {
    "/workspace".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            name_prefix: default_name_prefix(),
            image: String::new(),
            workdir: default_workdir(),
            project_path_override: None,
            network: None,
            env: BTreeMap::new(),
            mounts: Vec::new(),
            command: vec!["sleep".to_string(), "infinity".to_string()],
            auto_create: false,
            auto_start: true,
            name: None,
        }
    }
}

/// Frozen configuration for one agent process. Built once at startup by
/// merging defaults ← env-var overrides ← file overrides; immutable
/// thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub enabled: bool,
    pub intercepted_tool_names: Vec<ToolName>,
    pub runtime_binary: String,
    pub bypass_prefixes: Vec<String>,
    pub state_file_path: Option<String>,
    pub scope: RoutingScope,
    pub fallback_to_host: bool,
    pub container: ContainerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            intercepted_tool_names: vec![ToolName::Shell],
            runtime_binary: "docker".to_string(),
            bypass_prefixes: vec!["docker ".to_string()],
            state_file_path: None,
            scope: RoutingScope::Root,
            fallback_to_host: false,
            container: ContainerConfig::default(),
        }
    }
}

impl Config {
    /// `true` if `tool` is in `interceptedToolNames`.
    pub fn intercepts(&self, tool: ToolName) -> bool {
        self.intercepted_tool_names.contains(&tool)
    }

    /// Merge a parsed `.sandbox/router.jsonc` document onto `self`,
    /// rejecting unrecognised top-level keys. Pure: takes an already
    /// parsed `serde_json::Value`; reading and parsing the file itself
    /// happens in the router crate.
    pub fn merge_file_value(mut self, path: &str, value: serde_json::Value) -> Result<Self, ConfigError> {
        let object = match value.as_object() {
            Some(obj) => obj,
            None => {
                return Err(ConfigError::Parse {
                    path: path.to_string(),
                    message: "top level must be a JSON object".to_string(),
                })
            }
        };

        const KNOWN_KEYS: &[&str] = &[
            "enabled",
            "toolNames",
            "runtimeBinary",
            "bypassPrefixes",
            "stateFile",
            "routing",
            "container",
        ];
        let unknown: Vec<&str> = object
            .keys()
            .map(String::as_str)
            .filter(|k| !KNOWN_KEYS.contains(k))
            .collect();
        if !unknown.is_empty() {
            return Err(ConfigError::UnknownFields {
                path: path.to_string(),
                fields: unknown.join(", "),
            });
        }

        if let Some(v) = object.get("enabled").and_then(serde_json::Value::as_bool) {
            self.enabled = v;
        }
        if let Some(v) = object.get("toolNames").and_then(serde_json::Value::as_array) {
            let mut names = Vec::new();
            for item in v {
                if let Some(s) = item.as_str() {
                    if let Ok(name) = s.parse::<ToolName>() {
                        names.push(name);
                    }
                }
            }
            if !names.is_empty() {
                self.intercepted_tool_names = names;
            }
        }
        if let Some(v) = object.get("runtimeBinary").and_then(serde_json::Value::as_str) {
            self.runtime_binary = v.to_string();
        }
        if let Some(v) = object.get("bypassPrefixes").and_then(serde_json::Value::as_array) {
            self.bypass_prefixes = v.iter().filter_map(|i| i.as_str().map(str::to_string)).collect();
        }
        if let Some(v) = object.get("stateFile").and_then(serde_json::Value::as_str) {
            self.state_file_path = Some(v.to_string());
        }
        if let Some(routing) = object.get("routing").and_then(serde_json::Value::as_object) {
            if let Some(s) = routing.get("scope").and_then(serde_json::Value::as_str) {
                self.scope = match s {
                    "session" => RoutingScope::Session,
                    _ => RoutingScope::Root,
                };
            }
            if let Some(b) = routing.get("fallbackToHost").and_then(serde_json::Value::as_bool) {
                self.fallback_to_host = b;
            }
        }
        if let Some(container) = object.get("container").and_then(serde_json::Value::as_object) {
            merge_container(&mut self.container, container);
        }

        Ok(self)
    }
}

fn merge_container(target: &mut ContainerConfig, object: &serde_json::Map<String, serde_json::Value>) {
    if let Some(v) = object.get("name").and_then(serde_json::Value::as_str) {
        target.name = Some(v.to_string());
    }
    if let Some(v) = object.get("namePrefix").and_then(serde_json::Value::as_str) {
        target.name_prefix = v.to_string();
    }
    if let Some(v) = object.get("image").and_then(serde_json::Value::as_str) {
        target.image = v.to_string();
    }
    if let Some(v) = object.get("workdir").and_then(serde_json::Value::as_str) {
        target.workdir = v.to_string();
    }
    if let Some(v) = object.get("projectPath").and_then(serde_json::Value::as_str) {
        target.project_path_override = Some(v.to_string());
    }
    if let Some(v) = object.get("network").and_then(serde_json::Value::as_str) {
        target.network = Some(v.to_string());
    }
    if let Some(v) = object.get("env").and_then(serde_json::Value::as_object) {
        target.env = v
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
            .collect();
    }
    if let Some(v) = object.get("mounts").and_then(serde_json::Value::as_array) {
        target.mounts = v.iter().filter_map(|i| i.as_str().map(str::to_string)).collect();
    }
    if let Some(v) = object.get("command").and_then(serde_json::Value::as_array) {
        target.command = v.iter().filter_map(|i| i.as_str().map(str::to_string)).collect();
    }
    if let Some(v) = object.get("autoCreate").and_then(serde_json::Value::as_bool) {
        target.auto_create = v;
    }
    if let Some(v) = object.get("autoStart").and_then(serde_json::Value::as_bool) {
        target.auto_start = v;
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
