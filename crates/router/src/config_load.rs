// SPDX-License-Identifier: MIT

//! Layered configuration loading (spec §6): built-in defaults, then
//! `OCSANDBOX_*` environment variables, then the project's
//! `.sandbox/router.jsonc` file — matching spec.md's stated precedence
//! ("environment variables shadow defaults but are shadowed by the
//! file").
//!
//! One `pub fn` per environment variable, grounded directly on the
//! teacher's `daemon/src/env.rs` (`OJ_STATE_DIR`, `OJ_IPC_TIMEOUT_MS`,
//! ...): centralised, individually documented accessors rather than one
//! opaque "read everything" function.

use std::path::{Path, PathBuf};

use oc_sandbox_core::error::ConfigError;
use oc_sandbox_core::Config;

/// `OCSANDBOX_ENABLED` — master switch override.
pub fn enabled_override() -> Option<bool> {
    std::env::var("OCSANDBOX_ENABLED").ok().and_then(|v| parse_bool(&v))
}

/// `OCSANDBOX_RUNTIME_BINARY` — path to the OCI runtime CLI.
pub fn runtime_binary_override() -> Option<String> {
    std::env::var("OCSANDBOX_RUNTIME_BINARY").ok().filter(|s| !s.is_empty())
}

/// `OCSANDBOX_STATE_FILE` — override the routing state file path.
pub fn state_file_override() -> Option<String> {
    std::env::var("OCSANDBOX_STATE_FILE").ok().filter(|s| !s.is_empty())
}

/// `OCSANDBOX_BYPASS_PREFIXES` — `;`-separated list (prefixes may contain
/// spaces, e.g. `"docker "`, so a comma would be ambiguous).
pub fn bypass_prefixes_override() -> Option<Vec<String>> {
    std::env::var("OCSANDBOX_BYPASS_PREFIXES").ok().map(|v| v.split(';').map(str::to_string).collect())
}

/// `OCSANDBOX_SCOPE` — `root` or `session`.
pub fn scope_override() -> Option<oc_sandbox_core::RoutingScope> {
    std::env::var("OCSANDBOX_SCOPE").ok().and_then(|v| match v.as_str() {
        "session" => Some(oc_sandbox_core::RoutingScope::Session),
        "root" => Some(oc_sandbox_core::RoutingScope::Root),
        _ => None,
    })
}

/// `OCSANDBOX_FALLBACK_TO_HOST` — on container-unavailable, run on host.
pub fn fallback_to_host_override() -> Option<bool> {
    std::env::var("OCSANDBOX_FALLBACK_TO_HOST").ok().and_then(|v| parse_bool(&v))
}

/// `OCSANDBOX_CONTAINER_NAME` — pin every scope to one shared container.
pub fn container_name_override() -> Option<String> {
    std::env::var("OCSANDBOX_CONTAINER_NAME").ok().filter(|s| !s.is_empty())
}

/// `OCSANDBOX_CONTAINER_IMAGE` — image to create the managed container from.
pub fn container_image_override() -> Option<String> {
    std::env::var("OCSANDBOX_CONTAINER_IMAGE").ok().filter(|s| !s.is_empty())
}

/// `OCSANDBOX_CONFIG_FILE` — override the default
/// `<projectRoot>/.sandbox/router.jsonc` path.
pub fn config_file_override(project_root: &Path) -> PathBuf {
    std::env::var("OCSANDBOX_CONFIG_FILE")
        .ok()
        .map(PathBuf::from)
        .unwrap_or_else(|| project_root.join(".sandbox").join("router.jsonc"))
}

/// Default state file location: `<local-data-dir>/oc-sandbox/state.json`,
/// mirroring the teacher's `OJ_STATE_DIR` > `XDG_STATE_HOME` > `~/.local/
/// state/oj` fallback chain, simplified to `dirs::data_local_dir()` since
/// this router has no daemon-wide state directory convention of its own
/// to match.
pub fn default_state_file_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("oc-sandbox")
        .join("state.json")
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Apply every `OCSANDBOX_*` environment override onto `config`.
fn apply_env(mut config: Config) -> Config {
    if let Some(v) = enabled_override() {
        config.enabled = v;
    }
    if let Some(v) = runtime_binary_override() {
        config.runtime_binary = v;
    }
    if let Some(v) = state_file_override() {
        config.state_file_path = Some(v);
    }
    if let Some(v) = bypass_prefixes_override() {
        config.bypass_prefixes = v;
    }
    if let Some(v) = scope_override() {
        config.scope = v;
    }
    if let Some(v) = fallback_to_host_override() {
        config.fallback_to_host = v;
    }
    if let Some(v) = container_name_override() {
        config.container.name = Some(v);
    }
    if let Some(v) = container_image_override() {
        config.container.image = v;
    }
    config
}

/// Read and parse `path` as JSON5. `Ok(None)` means the file does not
/// exist, which is not an error — most projects have no `.sandbox/`
/// directory at all.
fn read_config_file(path: &Path) -> Result<Option<serde_json::Value>, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            })
        }
    };
    json5::from_str(&contents)
        .map(Some)
        .map_err(|err| ConfigError::Parse {
            path: path.display().to_string(),
            message: err.to_string(),
        })
}

/// Build the effective [`Config`] for `project_root`: defaults, then env
/// overrides, then the project's `.sandbox/router.jsonc`. A missing or
/// invalid config file is a [`ConfigError`] per spec.md §7 — logged as a
/// warning, with the router proceeding on defaults + env alone.
pub fn load(project_root: &Path) -> Config {
    let config = apply_env(Config::default());
    let config_path = config_file_override(project_root);

    match read_config_file(&config_path) {
        Ok(Some(value)) => match config.clone().merge_file_value(&config_path.display().to_string(), value) {
            Ok(merged) => merged,
            Err(err) => {
                tracing::warn!(%err, path = %config_path.display(), "ignoring invalid sandbox router config file");
                config
            }
        },
        Ok(None) => config,
        Err(err) => {
            tracing::warn!(%err, path = %config_path.display(), "ignoring unreadable sandbox router config file");
            config
        }
    }
}

#[cfg(test)]
#[path = "config_load_tests.rs"]
mod tests;
