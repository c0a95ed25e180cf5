// SPDX-License-Identifier: MIT

//! Operator tools (spec §4.9, §6): five agent-callable commands —
//! `create`, `use`, `clear`, `info`, `list` — thin wrappers over the
//! scope resolver, routing state store, and lifecycle manager that the
//! pre/post hook pair already use.
//!
//! Grounded on the teacher's `cli/src/commands/agent/mod.rs` style: a
//! command validates its own input, then delegates straight to the
//! shared primitives (there `DaemonClient`, here `StateStore` /
//! `LifecycleManager`) and renders a short human-readable result string.

use std::collections::BTreeMap;

use oc_sandbox_core::container::ManagedContainer;
use oc_sandbox_core::naming::build_name;
use oc_sandbox_core::Config;
use thiserror::Error;

use crate::driver::{DriverError, RuntimeDriver};
use crate::lifecycle::{ContainerState, LifecycleError, LifecycleManager};
use crate::scope::{ScopeResolver, SessionDirectory};
use crate::state_store::{StateStore, StateStoreError};

#[derive(Debug, Error)]
pub enum OperatorError {
    #[error("no container name was given and no session is available to derive one from")]
    NoNameAndNoSession,
    #[error("container {name} does not exist")]
    NoSuchContainer { name: String },
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error(transparent)]
    State(#[from] StateStoreError),
}

/// Optional overrides for `sandbox_container_create` (spec §4.9); fields
/// left `None`/empty fall back to `Config.container`'s defaults.
#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub workdir: Option<String>,
    pub project_path: Option<String>,
    pub network: Option<String>,
    pub mounts: Vec<String>,
    pub command: Vec<String>,
    pub env: BTreeMap<String, String>,
}

/// `sandbox_container_clear` options (spec §4.9).
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearRequest {
    pub stop: bool,
    pub remove: bool,
}

fn state_label(state: ContainerState) -> &'static str {
    match state {
        ContainerState::Running => "running",
        ContainerState::Stopped => "stopped",
        ContainerState::Absent => "missing",
    }
}

/// The five operator-facing commands, each returning a human-readable
/// result string (spec §6).
pub struct OperatorTools<D: SessionDirectory, Dr: RuntimeDriver> {
    config: Config,
    project_id: String,
    project_root: String,
    state: StateStore,
    scope: ScopeResolver<D>,
    driver: Dr,
}

impl<D: SessionDirectory, Dr: RuntimeDriver> OperatorTools<D, Dr> {
    pub fn new(
        config: Config,
        project_id: impl Into<String>,
        project_root: impl Into<String>,
        state: StateStore,
        directory: D,
        driver: Dr,
    ) -> Self {
        let scope_policy = config.scope;
        Self {
            config,
            project_id: project_id.into(),
            project_root: project_root.into(),
            state,
            scope: ScopeResolver::new(directory, scope_policy),
            driver,
        }
    }

    fn now_ms() -> i64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }

    fn manager(&self) -> LifecycleManager<'_, Dr> {
        LifecycleManager::new(&self.driver, self.config.runtime_binary.clone())
    }

    /// `sandbox_container_create` (spec §4.9): resolve or derive a name,
    /// ensure it is running (creation always allowed here, regardless of
    /// `container.autoCreate`, since the operator explicitly asked for
    /// one), and persist the binding for this session's scope.
    pub async fn create(&self, session_id: &str, request: CreateRequest) -> Result<String, OperatorError> {
        let name = match request.name.clone() {
            Some(name) => name,
            None => {
                if session_id.is_empty() {
                    return Err(OperatorError::NoNameAndNoSession);
                }
                let scope_id = self.scope.resolve(session_id).await;
                build_name(&self.config.container.name_prefix, &self.project_id, scope_id.as_str())
            }
        };

        let project_mount = request
            .project_path
            .clone()
            .or_else(|| self.config.container.project_path_override.clone())
            .unwrap_or_else(|| self.project_root.clone());
        let project_path_exists = std::path::Path::new(&project_mount).is_dir();

        let spec = ManagedContainer {
            name: name.clone(),
            image: request.image.unwrap_or_else(|| self.config.container.image.clone()),
            project_mount,
            workdir: request.workdir.unwrap_or_else(|| self.config.container.workdir.clone()),
            env: if request.env.is_empty() {
                self.config.container.env.clone()
            } else {
                request.env
            },
            network: request.network.or_else(|| self.config.container.network.clone()),
            labels: BTreeMap::new(),
            mounts: if request.mounts.is_empty() {
                self.config.container.mounts.clone()
            } else {
                request.mounts
            },
            command: if request.command.is_empty() {
                self.config.container.command.clone()
            } else {
                request.command
            },
        };

        let scope_id = self.scope.resolve(session_id).await;
        self.manager()
            .ensure_running(&spec, &self.project_id, scope_id.as_str(), true, true, project_path_exists)
            .await?;

        self.state.set(scope_id.as_str(), &name, Self::now_ms()).await?;
        Ok(format!("Created and bound container \"{name}\" for this session."))
    }

    /// `sandbox_container_use` (spec §4.9): bind this session's scope to
    /// an existing container by name.
    pub async fn use_container(&self, session_id: &str, name: &str) -> Result<String, OperatorError> {
        let state = self.manager().inspect(name).await?;
        if state == ContainerState::Absent {
            return Err(OperatorError::NoSuchContainer { name: name.to_string() });
        }
        let scope_id = self.scope.resolve(session_id).await;
        self.state.set(scope_id.as_str(), name, Self::now_ms()).await?;
        Ok(format!("Bound this session to container \"{name}\" ({}).", state_label(state)))
    }

    /// `sandbox_container_clear` (spec §4.9): unbind this session's
    /// scope, optionally stopping or removing the container it was bound
    /// to.
    pub async fn clear(&self, session_id: &str, request: ClearRequest) -> Result<String, OperatorError> {
        let scope_id = self.scope.resolve(session_id).await;
        let previous = self.state.clear(scope_id.as_str()).await?;
        let Some(name) = previous else {
            return Ok("No container was bound to this session.".to_string());
        };

        if request.remove {
            self.driver.run(&["rm".to_string(), "-f".to_string(), name.clone()]).await?;
            Ok(format!("Cleared and removed container \"{name}\"."))
        } else if request.stop {
            self.driver.run(&["stop".to_string(), name.clone()]).await?;
            Ok(format!("Cleared and stopped container \"{name}\"."))
        } else {
            Ok(format!("Cleared the binding to container \"{name}\"."))
        }
    }

    /// `sandbox_container_info` (spec §4.9): the bound container's name
    /// and current runtime state.
    pub async fn info(&self, session_id: &str) -> Result<String, OperatorError> {
        let scope_id = self.scope.resolve(session_id).await;
        let Some(name) = self.state.get(scope_id.as_str()).await else {
            return Ok("No container is bound to this session.".to_string());
        };
        let state = self.manager().inspect(&name).await?;
        Ok(format!("Container \"{name}\" is {}.", state_label(state)))
    }

    /// `sandbox_container_list` (spec §4.9): `ps [-a] --format
    /// '{{.Names}}\t{{.Status}}' --filter label=owner.project=<projectId>`,
    /// restricted to containers this router created.
    pub async fn list(&self, all: bool) -> Result<String, OperatorError> {
        let mut args = vec!["ps".to_string()];
        if all {
            args.push("-a".to_string());
        }
        args.push("--format".to_string());
        args.push("{{.Names}}\t{{.Status}}".to_string());
        args.push("--filter".to_string());
        args.push(format!("label=owner.project={}", self.project_id));

        let output = self.driver.run(&args).await?;
        let trimmed = output.stdout.trim();
        if trimmed.is_empty() {
            return Ok("No containers found for this project.".to_string());
        }
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
#[path = "operator_tests.rs"]
mod tests;
