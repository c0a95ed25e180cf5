// SPDX-License-Identifier: MIT

//! Container lifecycle management (spec §4.6): `ensure_running` drives a
//! managed container through inspect → create-if-absent →
//! start-if-stopped, using the configured OCI runtime binary as a
//! subprocess via [`RuntimeDriver`].
//!
//! Grounded on the teacher's `daemon/src/adapters/agent/docker/mod.rs`
//! (`docker_spawn`/`reconnect`), which drives the same three-step dance
//! for its own agent containers; generalized here to take an arbitrary
//! [`ManagedContainer`] spec instead of a hardcoded agent image, and to
//! tag containers with the `owner.project`/`owner.scope` labels this
//! router needs to recognise its own containers on a later `docker ps`.

use oc_sandbox_core::container::ManagedContainer;
use thiserror::Error;

use crate::driver::{DriverError, RuntimeDriver};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("runtime driver error: {0}")]
    Driver(#[from] DriverError),
    #[error("container {name} does not exist and auto-create is disabled")]
    MissingAndCreationDisabled { name: String },
    #[error("host project path {path} does not exist, refusing to create container {name}")]
    ProjectPathMissing { name: String, path: String },
    #[error("runtime reported an error creating container {name}: {stderr}")]
    CreateFailed { name: String, stderr: String },
    #[error("runtime reported an error starting container {name}: {stderr}")]
    StartFailed { name: String, stderr: String },
}

/// What `ensure_running` found the container's state to be before acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Running,
    Stopped,
    Absent,
}

/// Outcome of an `ensure_running` call: what state the container was
/// found in, and what (if anything) was done about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    AlreadyRunning,
    Started,
    Created,
}

pub struct LifecycleManager<'a, D: RuntimeDriver> {
    driver: &'a D,
    runtime_binary: String,
}

impl<'a, D: RuntimeDriver> LifecycleManager<'a, D> {
    pub fn new(driver: &'a D, runtime_binary: impl Into<String>) -> Self {
        Self {
            driver,
            runtime_binary: runtime_binary.into(),
        }
    }

    /// Inspect `spec.name`'s current state via `docker inspect`.
    pub async fn inspect(&self, name: &str) -> Result<ContainerState, LifecycleError> {
        let output = self
            .driver
            .run(&[
                "inspect".to_string(),
                "--format".to_string(),
                "{{.State.Running}}".to_string(),
                name.to_string(),
            ])
            .await?;

        if !output.success() {
            return Ok(ContainerState::Absent);
        }
        if output.stdout.trim() == "true" {
            Ok(ContainerState::Running)
        } else {
            Ok(ContainerState::Stopped)
        }
    }

    /// Drive `spec` to a running state, creating and/or starting it as
    /// needed. `allow_create` mirrors `Config.container.auto_create`;
    /// when it is `false` and the container is absent, this fails rather
    /// than creating one (spec §4.6, §7). `project_path_exists` is the
    /// caller's own check of `spec.project_mount` on the host — the
    /// lifecycle manager never touches the filesystem itself, so callers
    /// (and their tests) control this independently of the real disk.
    pub async fn ensure_running(
        &self,
        spec: &ManagedContainer,
        project_id: &str,
        scope_id: &str,
        allow_create: bool,
        allow_start: bool,
        project_path_exists: bool,
    ) -> Result<EnsureOutcome, LifecycleError> {
        match self.inspect(&spec.name).await? {
            ContainerState::Running => Ok(EnsureOutcome::AlreadyRunning),
            ContainerState::Stopped => {
                if !allow_start {
                    return Ok(EnsureOutcome::AlreadyRunning);
                }
                self.start(&spec.name).await?;
                Ok(EnsureOutcome::Started)
            }
            ContainerState::Absent => {
                if !allow_create {
                    return Err(LifecycleError::MissingAndCreationDisabled {
                        name: spec.name.clone(),
                    });
                }
                if !project_path_exists {
                    return Err(LifecycleError::ProjectPathMissing {
                        name: spec.name.clone(),
                        path: spec.project_mount.clone(),
                    });
                }
                self.create(spec, project_id, scope_id).await?;
                Ok(EnsureOutcome::Created)
            }
        }
    }

    /// `run -d --name NAME --workdir W [--network N] [--label K=V]...
    /// [-e K=V]... [-v HOST:W] [-v ...]... IMAGE CMD...` — a single
    /// create-and-start invocation per spec §4.6, rather than separate
    /// `create`/`start` calls.
    async fn create(&self, spec: &ManagedContainer, project_id: &str, scope_id: &str) -> Result<(), LifecycleError> {
        let mut args = vec!["run".to_string(), "-d".to_string(), "--name".to_string(), spec.name.clone()];

        for (key, value) in ManagedContainer::labels_for(project_id, scope_id) {
            args.push("--label".to_string());
            args.push(format!("{key}={value}"));
        }

        args.push("--workdir".to_string());
        args.push(spec.workdir.clone());

        if let Some(network) = &spec.network {
            args.push("--network".to_string());
            args.push(network.clone());
        }

        for (key, value) in &spec.env {
            args.push("-e".to_string());
            args.push(format!("{key}={value}"));
        }

        args.push("-v".to_string());
        args.push(format!("{}:{}", spec.project_mount, spec.workdir));
        for mount in &spec.mounts {
            args.push("-v".to_string());
            args.push(mount.clone());
        }

        args.push(spec.image.clone());
        args.extend(spec.command.iter().cloned());

        let output = self.driver.run(&args).await?;
        if !output.success() {
            return Err(LifecycleError::CreateFailed {
                name: spec.name.clone(),
                stderr: output.stderr,
            });
        }
        Ok(())
    }

    async fn start(&self, name: &str) -> Result<(), LifecycleError> {
        let output = self.driver.run(&["start".to_string(), name.to_string()]).await?;
        if !output.success() {
            return Err(LifecycleError::StartFailed {
                name: name.to_string(),
                stderr: output.stderr,
            });
        }
        Ok(())
    }

    pub fn runtime_binary(&self) -> &str {
        &self.runtime_binary
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
