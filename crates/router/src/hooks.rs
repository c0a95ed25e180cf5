// SPDX-License-Identifier: MIT

//! Pre/post execution hook pair (spec §4.7, §4.8): the dispatch brain
//! that rewrites tool calls into container-routed equivalents, and
//! consumes staged [`PendingCall`]s to overwrite their results.
//!
//! Grounded on the teacher's `Effect::Shell { container: Option<ContainerConfig>, .. }`
//! seam (`core/src/effect.rs`) and its currently unimplemented routing in
//! `daemon/src/engine/executor.rs`, where the container field is received
//! and discarded (`Effect::Shell { container: _container, .. } => ...`).
//! This module is exactly that missing routing, generalised from one
//! effect variant into the full hook pair and extended from shell-only to
//! the read/write/edit/grep/glob/list family.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use oc_sandbox_core::command::{build_exec, build_glob, build_grep, build_list, build_read, escape_double_quoted, failure_command};
use oc_sandbox_core::naming::build_name;
use oc_sandbox_core::pathmap::{container_to_host, host_to_container, is_within_root};
use oc_sandbox_core::pending::PendingCalls;
use oc_sandbox_core::{Config, ManagedContainer, PendingCall, ToolArgs, ToolCall, ToolName, ToolOutput};

use crate::driver::RuntimeDriver;
use crate::lifecycle::LifecycleManager;
use crate::scope::{ScopeResolver, SessionDirectory};
use crate::state_store::StateStore;

/// Why a container failed to become available for a call.
enum Unavailable {
    NoContainerName,
    Lifecycle(String),
}

/// What the pre-hook decided to do with a call, computed from `args`
/// alone before a container is resolved, so that calls which don't apply
/// (bypassed shell prefixes, out-of-root paths, empty patterns) never
/// trigger scope resolution or container creation (spec §8 scenario 2).
enum Plan {
    Shell {
        command: String,
        cwd_container: String,
        env: BTreeMap<String, String>,
    },
    Read {
        host_path: String,
        container_path: String,
    },
    Write {
        host_path: String,
        container_path: String,
    },
    Edit {
        host_path: String,
        container_path: String,
    },
    Grep {
        host_root: String,
        container_root: String,
        pattern: String,
        include: Option<String>,
    },
    Glob {
        host_root: String,
        container_root: String,
        pattern: String,
    },
    List {
        host_path: String,
        container_path: String,
    },
}

/// The hook ABI entry point: a process-lifetime object the embedding
/// agent framework constructs once and calls `pre_execute`/`post_execute`
/// on for every intercepted tool call.
pub struct Router<D: SessionDirectory, Dr: RuntimeDriver> {
    config: Config,
    project_id: String,
    project_root: String,
    state: StateStore,
    scope: ScopeResolver<D>,
    driver: Dr,
    pending: Mutex<PendingCalls>,
    path_checker: Box<dyn Fn(&str) -> bool + Send + Sync>,
}

impl<D: SessionDirectory, Dr: RuntimeDriver> Router<D, Dr> {
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
            pending: Mutex::new(PendingCalls::new()),
            path_checker: Box::new(|path: &str| std::path::Path::new(path).is_dir()),
        }
    }

    /// Override how `ensure()` checks whether a container's project mount
    /// exists on disk (spec §4.6). Production code relies on the default
    /// (a real `is_dir` check); tests substitute a stub so they are not
    /// coupled to the host filesystem.
    pub fn with_path_checker(mut self, checker: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.path_checker = Box::new(checker);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn now_ms() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }

    fn stage(&self, call_id: &str, pending: PendingCall) {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(call_id.to_string(), pending);
    }

    fn take(&self, call_id: &str) -> Option<PendingCall> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).remove(call_id)
    }

    /// The pre-execution hook (spec §4.7).
    pub async fn pre_execute(&self, call: &ToolCall, args: &mut ToolArgs) {
        if !self.config.enabled || !self.config.intercepts(call.tool) || call.session_id.is_empty() {
            return;
        }

        let Some(plan) = self.plan(call.tool, args) else {
            return;
        };

        let scope_id = self.scope.resolve(&call.session_id).await;
        let scope_id = scope_id.as_str().to_string();

        let (container_name, synthesised) = match self.resolve_container(&scope_id).await {
            Ok(resolved) => resolved,
            Err(Unavailable::NoContainerName) => {
                tracing::warn!(tool = %call.tool, scope_id, "no container available for this scope; falling back to host");
                return;
            }
            Err(Unavailable::Lifecycle(message)) => {
                tracing::warn!(tool = %call.tool, scope_id, %message, "container unavailable for this call");
                if self.config.fallback_to_host {
                    return;
                }
                if call.tool == ToolName::Shell {
                    args.set_command(failure_command(&message));
                }
                return;
            }
        };

        if synthesised {
            if let Err(err) = self.state.set(&scope_id, &container_name, Self::now_ms()).await {
                tracing::warn!(%err, "failed to persist routing binding");
            }
        }

        match plan {
            Plan::Shell { command, cwd_container, env } => {
                let rewritten = build_exec(
                    &self.config.runtime_binary,
                    &container_name,
                    &command,
                    Some(&cwd_container),
                    &env,
                );
                args.set_command(rewritten);
            }
            Plan::Read { host_path, container_path } => {
                self.stage(
                    &call.call_id,
                    PendingCall::Read {
                        container_name,
                        container_path,
                        host_path,
                    },
                );
            }
            Plan::Write { host_path, container_path } => {
                self.stage(
                    &call.call_id,
                    PendingCall::Write {
                        container_name,
                        host_path,
                        container_path,
                    },
                );
            }
            Plan::Edit { host_path, container_path } => {
                self.stage(
                    &call.call_id,
                    PendingCall::Edit {
                        container_name,
                        host_path,
                        container_path,
                    },
                );
            }
            Plan::Grep {
                host_root,
                container_root,
                pattern,
                include,
            } => {
                self.stage(
                    &call.call_id,
                    PendingCall::Grep {
                        container_name,
                        host_root,
                        container_root,
                        pattern,
                        include,
                    },
                );
            }
            Plan::Glob { host_root, container_root, pattern } => {
                self.stage(
                    &call.call_id,
                    PendingCall::Glob {
                        container_name,
                        host_root,
                        container_root,
                        pattern,
                    },
                );
            }
            Plan::List { host_path, container_path } => {
                self.stage(
                    &call.call_id,
                    PendingCall::List {
                        container_name,
                        container_path,
                        host_path,
                    },
                );
            }
        }
    }

    /// Tool-family dispatch table (spec §4.7), computed purely from
    /// `args` and this process's static config — no container or scope
    /// involved yet. `None` means "not our call": the hook must return
    /// without staging, rewriting, or resolving a container.
    fn plan(&self, tool: ToolName, args: &ToolArgs) -> Option<Plan> {
        let workdir = &self.config.container.workdir;
        let root = &self.project_root;

        match tool {
            ToolName::Shell => {
                let command = args.command()?;
                if command.is_empty() {
                    return None;
                }
                if self.config.bypass_prefixes.iter().any(|p| command.starts_with(p.as_str())) {
                    return None;
                }
                let cwd = args.cwd().unwrap_or(root.as_str());
                let cwd_container = host_to_container(cwd, root, workdir).to_string_lossy().to_string();
                Some(Plan::Shell {
                    command: command.to_string(),
                    cwd_container,
                    env: args.env(),
                })
            }
            ToolName::Read => {
                let path = args.file_path()?;
                if path.is_empty() || !is_within_root(path, root) {
                    return None;
                }
                Some(Plan::Read {
                    host_path: path.to_string(),
                    container_path: host_to_container(path, root, workdir).to_string_lossy().to_string(),
                })
            }
            ToolName::Write => {
                let path = args.file_path()?;
                if path.is_empty() || !is_within_root(path, root) {
                    return None;
                }
                Some(Plan::Write {
                    host_path: path.to_string(),
                    container_path: host_to_container(path, root, workdir).to_string_lossy().to_string(),
                })
            }
            ToolName::Edit => {
                let path = args.file_path()?;
                if path.is_empty() || !is_within_root(path, root) {
                    return None;
                }
                Some(Plan::Edit {
                    host_path: path.to_string(),
                    container_path: host_to_container(path, root, workdir).to_string_lossy().to_string(),
                })
            }
            ToolName::Grep => {
                let pattern = args.pattern()?;
                if pattern.is_empty() {
                    return None;
                }
                let path = args.path().unwrap_or(root.as_str());
                if !is_within_root(path, root) {
                    return None;
                }
                Some(Plan::Grep {
                    host_root: path.to_string(),
                    container_root: host_to_container(path, root, workdir).to_string_lossy().to_string(),
                    pattern: pattern.to_string(),
                    include: args.include().map(str::to_string),
                })
            }
            ToolName::Glob => {
                let pattern = args.pattern()?;
                if pattern.is_empty() {
                    return None;
                }
                let path = args.path().unwrap_or(root.as_str());
                if !is_within_root(path, root) {
                    return None;
                }
                Some(Plan::Glob {
                    host_root: path.to_string(),
                    container_root: host_to_container(path, root, workdir).to_string_lossy().to_string(),
                    pattern: pattern.to_string(),
                })
            }
            ToolName::List => {
                let path = args.dir_path().unwrap_or(root.as_str());
                if !is_within_root(path, root) {
                    return None;
                }
                Some(Plan::List {
                    host_path: path.to_string(),
                    container_path: host_to_container(path, root, workdir).to_string_lossy().to_string(),
                })
            }
        }
    }

    /// Resolve this scope's container name in the order spec.md §4.7
    /// prescribes: pinned shared name, then the persisted binding, then
    /// (if `autoCreate`) a freshly synthesised name. Ensures the chosen
    /// container is running before returning it.
    async fn resolve_container(&self, scope_id: &str) -> Result<(String, bool), Unavailable> {
        if let Some(name) = self.config.container.name.clone() {
            return self.ensure(scope_id, &name, false).await;
        }
        if let Some(name) = self.state.get(scope_id).await {
            return self.ensure(scope_id, &name, false).await;
        }
        if self.config.container.auto_create {
            let name = build_name(&self.config.container.name_prefix, &self.project_id, scope_id);
            return self.ensure(scope_id, &name, true).await;
        }
        Err(Unavailable::NoContainerName)
    }

    async fn ensure(&self, scope_id: &str, name: &str, synthesised: bool) -> Result<(String, bool), Unavailable> {
        let spec = self.container_spec(name);
        let project_path_exists = (self.path_checker)(&spec.project_mount);
        let manager = LifecycleManager::new(&self.driver, self.config.runtime_binary.clone());
        manager
            .ensure_running(
                &spec,
                &self.project_id,
                scope_id,
                self.config.container.auto_create,
                self.config.container.auto_start,
                project_path_exists,
            )
            .await
            .map(|_| (name.to_string(), synthesised))
            .map_err(|err| Unavailable::Lifecycle(err.to_string()))
    }

    fn container_spec(&self, name: &str) -> ManagedContainer {
        let project_mount = self
            .config
            .container
            .project_path_override
            .clone()
            .unwrap_or_else(|| self.project_root.clone());
        ManagedContainer {
            name: name.to_string(),
            image: self.config.container.image.clone(),
            project_mount,
            workdir: self.config.container.workdir.clone(),
            env: self.config.container.env.clone(),
            network: self.config.container.network.clone(),
            labels: BTreeMap::new(),
            mounts: self.config.container.mounts.clone(),
            command: self.config.container.command.clone(),
        }
    }

    /// The post-execution hook (spec §4.8).
    pub async fn post_execute(&self, tool: ToolName, call_id: &str, output: &mut ToolOutput) {
        let Some(pending) = self.take(call_id) else {
            return;
        };

        let _span = tracing::info_span!("post_execute", %tool, call_id, container = pending.container_name()).entered();

        match pending {
            PendingCall::Read { container_name, container_path, .. } => {
                self.run_and_overwrite(&container_name, build_read(&container_path), None, output).await;
            }
            PendingCall::List { container_name, container_path, .. } => {
                self.run_and_overwrite(&container_name, build_list(&container_path, 0), None, output)
                    .await;
            }
            PendingCall::Grep {
                container_name,
                host_root,
                container_root,
                pattern,
                include,
            } => {
                self.post_grep(&container_name, &host_root, &container_root, &pattern, include.as_deref(), output)
                    .await;
            }
            PendingCall::Glob {
                container_name,
                host_root,
                container_root,
                pattern,
            } => {
                self.post_glob(&container_name, &host_root, &container_root, &pattern, output).await;
            }
            PendingCall::Write { container_name, host_path, container_path }
            | PendingCall::Edit { container_name, host_path, container_path } => {
                self.post_copy(&container_name, &host_path, &container_path).await;
            }
        }
    }

    /// `docker exec -i [--workdir W] CONTAINER sh -lc CMD`, as a raw argv
    /// for the runtime driver — no shell-escaping needed here since
    /// `tokio::process::Command` never re-parses these through a shell,
    /// unlike the pre-hook's agent-facing `build_exec` string.
    fn exec_argv(&self, container: &str, command: &str, workdir: Option<&str>) -> Vec<String> {
        let mut argv = vec!["exec".to_string(), "-i".to_string()];
        if let Some(w) = workdir {
            argv.push("--workdir".to_string());
            argv.push(w.to_string());
        }
        argv.push(container.to_string());
        argv.push("sh".to_string());
        argv.push("-lc".to_string());
        argv.push(command.to_string());
        argv
    }

    async fn run_and_overwrite(&self, container_name: &str, command: String, workdir: Option<&str>, output: &mut ToolOutput) {
        match self.driver.run(&self.exec_argv(container_name, &command, workdir)).await {
            Ok(result) if result.success() => output.set_output(result.stdout),
            Ok(result) => {
                tracing::warn!(status = result.status, stderr = %result.stderr, "container command failed");
            }
            Err(err) => tracing::warn!(%err, "failed to invoke runtime driver"),
        }
    }

    async fn post_grep(
        &self,
        container_name: &str,
        host_root: &str,
        container_root: &str,
        pattern: &str,
        include: Option<&str>,
        output: &mut ToolOutput,
    ) {
        let command = build_grep(pattern, include);
        match self
            .driver
            .run(&self.exec_argv(container_name, &command, Some(container_root)))
            .await
        {
            // ripgrep's "no match" exit code (1) is a legitimate outcome, not a failure.
            Ok(result) if result.status == 0 || result.status == 1 => {
                output.set_output(remap_grep_lines(&result.stdout, host_root, container_root));
            }
            Ok(result) => {
                tracing::warn!(status = result.status, stderr = %result.stderr, "grep failed inside container");
            }
            Err(err) => tracing::warn!(%err, "failed to invoke runtime driver"),
        }
    }

    async fn post_glob(&self, container_name: &str, host_root: &str, container_root: &str, pattern: &str, output: &mut ToolOutput) {
        let command = build_glob(pattern, 0);
        match self
            .driver
            .run(&self.exec_argv(container_name, &command, Some(container_root)))
            .await
        {
            Ok(result) if result.success() => {
                let mapped: Vec<String> = result
                    .stdout
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .take(100)
                    .map(|path| remap_path(path, host_root, container_root))
                    .collect();
                output.set_output(mapped.join("\n"));
            }
            Ok(result) => {
                tracing::warn!(status = result.status, stderr = %result.stderr, "glob failed inside container");
            }
            Err(err) => tracing::warn!(%err, "failed to invoke runtime driver"),
        }
    }

    /// Push a host-written file into the container: `mkdir -p` the parent
    /// directory, then `cp HOST CONTAINER:PATH`. Explicit even though the
    /// bind mount usually makes the file visible already — the contract
    /// this router keeps for mounts that are read-only, stale, or absent.
    async fn post_copy(&self, container_name: &str, host_path: &str, container_path: &str) {
        let parent = Path::new(container_path)
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();

        if !parent.is_empty() {
            let mkdir_cmd = format!("mkdir -p -- \"{}\"", escape_double_quoted(&parent));
            match self.driver.run(&self.exec_argv(container_name, &mkdir_cmd, None)).await {
                Ok(result) if result.success() => {}
                Ok(result) => {
                    tracing::warn!(status = result.status, stderr = %result.stderr, "mkdir inside container failed");
                    return;
                }
                Err(err) => {
                    tracing::warn!(%err, "failed to invoke runtime driver");
                    return;
                }
            }
        }

        let dest = format!("{container_name}:{container_path}");
        match self.driver.run(&["cp".to_string(), host_path.to_string(), dest]).await {
            Ok(result) if result.success() => {}
            Ok(result) => tracing::warn!(status = result.status, stderr = %result.stderr, "container copy failed"),
            Err(err) => tracing::warn!(%err, "failed to invoke runtime driver"),
        }
    }
}

fn remap_grep_lines(stdout: &str, host_root: &str, container_root: &str) -> String {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| remap_grep_line(line, host_root, container_root))
        .collect::<Vec<_>>()
        .join("\n")
}

fn remap_grep_line(line: &str, host_root: &str, container_root: &str) -> String {
    let mut fields = line.splitn(3, '|');
    let file_path = fields.next().unwrap_or("");
    let rest: Vec<&str> = fields.collect();
    let mut out = remap_path(file_path, host_root, container_root);
    for field in rest {
        out.push('|');
        out.push_str(field);
    }
    out
}

fn remap_path(path: &str, host_root: &str, container_root: &str) -> String {
    if Path::new(path).is_absolute() {
        container_to_host(path, host_root, container_root).to_string_lossy().to_string()
    } else {
        PathBuf::from(host_root).join(path).to_string_lossy().to_string()
    }
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
