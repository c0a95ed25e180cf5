// SPDX-License-Identifier: MIT

//! `oc-sandbox`: a thin CLI wrapper over the five operator tools (spec
//! §4.9, §6). Grounded on the teacher's `oj` binary
//! (`crates/cli/src/commands/*.rs`): a clap-derived subcommand per
//! operation, each one validating its own arguments and delegating
//! straight to the shared primitives.
//!
//! Unlike the teacher's `oj`, there is no long-lived daemon to dial into
//! here — every invocation builds its own [`OperatorTools`] instance
//! against the project's `.sandbox/router.jsonc` and talks to the OCI
//! runtime binary directly, since that is the router's whole job.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use oc_sandbox_router::driver::SubprocessDriver;
use oc_sandbox_router::scope::StaticSessionDirectory;
use oc_sandbox_router::state_store::StateStore;
use oc_sandbox_router::{config_load, OperatorTools};

use commands::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    oc_sandbox_router::logging::init();

    let cli = Cli::parse();
    let project_root = match resolve_project_root(cli.project_root.clone()) {
        Ok(path) => path,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let config = config_load::load(&project_root);
    let state_path = config
        .state_file_path
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(config_load::default_state_file_path);

    let project_root_str = project_root.to_string_lossy().to_string();
    let driver = SubprocessDriver::new(config.runtime_binary.clone());
    let tools = OperatorTools::new(
        config,
        project_root_str.clone(),
        project_root_str,
        StateStore::new(state_path),
        StaticSessionDirectory::new(),
        driver,
    );

    match commands::dispatch(&tools, &cli.session, cli.command).await {
        Ok(message) => {
            println!("{message}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_project_root(explicit: Option<PathBuf>) -> std::io::Result<PathBuf> {
    match explicit {
        Some(path) => std::fs::canonicalize(&path),
        None => std::env::current_dir(),
    }
}
