// SPDX-License-Identifier: MIT

//! Subcommand definitions and dispatch for `oc-sandbox`, one variant per
//! operator tool (spec §4.9).

use std::collections::BTreeMap;

use clap::{Parser, Subcommand};
use oc_sandbox_router::driver::SubprocessDriver;
use oc_sandbox_router::operator::{ClearRequest, CreateRequest, OperatorError};
use oc_sandbox_router::scope::StaticSessionDirectory;
use oc_sandbox_router::OperatorTools;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Operator(#[from] OperatorError),
    #[error("invalid --env value {0:?}, expected KEY=VALUE")]
    InvalidEnv(String),
}

#[derive(Parser)]
#[command(name = "oc-sandbox", about = "Operator commands for the container routing sandbox")]
pub struct Cli {
    /// Project root directory (defaults to the current working directory)
    #[arg(long, global = true)]
    pub project_root: Option<std::path::PathBuf>,

    /// Session id this invocation's routing scope is resolved from
    #[arg(long, global = true, default_value = "cli")]
    pub session: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a container (if needed) and bind this session to it
    Create {
        /// Explicit container name; derived from the session scope if omitted
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        workdir: Option<String>,
        /// Host path to mount (defaults to the project root)
        #[arg(long = "project-path")]
        project_path: Option<String>,
        #[arg(long)]
        network: Option<String>,
        /// Extra `-v HOST:CONTAINER` mount; may be repeated
        #[arg(long = "mount")]
        mounts: Vec<String>,
        /// Extra `KEY=VALUE` environment variable; may be repeated
        #[arg(long = "env")]
        env: Vec<String>,
        /// Entry command, e.g. `--cmd sleep --cmd infinity`
        #[arg(long = "cmd")]
        command: Vec<String>,
    },
    /// Bind this session to an already-running or stopped container
    Use {
        /// Name of the existing container
        name: String,
    },
    /// Unbind this session from its container
    Clear {
        /// Stop the container after unbinding
        #[arg(long)]
        stop: bool,
        /// Remove the container after unbinding (implies stop)
        #[arg(long)]
        remove: bool,
    },
    /// Show the container bound to this session, if any
    Info,
    /// List containers this router created for the current project
    List {
        /// Include stopped containers
        #[arg(long)]
        all: bool,
    },
}

fn parse_env(pairs: &[String]) -> Result<BTreeMap<String, String>, CliError> {
    let mut map = BTreeMap::new();
    for pair in pairs {
        let (key, value) = pair.split_once('=').ok_or_else(|| CliError::InvalidEnv(pair.clone()))?;
        map.insert(key.to_string(), value.to_string());
    }
    Ok(map)
}

pub async fn dispatch(
    tools: &OperatorTools<StaticSessionDirectory, SubprocessDriver>,
    session: &str,
    command: Command,
) -> Result<String, CliError> {
    match command {
        Command::Create {
            name,
            image,
            workdir,
            project_path,
            network,
            mounts,
            env,
            command,
        } => {
            let request = CreateRequest {
                name,
                image,
                workdir,
                project_path,
                network,
                mounts,
                command,
                env: parse_env(&env)?,
            };
            Ok(tools.create(session, request).await?)
        }
        Command::Use { name } => Ok(tools.use_container(session, &name).await?),
        Command::Clear { stop, remove } => Ok(tools.clear(session, ClearRequest { stop, remove }).await?),
        Command::Info => Ok(tools.info(session).await?),
        Command::List { all } => Ok(tools.list(all).await?),
    }
}
