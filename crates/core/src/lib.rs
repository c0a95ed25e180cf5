// SPDX-License-Identifier: MIT

//! oc-sandbox-core: pure data model and pure functions for the container
//! routing sandbox plugin.
//!
//! Nothing in this crate touches the filesystem, spawns a process, or
//! depends on wall-clock time beyond what callers pass in. Components
//! with I/O (the runtime driver, the state store, the hooks) live in
//! `oc-sandbox-router`.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod command;
pub mod config;
pub mod container;
pub mod error;
pub mod naming;
pub mod pathmap;
pub mod pending;
pub mod routing;
pub mod scope;
pub mod tool;

pub use config::{Config, ContainerConfig, RoutingScope};
pub use container::{ManagedContainer, LABEL_PROJECT, LABEL_SCOPE};
pub use error::ConfigError;
pub use pending::PendingCall;
pub use routing::{RoutingEntry, RoutingState, ROUTING_STATE_VERSION};
pub use scope::ScopeId;
pub use tool::{ToolArgs, ToolCall, ToolName, ToolOutput};
