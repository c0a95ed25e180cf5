// SPDX-License-Identifier: MIT

//! oc-sandbox-router: the stateful half of the container routing sandbox
//! plugin — runtime subprocess invocation, session scope resolution,
//! durable routing state, container lifecycle, the pre/post hook pair,
//! the operator tools, and config/logging setup.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config_load;
pub mod driver;
pub mod hooks;
pub mod lifecycle;
pub mod logging;
pub mod operator;
pub mod scope;
pub mod state_store;

pub use driver::{DriverError, DriverOutput, FakeDriver, RuntimeDriver, SubprocessDriver};
pub use hooks::Router;
pub use lifecycle::{ContainerState, EnsureOutcome, LifecycleError, LifecycleManager};
pub use operator::{OperatorError, OperatorTools};
pub use scope::{ScopeResolutionError, ScopeResolver, SessionDirectory, StaticSessionDirectory};
pub use state_store::{StateStore, StateStoreError};
