// SPDX-License-Identifier: MIT

//! `PendingCall`: per-call context staged by the pre-hook for the
//! post-hook to consume. Keyed by `callId`, consumed exactly once.

use std::collections::BTreeMap;

/// Tool-family-specific context staged between `preExecute` and
/// `postExecute` for a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingCall {
    Read {
        container_name: String,
        container_path: String,
        host_path: String,
    },
    Write {
        container_name: String,
        host_path: String,
        container_path: String,
    },
    Edit {
        container_name: String,
        host_path: String,
        container_path: String,
    },
    Grep {
        container_name: String,
        host_root: String,
        container_root: String,
        pattern: String,
        include: Option<String>,
    },
    Glob {
        container_name: String,
        host_root: String,
        container_root: String,
        pattern: String,
    },
    List {
        container_name: String,
        container_path: String,
        host_path: String,
    },
}

impl PendingCall {
    pub fn container_name(&self) -> &str {
        match self {
            PendingCall::Read { container_name, .. }
            | PendingCall::Write { container_name, .. }
            | PendingCall::Edit { container_name, .. }
            | PendingCall::Grep { container_name, .. }
            | PendingCall::Glob { container_name, .. }
            | PendingCall::List { container_name, .. } => container_name,
        }
    }
}

/// In-memory map of call id → staged context. Owned by the hook pair;
/// the router is expected to bound it with a cap or TTL sweep since a
/// cancelled call's entry otherwise lives until process exit (spec §5).
pub type PendingCalls = BTreeMap<String, PendingCall>;
