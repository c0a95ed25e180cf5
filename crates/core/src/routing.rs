// SPDX-License-Identifier: MIT

//! `RoutingEntry` / `RoutingState`: the durable scope→container binding
//! table and its on-disk JSON form (spec §3, §6).
//!
//! The versioned-schema shape is grounded on the teacher's
//! `daemon/src/storage/snapshot.rs::Snapshot { version, .. }`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Current schema version for the routing state file. A file written
/// with a different version is treated as empty on read (spec §4.5).
pub const ROUTING_STATE_VERSION: u32 = 1;

/// Durable binding of a session scope to a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingEntry {
    pub container: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

/// On-disk form of the routing table:
/// `{ "version": 1, "sessions": { "<scopeId>": { "container": ..., "updatedAt": ... } } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingState {
    pub version: u32,
    pub sessions: BTreeMap<String, RoutingEntry>,
}

impl Default for RoutingState {
    fn default() -> Self {
        Self {
            version: ROUTING_STATE_VERSION,
            sessions: BTreeMap::new(),
        }
    }
}

impl RoutingState {
    /// An empty state tagged with the current schema version, returned
    /// whenever the on-disk file is missing, corrupt, or at a different
    /// version — never written back implicitly.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_current_version(&self) -> bool {
        self.version == ROUTING_STATE_VERSION
    }
}
