// SPDX-License-Identifier: MIT

//! Routing state store (spec §4.5): a durable `scopeId → containerName`
//! mapping persisted as a versioned JSON file, written atomically.
//!
//! The tmp-then-rename write is grounded on the teacher's
//! `daemon/src/storage/snapshot.rs::rotate_bak_path`, which already uses
//! `fs::rename` to swap backup files in crash-safely; generalized here
//! from backup rotation into the primary atomic write path for the
//! routing table itself.

use std::path::{Path, PathBuf};

use oc_sandbox_core::routing::{RoutingEntry, RoutingState};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum StateStoreError {
    #[error("failed to create parent directory for {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to rename {tmp_path} to {path}: {source}")]
    Rename {
        path: String,
        tmp_path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Single instance per process. All operations serialise through the
/// internal async mutex (spec §5's FIFO ordering guarantee).
pub struct StateStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bound container for `scope_id`, or `None` if unbound.
    pub async fn get(&self, scope_id: &str) -> Option<String> {
        let _lock = self.guard.lock().await;
        let state = Self::read(&self.path);
        state.sessions.get(scope_id).map(|entry| entry.container.clone())
    }

    /// Bind `scope_id` to `container_name`, updating `updatedAt` to `now`
    /// (unix milliseconds, supplied by the caller so this module never
    /// touches the clock itself).
    pub async fn set(&self, scope_id: &str, container_name: &str, now_ms: i64) -> Result<(), StateStoreError> {
        let _lock = self.guard.lock().await;
        let mut state = Self::read(&self.path);
        state.sessions.insert(
            scope_id.to_string(),
            RoutingEntry {
                container: container_name.to_string(),
                updated_at: now_ms,
            },
        );
        Self::write(&self.path, &state)
    }

    /// Remove the binding for `scope_id`, returning the container it was
    /// previously bound to (if any).
    pub async fn clear(&self, scope_id: &str) -> Result<Option<String>, StateStoreError> {
        let _lock = self.guard.lock().await;
        let mut state = Self::read(&self.path);
        let previous = state.sessions.remove(scope_id).map(|entry| entry.container);
        Self::write(&self.path, &state)?;
        Ok(previous)
    }

    /// Read the state file, tolerating a missing file, invalid JSON, or a
    /// schema version mismatch by returning an empty state without
    /// rewriting anything (spec §4.5, §7).
    fn read(path: &Path) -> RoutingState {
        let Ok(bytes) = std::fs::read(path) else {
            return RoutingState::empty();
        };
        match serde_json::from_slice::<RoutingState>(&bytes) {
            Ok(state) if state.is_current_version() => state,
            _ => RoutingState::empty(),
        }
    }

    fn write(path: &Path, state: &RoutingState) -> Result<(), StateStoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StateStoreError::CreateDir {
                    path: parent.display().to_string(),
                    source,
                })?;
            }
        }

        let tmp_path = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(state).unwrap_or_else(|_| b"{}".to_vec());
        std::fs::write(&tmp_path, bytes).map_err(|source| StateStoreError::Write {
            path: tmp_path.display().to_string(),
            source,
        })?;
        std::fs::rename(&tmp_path, path).map_err(|source| StateStoreError::Rename {
            path: path.display().to_string(),
            tmp_path: tmp_path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
#[path = "state_store_tests.rs"]
mod tests;
