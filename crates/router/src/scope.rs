// SPDX-License-Identifier: MIT

//! Session scope resolver (spec §4.4).
//!
//! The agent framework that owns session identity is explicitly out of
//! scope, so parent-chain lookups are expressed against a trait the host
//! framework implements — the same "external system as a trait seam"
//! shape as the teacher's `AgentAdapter`
//! (`daemon/src/adapters/agent/mod.rs`).

use std::collections::HashMap;
use std::sync::Mutex;

use oc_sandbox_core::config::RoutingScope;
use oc_sandbox_core::ScopeId;
use thiserror::Error;

/// Maximum parent-chain walk depth before giving up and using the
/// last-visited node as the root (spec §4.4).
pub const MAX_WALK_DEPTH: usize = 10;

/// Default cap on the number of memoised session→root entries.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

#[derive(Debug, Error)]
pub enum ScopeResolutionError {
    #[error("agent framework failed to resolve parent of session {session_id}: {message}")]
    Lookup { session_id: String, message: String },
}

/// The agent framework's session parent-chain lookup, as a trait so this
/// crate can be tested without a live framework attached.
#[async_trait::async_trait]
pub trait SessionDirectory: Send + Sync {
    /// Parent session id, if any. `Ok(None)` means `session_id` has no
    /// parent (it is its own root).
    async fn parent_of(&self, session_id: &str) -> Result<Option<String>, ScopeResolutionError>;
}

/// A `HashMap`-backed fake directory for tests, mirroring the teacher's
/// in-memory test doubles for its adapter traits.
#[derive(Debug, Default)]
pub struct StaticSessionDirectory {
    parents: HashMap<String, String>,
}

impl StaticSessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(mut self, session_id: impl Into<String>, parent_id: impl Into<String>) -> Self {
        self.parents.insert(session_id.into(), parent_id.into());
        self
    }
}

#[async_trait::async_trait]
impl SessionDirectory for StaticSessionDirectory {
    async fn parent_of(&self, session_id: &str) -> Result<Option<String>, ScopeResolutionError> {
        Ok(self.parents.get(session_id).cloned())
    }
}

/// Resolves a live session id to its routing [`ScopeId`], per
/// `Config.scope`: the live session id itself (`RoutingScope::Session`),
/// or the root of its parent chain (`RoutingScope::Root`), memoising
/// every node visited along the way so repeated calls for any id in the
/// chain hit the cache.
pub struct ScopeResolver<D: SessionDirectory> {
    directory: D,
    scope: RoutingScope,
    cache: Mutex<HashMap<String, ScopeId>>,
    cache_capacity: usize,
}

impl<D: SessionDirectory> ScopeResolver<D> {
    pub fn new(directory: D, scope: RoutingScope) -> Self {
        Self::with_capacity(directory, scope, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(directory: D, scope: RoutingScope, cache_capacity: usize) -> Self {
        Self {
            directory,
            scope,
            cache: Mutex::new(HashMap::new()),
            cache_capacity,
        }
    }

    /// Resolve `session_id` to its routing scope. Scope-resolution errors
    /// from the directory are treated as "this session is its own root"
    /// (spec §7) rather than propagated.
    pub async fn resolve(&self, session_id: &str) -> ScopeId {
        if self.scope == RoutingScope::Session {
            return ScopeId::new(session_id);
        }

        if let Some(cached) = self.cache_lookup(session_id) {
            return cached;
        }

        let mut visited = vec![session_id.to_string()];
        let mut current = session_id.to_string();
        let root = loop {
            if visited.len() > MAX_WALK_DEPTH {
                break current;
            }
            if let Some(cached) = self.cache_lookup(&current) {
                break cached.as_str().to_string();
            }
            match self.directory.parent_of(&current).await {
                Ok(Some(parent)) if parent != current => {
                    current = parent;
                    visited.push(current.clone());
                }
                Ok(_) => break current,
                Err(_) => break current,
            }
        };

        let scope_id = ScopeId::new(root);
        self.cache_store(visited, scope_id.clone());
        scope_id
    }

    fn cache_lookup(&self, session_id: &str) -> Option<ScopeId> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).get(session_id).cloned()
    }

    fn cache_store(&self, visited: Vec<String>, scope_id: ScopeId) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if cache.len() + visited.len() > self.cache_capacity {
            cache.clear();
        }
        for id in visited {
            cache.insert(id, scope_id.clone());
        }
    }
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;
