// SPDX-License-Identifier: MIT

//! `ManagedContainer`: a container this system created and labelled.
//!
//! Directly grounded on the teacher's `core/src/container.rs`
//! (`ContainerConfig { image }`), extended with the labels/name/mount
//! fields the routing spec's entity table requires.

use std::collections::BTreeMap;

/// Label key recording which project a container was created for.
/// Lets the operator `list` tool filter to only this system's containers.
pub const LABEL_PROJECT: &str = "owner.project";

/// Label key recording which routing scope a container is bound to.
pub const LABEL_SCOPE: &str = "owner.scope";

/// A container labelled as belonging to this router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedContainer {
    pub name: String,
    pub image: String,
    /// Host path bind-mounted into the container at `workdir`.
    pub project_mount: String,
    pub workdir: String,
    pub env: BTreeMap<String, String>,
    pub network: Option<String>,
    pub labels: BTreeMap<String, String>,
    /// Extra `-v HOST:CONTAINER[:MODE]` mounts beyond the primary project mount.
    pub mounts: Vec<String>,
    /// Entry command for a freshly created container (default `sleep infinity`).
    pub command: Vec<String>,
}

impl ManagedContainer {
    pub fn labels_for(project_id: &str, scope_id: &str) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(LABEL_PROJECT.to_string(), project_id.to_string());
        labels.insert(LABEL_SCOPE.to_string(), scope_id.to_string());
        labels
    }
}
