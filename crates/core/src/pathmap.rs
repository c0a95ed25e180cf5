// SPDX-License-Identifier: MIT

//! Host↔container path mapping.
//!
//! Both directions are total, deterministic, and never touch the
//! filesystem: they operate purely on path strings, clamping anything
//! that would escape the mount back to the mount root rather than
//! returning an error.

use std::path::{Path, PathBuf};

/// Map a host path into the corresponding path inside the container.
///
/// If `host_root` or `input` is empty, or `input` does not resolve
/// strictly inside `host_root`, the mapping clamps to `container_root`
/// (or `/` if that is also empty) rather than leaking a path the mount
/// cannot reach.
pub fn host_to_container(input: &str, host_root: &str, container_root: &str) -> PathBuf {
    map(input, host_root, container_root)
}

/// The inverse of [`host_to_container`]: map a container path back to the
/// host path it was bind-mounted from.
pub fn container_to_host(input: &str, host_root: &str, container_root: &str) -> PathBuf {
    map(input, container_root, host_root)
}

fn map(input: &str, from_root: &str, to_root: &str) -> PathBuf {
    let clamp = || clamp_root(to_root);

    if from_root.is_empty() || input.is_empty() {
        return clamp();
    }

    match resolve_remainder(input, from_root) {
        Some(remainder) => {
            if to_root.is_empty() {
                PathBuf::from("/").join(remainder)
            } else {
                Path::new(to_root).join(remainder)
            }
        }
        None => clamp(),
    }
}

/// `input`'s path relative to `root` (possibly empty, meaning `input`
/// resolves to `root` itself), or `None` if `input` resolves outside
/// `root` entirely. Resolution is lexical only: relative inputs are
/// joined onto `root`, absolute inputs are normalised as-is.
fn resolve_remainder(input: &str, root: &str) -> Option<PathBuf> {
    if root.is_empty() || input.is_empty() {
        return None;
    }
    let root_path = Path::new(root);
    let resolved = if Path::new(input).is_absolute() {
        PathBuf::from(input)
    } else {
        root_path.join(input)
    };
    let resolved = normalize(&resolved);
    let root_norm = normalize(root_path);
    relative_remainder(&resolved, &root_norm)
}

/// `true` if `input` resolves to `root` itself or strictly inside it
/// (spec §4.7's "resolves strictly inside the project root" guard used by
/// every tool family's path precondition).
pub fn is_within_root(input: &str, root: &str) -> bool {
    resolve_remainder(input, root).is_some()
}

fn clamp_root(root: &str) -> PathBuf {
    if root.is_empty() {
        PathBuf::from("/")
    } else {
        PathBuf::from(root)
    }
}

/// `child`'s path relative to `root`, only if `child` is `root` itself or
/// strictly inside it. Lexical only — no filesystem access, no symlink
/// resolution.
fn relative_remainder(child: &Path, root: &Path) -> Option<PathBuf> {
    if child == root {
        return Some(PathBuf::new());
    }
    child.strip_prefix(root).ok().map(PathBuf::from)
}

/// Lexically normalize a path: resolve `.` and `..` components without
/// touching the filesystem. Leading `..` components (escaping past the
/// path's own root) are dropped rather than producing a malformed path.
fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !matches!(out.components().next_back(), None | Some(Component::RootDir)) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
#[path = "pathmap_tests.rs"]
mod tests;
