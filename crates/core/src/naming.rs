// SPDX-License-Identifier: MIT

//! Deterministic, shell-safe container name generation.
//!
//! Grounded on the `oj-<agent_id>` / `oj-<agent_id>-ws` naming convention
//! the teacher uses for Docker containers and volumes
//! (`daemon/src/adapters/agent/docker/mod.rs`), generalized into a
//! configurable prefix plus a project/session fingerprint.

/// Fallback prefix used when sanitizing a name collapses it to nothing.
pub const DEFAULT_PREFIX: &str = "opencode";

/// Lowercase `s`, collapse every run of characters outside
/// `[a-z0-9_.-]` into a single `-`, strip leading/trailing `-`. Falls back
/// to [`DEFAULT_PREFIX`] if the result would otherwise be empty.
///
/// Idempotent: `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize(s: &str) -> String {
    let lowered = s.to_ascii_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut last_was_dash = false;
    for ch in lowered.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || ch == '-' {
            out.push(ch);
            last_was_dash = ch == '-';
        } else if !last_was_dash {
            out.push('-');
            last_was_dash = true;
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        DEFAULT_PREFIX.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `prefix-<projectIdShort8>-<sessionIdShort8>`: sanitized prefix, then up
/// to 8 leading characters of the sanitized project id (with any `-`
/// stripped), then up to 8 leading characters of the first non-empty
/// `-`-separated segment of the sanitized session id.
pub fn build_name(prefix: &str, project_id: &str, session_id: &str) -> String {
    let prefix = sanitize(prefix);
    let project_fragment = first_n_chars(&sanitize(project_id).replace('-', ""), 8);
    let session_sanitized = sanitize(session_id);
    let session_segment = session_sanitized
        .split('-')
        .find(|segment| !segment.is_empty())
        .unwrap_or("");
    let session_fragment = first_n_chars(session_segment, 8);

    let mut parts = vec![prefix];
    if !project_fragment.is_empty() {
        parts.push(project_fragment);
    }
    if !session_fragment.is_empty() {
        parts.push(session_fragment);
    }
    parts.join("-")
}

fn first_n_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

#[cfg(test)]
#[path = "naming_tests.rs"]
mod tests;
