// SPDX-License-Identifier: MIT

//! Shell command builders.
//!
//! Every builder here returns a plain `String` meant to be handed to the
//! agent framework as `args.command` (or run container-side by the post
//! hook). Grounded on the teacher's argv-based `run_docker` subprocess
//! wrapper (`daemon/src/adapters/agent/docker/mod.rs`), generalized from
//! a fixed argv into a quoted shell string, since this router forwards an
//! arbitrary agent-issued shell command rather than a fixed argv.

use std::collections::BTreeMap;

/// Escape `s` for interpolation inside a double-quoted shell string:
/// escapes `\`, `"`, `$`, and `` ` ``. A shell parse of the escaped
/// output, inside double quotes, reconstitutes `s` verbatim — including
/// any literal newlines, which POSIX double quotes already pass through
/// unchanged and must not be rewritten to the two-character `\n`.
pub fn escape_double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' | '"' | '$' | '`' => {
                out.push('\\');
                out.push(ch);
            }
            other => out.push(other),
        }
    }
    out
}

/// Build the `exec -i --workdir W -e K=V... CONTAINER sh -lc "CMD"`
/// wrapper. If `binary`, `container`, or `command` is empty, returns a
/// failure command instead: a one-line shell command that prints a
/// diagnostic and exits nonzero, so the caller can still hand this back
/// to the agent and have the error surface through its normal output
/// channel.
pub fn build_exec(
    binary: &str,
    container: &str,
    command: &str,
    workdir: Option<&str>,
    env: &BTreeMap<String, String>,
) -> String {
    if binary.is_empty() || container.is_empty() || command.is_empty() {
        return failure_command("sandbox router: missing binary, container, or command");
    }

    let mut parts = vec![binary.to_string(), "exec".to_string(), "-i".to_string()];
    if let Some(w) = workdir {
        if !w.is_empty() {
            parts.push("--workdir".to_string());
            parts.push(format!("\"{}\"", escape_double_quoted(w)));
        }
    }
    for (k, v) in env {
        parts.push("-e".to_string());
        parts.push(format!("\"{}={}\"", escape_double_quoted(k), escape_double_quoted(v)));
    }
    parts.push(format!("\"{}\"", escape_double_quoted(container)));
    parts.push("sh".to_string());
    parts.push("-lc".to_string());
    parts.push(format!("\"{}\"", escape_double_quoted(command)));
    parts.join(" ")
}

/// A diagnostic command: prints `message` to stdout and exits nonzero.
pub fn failure_command(message: &str) -> String {
    format!("echo \"{}\" && exit 1", escape_double_quoted(message))
}

/// `cat -- "PATH"`.
pub fn build_read(path: &str) -> String {
    format!("cat -- \"{}\"", escape_double_quoted(path))
}

/// Default line limit for [`build_list`].
pub const DEFAULT_LIST_LIMIT: u32 = 200;

/// `ls -A -p -1 -- "PATH" 2>/dev/null | head -n LIMIT`.
pub fn build_list(path: &str, limit: u32) -> String {
    let limit = if limit == 0 { DEFAULT_LIST_LIMIT } else { limit };
    format!(
        "ls -A -p -1 -- \"{}\" 2>/dev/null | head -n {}",
        escape_double_quoted(path),
        limit
    )
}

/// `rg -nH --field-match-separator="|" --regexp "PATTERN" [--glob "INCLUDE"] 2>/dev/null`.
///
/// The separator is quoted: unquoted, the shell that parses this string
/// (via `sh -lc`) would read the bare `|` as a pipe operator rather than
/// as `rg`'s argument, splitting the command into `rg ... --field-match-
/// separator=` piped into a nonexistent `--regexp` command.
pub fn build_grep(pattern: &str, include: Option<&str>) -> String {
    let mut cmd = format!(
        "rg -nH --field-match-separator=\"|\" --regexp \"{}\"",
        escape_double_quoted(pattern)
    );
    if let Some(include) = include {
        if !include.is_empty() {
            cmd.push_str(&format!(" --glob \"{}\"", escape_double_quoted(include)));
        }
    }
    cmd.push_str(" 2>/dev/null");
    cmd
}

/// Default result limit for [`build_glob`].
pub const DEFAULT_GLOB_LIMIT: u32 = 100;

/// `rg --files [-g "PATTERN"] 2>/dev/null | head -n LIMIT`.
pub fn build_glob(pattern: &str, limit: u32) -> String {
    let limit = if limit == 0 { DEFAULT_GLOB_LIMIT } else { limit };
    let mut cmd = "rg --files".to_string();
    if !pattern.is_empty() {
        cmd.push_str(&format!(" -g \"{}\"", escape_double_quoted(pattern)));
    }
    cmd.push_str(&format!(" 2>/dev/null | head -n {}", limit));
    cmd
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
