// SPDX-License-Identifier: MIT

//! Hook ABI types: the `input`/`output` bags `preExecute`/`postExecute`
//! operate on (spec §6), plus the enumerated tool families from the
//! per-tool dispatch table (spec §4.7).
//!
//! `ToolArgs`/`ToolOutput` wrap a `serde_json::Map` with typed accessors
//! so hook code never touches raw JSON directly, in the spirit of the
//! teacher's `protocol/types.rs` JSON-value request/response bags.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

/// The set of tools the router knows how to intercept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ToolName {
    Shell,
    Read,
    Write,
    Edit,
    Grep,
    Glob,
    List,
}

impl ToolName {
    pub const ALL: [ToolName; 7] = [
        ToolName::Shell,
        ToolName::Read,
        ToolName::Write,
        ToolName::Edit,
        ToolName::Grep,
        ToolName::Glob,
        ToolName::List,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::Shell => "shell",
            ToolName::Read => "read",
            ToolName::Write => "write",
            ToolName::Edit => "edit",
            ToolName::Grep => "grep",
            ToolName::Glob => "glob",
            ToolName::List => "list",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownToolName(pub String);

impl fmt::Display for UnknownToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised tool name: {}", self.0)
    }
}

impl std::error::Error for UnknownToolName {}

impl FromStr for ToolName {
    type Err = UnknownToolName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shell" => Ok(ToolName::Shell),
            "read" => Ok(ToolName::Read),
            "write" => Ok(ToolName::Write),
            "edit" => Ok(ToolName::Edit),
            "grep" => Ok(ToolName::Grep),
            "glob" => Ok(ToolName::Glob),
            "list" => Ok(ToolName::List),
            other => Err(UnknownToolName(other.to_string())),
        }
    }
}

/// The `input` half of the hook ABI: `{tool, sessionId, callId}`.
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub tool: ToolName,
    pub session_id: String,
    pub call_id: String,
}

/// The mutable `args` bag the pre-hook inspects and may rewrite.
#[derive(Debug, Clone, Default)]
pub struct ToolArgs(Map<String, Value>);

impl ToolArgs {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn command(&self) -> Option<&str> {
        self.get_str("command")
    }

    pub fn set_command(&mut self, command: impl Into<String>) {
        self.0.insert("command".to_string(), Value::String(command.into()));
    }

    pub fn cwd(&self) -> Option<&str> {
        self.get_str("cwd")
    }

    pub fn env(&self) -> BTreeMap<String, String> {
        self.0
            .get("env")
            .and_then(Value::as_object)
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `filePath`, falling back to `path`, used by read/write/edit.
    pub fn file_path(&self) -> Option<&str> {
        self.get_str("filePath").or_else(|| self.get_str("path"))
    }

    /// `path`, falling back to `dir`/`directory`, used by list.
    pub fn dir_path(&self) -> Option<&str> {
        self.get_str("path")
            .or_else(|| self.get_str("dir"))
            .or_else(|| self.get_str("directory"))
    }

    pub fn pattern(&self) -> Option<&str> {
        self.get_str("pattern")
    }

    pub fn include(&self) -> Option<&str> {
        self.get_str("include").or_else(|| self.get_str("glob"))
    }

    pub fn path(&self) -> Option<&str> {
        self.get_str("path")
    }
}

/// The mutable `output` bag the post-hook overwrites.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub output: String,
    pub title: Option<String>,
    pub metadata: Map<String, Value>,
}

impl ToolOutput {
    pub fn set_output(&mut self, output: impl Into<String>) {
        self.output = output.into();
    }
}
