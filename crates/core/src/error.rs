// SPDX-License-Identifier: MIT

//! Error types owned by the pure core crate. I/O-facing error types
//! (runtime driver, state store, lifecycle, hooks) live in
//! `oc-sandbox-router` since this crate never performs I/O.

use thiserror::Error;

/// Configuration error: an unreadable or malformed config source.
///
/// Per the router's error taxonomy, configuration errors are surfaced as
/// a warning and the caller proceeds with defaults — this type exists so
/// that warning has a precise message, not to abort startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config file {path} is not valid JSON5: {message}")]
    Parse { path: String, message: String },
    #[error("config file {path} has unrecognised field(s): {fields}")]
    UnknownFields { path: String, fields: String },
}
