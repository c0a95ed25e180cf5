// SPDX-License-Identifier: MIT

//! Subscriber install helper. Grounded on `querymt-worker`'s
//! `tracing_subscriber::fmt().with_env_filter(...)` setup
//! (`examples/querymt-querymt/crates/worker/src/main.rs`), the same
//! `tracing`/`tracing-subscriber` stack the teacher's daemon depends on
//! (`daemon/Cargo.toml`).

use tracing_subscriber::EnvFilter;

/// Default filter directive when `RUST_LOG` (or `OCSANDBOX_LOG`) is
/// unset: warnings and above, since the router's own `tracing::warn!`
/// calls are the primary signal an embedder cares about.
const DEFAULT_FILTER: &str = "warn";

/// Install a global `tracing` subscriber reading `RUST_LOG`, falling
/// back to `OCSANDBOX_LOG`, falling back to [`DEFAULT_FILTER`]. Intended
/// to be called once, near process startup, by the CLI binary or the
/// embedding agent framework. A second call is a no-op: `try_init`
/// swallows the "already set" error rather than panicking, since the
/// embedding framework may have already installed its own subscriber.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(std::env::var("OCSANDBOX_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string())))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}
