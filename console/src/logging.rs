//! Diagnostics for the console, written to stderr and filtered by `RUST_LOG`.
//!
//! The menu, prompts and results go through `io::console` on stdout and are
//! never filtered. Tracing carries what the operator does not see:
//!
//! - `kops_console::io::process`: every spawned `kops`/`kubectl`/`aws`
//!   command with its exit code (`debug`).
//! - `kops_console::reconciler`: bucket reuse/creation, merge outcome and
//!   skipped remote fields (`info`/`warn`).
//! - `kops_console::session`: invalid selections and failed actions.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr subscriber. Only `warn` and above are shown unless
/// `RUST_LOG` says otherwise, e.g.
/// `RUST_LOG=kops_console::io::process=debug kops-console` to trace tool calls.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
