//! Logging setup utilities for the Gambit binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates of this workspace whose logs are enabled at the default level.
const WORKSPACE_CRATES: [&str; 3] = ["gambit_shared", "gambit_server", "gambit_client"];

/// Build the default filter directive for the given binary and level.
///
/// Binary names use dashes while tracing targets use underscores,
/// so `gambit-server` becomes `gambit_server`.
pub fn default_directive(binary_name: &str, default_log_level: &str) -> String {
    let binary_target = binary_name.replace('-', "_");
    let mut targets: Vec<String> = WORKSPACE_CRATES
        .iter()
        .map(|name| format!("{}={}", name, default_log_level))
        .collect();
    if !WORKSPACE_CRATES.contains(&binary_target.as_str()) {
        targets.push(format!("{}={}", binary_target, default_log_level));
    }
    targets.join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "gambit-server", "gambit-client")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use gambit_shared::logger::setup_logger;
///
/// setup_logger("gambit-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
