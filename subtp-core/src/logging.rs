//! `tracing` subscriber setup for hosts that do not install their own.

use tracing_subscriber::EnvFilter;

use crate::TailerConfig;

/// Installs a compact fmt subscriber filtered by `RUST_LOG`, falling back
/// to `config.log_filter`.
///
/// Returns false if a global subscriber was already installed.
pub fn init(config: &TailerConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}
