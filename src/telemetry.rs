//! Tracing setup for developer logs.
use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use crate::app::CRATE_NAME;

/// Initialize `tracing` on stderr, filtered by `RUST_LOG` (default: warnings
/// from this crate only).
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{CRATE_NAME}=warn")));
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
}
