//! Console tracing. `RUST_LOG` wins over `--debug` when both are given.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

pub fn init_tracing(debug: bool) -> Result<()> {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
