use anyhow::{Context, Result};
use std::io;
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log level '{}'", level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(Layer::new().with_writer(io::stderr).with_target(false))
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}
