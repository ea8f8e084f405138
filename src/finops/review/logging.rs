use tracing_subscriber::EnvFilter;

use crate::finops::review::error::{Result, ToolError};

/// Installs the global tracing subscriber. `RUST_LOG` overrides the
/// `default_level` directive.
pub fn init(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|error| ToolError::Logging(error.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}
