use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use super::PointLearnError;

pub const LOG_ENV: &str = "POINTLEARN_LOG";

/// Installs the global subscriber. `POINTLEARN_LOG` wins over `verbose`.
pub fn init_logging(verbose: bool) -> Result<(), PointLearnError> {
    let default_level = if verbose { "pointlearn=debug" } else { "pointlearn=info" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| PointLearnError::Custom(format!("Failed to initialise logging: {}", e)))
}
