// Tracing log adapter - Structured logging using tracing crate

use tracing_subscriber::EnvFilter;

use crate::adapters::toml_config::{LogFormat, LoggingConfig};
use crate::error::{ArchiverError, ArchiverResult};

/// Build the filter: `RUST_LOG` when set, otherwise the configured level
pub fn env_filter(config: &LoggingConfig) -> ArchiverResult<EnvFilter> {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| ArchiverError::config(format!("invalid log level {:?}: {}", config.level, e)))
}

/// Install the process-wide subscriber. Logs go to stderr; stdout carries
/// command results only.
pub fn init_logging(config: &LoggingConfig) -> ArchiverResult<()> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| ArchiverError::config(format!("failed to initialise logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_config_error() {
        let config = LoggingConfig {
            level: "tsarchiver=loud".to_string(),
            format: LogFormat::Compact,
        };
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() {
            assert!(matches!(env_filter(&config), Err(ArchiverError::Config { .. })));
        }
    }

    #[test]
    fn test_default_level_parses() {
        assert!(env_filter(&LoggingConfig::default()).is_ok());
    }
}
