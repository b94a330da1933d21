//! Log subscriber setup
//!
//! Logs always go to stderr so stdout carries only calculator output.

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use tracing_subscriber::EnvFilter;

/// Builds the filter: `RUST_LOG` if set, else the configured directive
pub fn build_filter(config: &CliConfig) -> CliResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(config.log_directive())
            .map_err(|e| CliError::config(format!("invalid log filter: {e}"))),
    }
}

/// Installs the global subscriber
///
/// A subscriber installed earlier (by a test harness, say) is left alone.
pub fn init(config: &CliConfig) -> CliResult<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = if config.log_json {
        builder.json().try_init()
    } else {
        builder.with_ansi(config.color.should_color()).try_init()
    };
    if installed.is_err() {
        tracing::debug!("log subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Verbosity;

    #[test]
    fn test_filter_from_verbosity() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = CliConfig::new().with_verbosity(Verbosity::Debug);
        let filter = build_filter(&config).unwrap();
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn test_filter_from_directive() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let mut config = CliConfig::new();
        config.log_filter = Some("keycalc=trace".into());
        let filter = build_filter(&config).unwrap();
        assert_eq!(filter.to_string(), "keycalc=trace");
    }

    #[test]
    fn test_invalid_directive() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let mut config = CliConfig::new();
        config.log_filter = Some("keycalc=loudest".into());
        assert!(build_filter(&config).is_err());
    }

    #[test]
    fn test_init_twice_is_ok() {
        let config = CliConfig::new();
        assert!(init(&config).is_ok());
        assert!(init(&config).is_ok());
    }
}
