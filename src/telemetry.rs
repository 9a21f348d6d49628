//! Tracing subscriber setup for the `rate-engine` binary.

use tracing_subscriber::EnvFilter;

use crate::error::ServiceError;

/// Builds the log filter from `RUST_LOG`, falling back to `log_level`.
pub fn env_filter(log_level: &str) -> Result<EnvFilter, ServiceError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(log_level).map_err(|err| ServiceError::Telemetry {
            message: format!("invalid log filter '{}': {}", log_level, err),
        }),
    }
}

/// Installs the global fmt subscriber, writing to stderr.
pub fn init(log_level: &str) -> Result<(), ServiceError> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(log_level)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| ServiceError::Telemetry {
            message: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_level_builds_filter() {
        assert!(env_filter("info").is_ok());
        assert!(env_filter("rate_engine=debug,tower=warn").is_ok());
    }

    #[test]
    fn test_second_init_fails() {
        let _ = init("warn");
        assert!(matches!(init("warn"), Err(ServiceError::Telemetry { .. })));
    }
}
