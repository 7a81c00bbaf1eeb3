use crate::error::AppError;
use crate::types::LogFormat;

use std::io::stderr;

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over `level`. Events go to
/// stderr so they stay out of the way of `--info` and `--list-palettes`.
pub fn setup_logging(level: &str, format: LogFormat) -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| AppError::Logging(format!("invalid log level '{}': {}", level, e)))?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(stderr)
        .with_target(false);

    match format {
        LogFormat::Json => subscriber.json().with_current_span(false).try_init(),
        LogFormat::Text => subscriber.compact().try_init(),
    }
    .map_err(|e| AppError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_level() {
        std::env::remove_var("RUST_LOG");
        let err = setup_logging("pixel_artist=notalevel", LogFormat::Text).unwrap_err();
        assert!(matches!(err, AppError::Logging(_)));
    }
}
