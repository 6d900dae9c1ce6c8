//! Process-wide log output

use tracing_subscriber::{
    filter::ParseError,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

use crate::config::{LogConfig, LogFormat};

/// Why logging couldn't be set up
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The filter directive didn't parse
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),

    /// A global subscriber was already installed
    #[error("failed to install the log subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Install the global `tracing` subscriber
///
/// Call this once, early in `main`
pub fn init(config: &LogConfig) -> Result<(), Error> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(config)?);

    match config.format {
        LogFormat::Pretty => builder.finish().try_init()?,
        LogFormat::Json => builder.json().finish().try_init()?,
    }

    Ok(())
}

fn filter(config: &LogConfig) -> Result<EnvFilter, Error> {
    Ok(EnvFilter::try_new(&config.filter)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_filters_are_rejected() {
        let config = LogConfig {
            filter: "shielded_pool=notalevel".to_string(),
            format: LogFormat::Pretty,
        };

        assert!(matches!(filter(&config), Err(Error::Filter(_))));
    }

    #[test]
    fn only_one_subscriber_is_installed() {
        let config = LogConfig::default();

        // the first call may lose to another test, the second never wins
        let _ = init(&config);

        assert!(matches!(init(&config), Err(Error::Init(_))));
    }

    #[test]
    fn default_filter_parses() {
        assert!(filter(&LogConfig::default()).is_ok());
    }
}
