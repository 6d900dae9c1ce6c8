//! Runtime configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then environment variables
//! prefixed with `SHIELDED_POOL_` (nested keys are separated by `__`, e.g.
//! `SHIELDED_POOL_LOG__FORMAT=json`).

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use zk_primitives::Element;

use crate::constants::empty_leaf_for_seed;

/// The prefix of environment variables read by [`Config::load`]
pub const ENV_PREFIX: &str = "SHIELDED_POOL_";

/// Configuration for a shielded pool process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The seed of the empty note, fixed for the lifetime of a ledger
    pub empty_note_seed: u64,

    /// Where to persist the ledger, or `None` to keep it in memory
    pub db_path: Option<PathBuf>,

    /// Logging
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            empty_note_seed: 5_769_240,
            db_path: None,
            log: LogConfig::default(),
        }
    }
}

/// How to log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// An `EnvFilter` directive, e.g. `info,shielded_pool=debug`
    pub filter: String,
    /// The output format
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// The output format of logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human readable
    Pretty,
    /// One JSON object per line
    Json,
}

impl Config {
    /// Layer the defaults, `file` (if given) and the environment
    pub fn load(file: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(file).extract()
    }

    /// The [`Figment`] behind [`Config::load`], for callers that want to merge more providers
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// The leaf value of an empty slot under this configuration
    #[must_use]
    pub fn empty_leaf(&self) -> Element {
        empty_leaf_for_seed(Element::new(self.empty_note_seed))
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use crate::EMPTY_NOTE_SEED;

    use super::*;

    #[test]
    fn defaults_use_the_standard_empty_note() {
        let config = Config::default();

        assert_eq!(Element::new(config.empty_note_seed), EMPTY_NOTE_SEED);
        assert_eq!(config.empty_leaf(), crate::empty_leaf());
    }

    #[test]
    fn layers_apply_in_order() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "pool.toml",
                r#"
                    empty_note_seed = 7
                    db_path = "/var/lib/pool"

                    [log]
                    filter = "debug"
                "#,
            )?;
            jail.set_env("SHIELDED_POOL_LOG__FORMAT", "json");
            jail.set_env("SHIELDED_POOL_EMPTY_NOTE_SEED", "8");

            let config = Config::load(Some(Path::new("pool.toml")))?;

            assert_eq!(config.empty_note_seed, 8);
            assert_eq!(config.db_path, Some(PathBuf::from("/var/lib/pool")));
            assert_eq!(config.log.filter, "debug");
            assert_eq!(config.log.format, LogFormat::Json);

            Ok(())
        });
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        Jail::expect_with(|_| {
            let config = Config::load(Some(Path::new("missing.toml")))?;

            assert_eq!(config, Config::default());

            Ok(())
        });
    }
}
