use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use super::Config;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: json5::Error,
    },

    #[error("config file '{0}' does not contain an object at the top level")]
    NotAnObject(PathBuf),

    #[error("include cycle detected at '{0}'")]
    IncludeCycle(PathBuf),

    #[error("empty section: {0}")]
    SectionNotFound(String),

    #[error("failed to decode section '{key}': {source}")]
    Decode {
        key: String,
        source: serde_json::Error,
    },
}

/// Error returned by [`Config::load`] when the file exists but could not be
/// loaded.
///
/// The configuration is still usable: it carries an empty tree and the
/// resolved origin path, so callers that treat the file as optional can keep
/// going with [`into_config`](Self::into_config).
#[derive(Debug)]
pub struct LoadError {
    config: Config,
    source: ConfigError,
}

impl LoadError {
    pub(crate) fn new(config: Config, source: ConfigError) -> Self {
        Self { config, source }
    }

    /// The (empty) configuration produced by the failed load.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consumes the error, returning the (empty) configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// The underlying cause.
    pub fn kind(&self) -> &ConfigError {
        &self.source
    }

    /// Splits the error into the usable configuration and its cause.
    pub fn into_parts(self) -> (Config, ConfigError) {
        (self.config, self.source)
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.source.fmt(f)
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.source)
    }
}
