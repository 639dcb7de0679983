//! Errors raised while loading a [`PolicyConfig`](super::PolicyConfig).

use std::path::PathBuf;
use thiserror::Error;

/// Policy configuration could not be loaded.
///
/// A missing config file is not an error; the loader skips it.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A policy config file exists but could not be read.
    #[error("cannot read policy config {path}: {source}")]
    ReadFile {
        /// File which failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A policy config file is not valid TOML for [`PolicyConfig`](super::PolicyConfig).
    #[error("malformed policy config {path}: {source}")]
    ParseToml {
        /// File which failed.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A `LABELGATE_*` variable holds an unusable value.
    #[error("{name}: {message}")]
    InvalidEnvVar {
        /// Variable name.
        name: String,
        /// What was expected.
        message: String,
    },

    /// The merged configuration is unusable.
    #[error("policy config field {field} {message}")]
    InvalidValue {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

impl ConfigError {
    pub(crate) fn read_file(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse_toml(path: &std::path::Path, source: toml::de::Error) -> Self {
        Self::ParseToml {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn invalid_env_var(name: &str, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_value(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}
