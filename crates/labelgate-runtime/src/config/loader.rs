//! Configuration loader with layered merging.
//!
//! # Load Order
//!
//! 1. Default values (compile-time)
//! 2. Config files, in the order added
//! 3. Environment variables (`LABELGATE_*`)
//!
//! Each layer overrides the previous.

use super::{
    ConfigError, PolicyConfig, PolicyConfigLayer, ENV_CREATION_UI_NEVER_POSITION,
    ENV_MAX_TYPE_DEPTH, ENV_UNTRACKED_LABEL,
};
use labelgate_auth::UntrackedLabel;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration loader with builder pattern.
///
/// # Example
///
/// ```no_run
/// use labelgate_runtime::config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_file("/etc/labelgate/labelgate.toml")
///     .with_file("labelgate.toml")
///     .load()?;
/// # Ok::<(), labelgate_runtime::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Config files, lowest priority first.
    files: Vec<PathBuf>,

    /// Skip environment variable loading.
    skip_env: bool,
}

impl ConfigLoader {
    /// Creates a new loader with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a config file layer. Later files override earlier ones.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Skips environment variable loading.
    ///
    /// Useful for testing with deterministic config.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Loads and merges configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any config file exists but cannot be
    /// parsed, an environment variable is malformed, or the merged
    /// config is invalid. Missing config files are silently ignored.
    pub fn load(&self) -> Result<PolicyConfig, ConfigError> {
        let mut config = PolicyConfig::default();

        for path in &self.files {
            if let Some(layer) = load_file(path)? {
                debug!(path = %path.display(), "Loaded policy config");
                config.apply(&layer);
            }
        }

        if !self.skip_env {
            apply_env_vars(&mut config, |name| std::env::var(name).ok())?;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Loads a config file layer, returning None if it doesn't exist.
fn load_file(path: &Path) -> Result<Option<PolicyConfigLayer>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

    let layer =
        PolicyConfigLayer::from_toml(&content).map_err(|e| ConfigError::parse_toml(path, e))?;

    Ok(Some(layer))
}

/// Applies environment variable overrides read through `lookup`.
fn apply_env_vars(
    config: &mut PolicyConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(val) = lookup(ENV_UNTRACKED_LABEL) {
        config.untracked_label = parse_untracked(&val).ok_or_else(|| {
            ConfigError::invalid_env_var(ENV_UNTRACKED_LABEL, "expected 'neutral' or 'deny'")
        })?;
        debug!(value = %val, "untracked_label set from environment");
    }

    if let Some(val) = lookup(ENV_CREATION_UI_NEVER_POSITION) {
        config.creation_ui_never_position = val.trim().parse().map_err(|_| {
            ConfigError::invalid_env_var(ENV_CREATION_UI_NEVER_POSITION, "expected integer")
        })?;
    }

    if let Some(val) = lookup(ENV_MAX_TYPE_DEPTH) {
        config.max_type_depth = val.trim().parse().map_err(|_| {
            ConfigError::invalid_env_var(ENV_MAX_TYPE_DEPTH, "expected non-negative integer")
        })?;
    }

    Ok(())
}

/// Parses an untracked-label mode (case-insensitive).
fn parse_untracked(s: &str) -> Option<UntrackedLabel> {
    match s.trim().to_lowercase().as_str() {
        "neutral" => Some(UntrackedLabel::Neutral),
        "deny" => Some(UntrackedLabel::Deny),
        _ => None,
    }
}
