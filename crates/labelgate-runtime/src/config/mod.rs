//! Policy engine configuration with layered loading.
//!
//! # Architecture
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌──────────────────────────────────────────┐
//! │  1. Environment Variables (LABELGATE_*)  │  Runtime override
//! ├──────────────────────────────────────────┤
//! │  2. Config files, last added wins        │  Deployment settings
//! ├──────────────────────────────────────────┤
//! │  3. Default Values (compile-time)        │  Fallback
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `LABELGATE_UNTRACKED_LABEL` | `untracked_label` | `neutral` or `deny` |
//! | `LABELGATE_CREATION_UI_NEVER_POSITION` | `creation_ui_never_position` | i32 |
//! | `LABELGATE_MAX_TYPE_DEPTH` | `max_type_depth` | usize |
//!
//! # Example Configuration
//!
//! ```toml
//! # labelgate.toml
//! untracked_label = "neutral"
//! creation_ui_never_position = 2
//! max_type_depth = 256
//! ```

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::ConfigLoader;

use crate::UiPosition;
use labelgate_auth::{UntrackedLabel, DEFAULT_UNTRACKED_LABEL};
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`PolicyConfig::untracked_label`].
pub const ENV_UNTRACKED_LABEL: &str = "LABELGATE_UNTRACKED_LABEL";
/// Environment variable overriding [`PolicyConfig::creation_ui_never_position`].
pub const ENV_CREATION_UI_NEVER_POSITION: &str = "LABELGATE_CREATION_UI_NEVER_POSITION";
/// Environment variable overriding [`PolicyConfig::max_type_depth`].
pub const ENV_MAX_TYPE_DEPTH: &str = "LABELGATE_MAX_TYPE_DEPTH";

/// Default limit on parent-type hops when resolving a root type.
pub const DEFAULT_MAX_TYPE_DEPTH: usize = 256;

/// Policy engine configuration.
///
/// # Example
///
/// ```
/// use labelgate_auth::UntrackedLabel;
/// use labelgate_runtime::config::PolicyConfig;
///
/// let config = PolicyConfig::from_toml("untracked_label = \"deny\"").expect("valid TOML");
/// assert_eq!(config.untracked_label, UntrackedLabel::Deny);
/// assert_eq!(config.max_type_depth, 256);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PolicyConfig {
    /// Treatment of labels no permission rule mentions.
    pub untracked_label: UntrackedLabel,

    /// Types at or beyond this creation UI position are never offered
    /// in the top-level add UI.
    pub creation_ui_never_position: i32,

    /// Parent-type hops allowed before a type hierarchy is treated as a loop.
    pub max_type_depth: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            untracked_label: DEFAULT_UNTRACKED_LABEL,
            creation_ui_never_position: UiPosition::NEVER.get(),
            max_type_depth: DEFAULT_MAX_TYPE_DEPTH,
        }
    }
}

impl PolicyConfig {
    /// Creates a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes to TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserializes from TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Is a type at `position` ever offered for creation?
    #[must_use]
    pub fn is_offered_for_creation(&self, position: UiPosition) -> bool {
        position.get() < self.creation_ui_never_position
    }

    /// Applies every setting present in `layer`.
    pub fn apply(&mut self, layer: &PolicyConfigLayer) {
        if let Some(untracked_label) = layer.untracked_label {
            self.untracked_label = untracked_label;
        }
        if let Some(position) = layer.creation_ui_never_position {
            self.creation_ui_never_position = position;
        }
        if let Some(depth) = layer.max_type_depth {
            self.max_type_depth = depth;
        }
    }

    /// Checks settings which would make the engine misbehave.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_type_depth == 0 {
            return Err(ConfigError::invalid_value(
                "max_type_depth",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// One config file's settings. Absent keys leave lower layers alone.
///
/// # Example
///
/// ```
/// use labelgate_runtime::config::{PolicyConfig, PolicyConfigLayer};
///
/// let mut config = PolicyConfig::from_toml("max_type_depth = 32").expect("valid TOML");
/// let layer = PolicyConfigLayer::from_toml("max_type_depth = 256").expect("valid TOML");
/// config.apply(&layer);
/// assert_eq!(config.max_type_depth, 256);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PolicyConfigLayer {
    /// Overrides [`PolicyConfig::untracked_label`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub untracked_label: Option<UntrackedLabel>,
    /// Overrides [`PolicyConfig::creation_ui_never_position`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_ui_never_position: Option<i32>,
    /// Overrides [`PolicyConfig::max_type_depth`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_type_depth: Option<usize>,
}

impl PolicyConfigLayer {
    /// Deserializes from TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PolicyConfig::default();
        assert_eq!(config.untracked_label, UntrackedLabel::Neutral);
        assert_eq!(config.creation_ui_never_position, 2);
        assert_eq!(config.max_type_depth, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_roundtrip() {
        let config = PolicyConfig {
            untracked_label: UntrackedLabel::Deny,
            creation_ui_never_position: 1,
            max_type_depth: 8,
        };
        let toml = config.to_toml().expect("serialize");
        assert!(toml.contains("untracked_label = \"deny\""), "got: {toml}");
        assert_eq!(PolicyConfig::from_toml(&toml).expect("parse"), config);
    }

    #[test]
    fn apply_sets_present_keys_only() {
        let mut base = PolicyConfig {
            untracked_label: UntrackedLabel::Deny,
            max_type_depth: 16,
            ..PolicyConfig::default()
        };
        let layer = PolicyConfigLayer::from_toml("max_type_depth = 256").expect("parse");
        base.apply(&layer);
        assert_eq!(base.untracked_label, UntrackedLabel::Deny);
        assert_eq!(base.max_type_depth, 256);
    }

    #[test]
    fn empty_layer_changes_nothing() {
        let mut base = PolicyConfig {
            creation_ui_never_position: 5,
            ..PolicyConfig::default()
        };
        let before = base.clone();
        base.apply(&PolicyConfigLayer::default());
        assert_eq!(base, before);
    }

    #[test]
    fn offered_for_creation() {
        let config = PolicyConfig::default();
        assert!(config.is_offered_for_creation(UiPosition::COMMON));
        assert!(config.is_offered_for_creation(UiPosition::INFREQUENT));
        assert!(!config.is_offered_for_creation(UiPosition::NEVER));
    }

    #[test]
    fn zero_depth_invalid() {
        let config = PolicyConfig {
            max_type_depth: 0,
            ..PolicyConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "max_type_depth", .. })
        ));
    }

    #[test]
    fn unknown_untracked_mode_rejected() {
        assert!(PolicyConfig::from_toml("untracked_label = \"allow\"").is_err());
    }
}
