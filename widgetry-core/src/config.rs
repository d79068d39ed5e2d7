//! Manager Configuration
//!
//! Settings that shape how a [`WidgetManager`](crate::manager::WidgetManager)
//! reads the tree. Configuration can be built in code or loaded from JSON;
//! missing fields fall back to their defaults.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Attribute that carries a node's widget type id unless configured otherwise.
pub const DEFAULT_TYPE_ATTRIBUTE: &str = "widget";

/// Configuration for a widget manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Name of the node attribute holding the widget type id.
    pub type_attribute: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            type_attribute: DEFAULT_TYPE_ATTRIBUTE.to_string(),
        }
    }
}

impl ManagerConfig {
    /// Parse and validate configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Use a different attribute for widget type ids.
    pub fn with_type_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.type_attribute = attribute.into();
        self
    }

    /// Check that the configuration can be used to read a tree.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.type_attribute.is_empty() {
            return Err(ConfigError::Invalid {
                field: "type_attribute",
                reason: "must not be empty".into(),
            });
        }
        if self.type_attribute.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                field: "type_attribute",
                reason: format!("`{}` contains whitespace", self.type_attribute),
            });
        }
        Ok(())
    }
}
