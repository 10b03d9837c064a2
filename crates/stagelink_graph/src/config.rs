// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph-wide settings.

use crate::visitor::EscalationPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings shared by every operation on a [`Graph`](crate::Graph)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Deliver events to listeners. When off, no event is built at all.
    pub emit_events: bool,
    /// Escalation policy used by the graph's search helpers
    pub escalation: EscalationPolicy,
    /// Log every visited node at trace level
    pub trace_traversal: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            emit_events: true,
            escalation: EscalationPolicy::default(),
            trace_traversal: false,
        }
    }
}

impl GraphConfig {
    /// Parse settings from RON text. Missing fields take their defaults.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Write settings as pretty RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }
}

/// Config load/save errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// RON text could not be parsed
    #[error("Failed to parse graph config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be written
    #[error("Failed to write graph config: {0}")]
    Serialize(#[from] ron::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GraphConfig::default();
        assert!(config.emit_events);
        assert_eq!(config.escalation, EscalationPolicy::WhenSaturated);
        assert!(!config.trace_traversal);
    }

    #[test]
    fn test_serialization() {
        let config = GraphConfig {
            emit_events: false,
            escalation: EscalationPolicy::Always,
            trace_traversal: true,
        };
        let text = config.to_ron().unwrap();
        assert_eq!(GraphConfig::from_ron(&text).unwrap(), config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = GraphConfig::from_ron("(trace_traversal: true)").unwrap();
        assert!(config.trace_traversal);
        assert!(config.emit_events);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            GraphConfig::from_ron("(emit_events: maybe)"),
            Err(ConfigError::Parse(_))
        ));
    }
}
