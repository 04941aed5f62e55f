//! Metrics substrate configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CommonError, CommonResult};

/// Minimum level a sensor must have to record
///
/// Sensors at or below the configured level record; more verbose sensors
/// are created but discard their values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingLevel {
    #[default]
    Info,
    Debug,
    Trace,
}

impl RecordingLevel {
    /// Whether a sensor at `sensor_level` records under this configured level
    pub fn should_record(self, sensor_level: Self) -> bool {
        sensor_level <= self
    }
}

/// Configuration for the metric store and its exposition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Highest sensor level that records
    pub recording_level: RecordingLevel,
    /// Prefix for exported metric family names
    pub namespace: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { recording_level: RecordingLevel::Info, namespace: "connect".to_string() }
    }
}

impl MetricsConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(input: &str) -> CommonResult<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> CommonResult<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|e| {
            CommonError::persistence_op(format!("read {}", path.display()), e.to_string())
        })?;
        Self::from_toml_str(&data)
    }

    /// The namespace must be empty or a valid exposition name prefix
    pub fn validate(&self) -> CommonResult<()> {
        let mut chars = self.namespace.chars();
        let valid = match chars.next() {
            None => true,
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
        };

        if valid {
            Ok(())
        } else {
            Err(CommonError::validation_with_value(
                "namespace",
                "must match [a-zA-Z_][a-zA-Z0-9_]*",
                self.namespace.clone(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MetricsConfig::default();
        assert_eq!(config.recording_level, RecordingLevel::Info);
        assert_eq!(config.namespace, "connect");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_recording_level_ordering() {
        assert!(RecordingLevel::Info.should_record(RecordingLevel::Info));
        assert!(!RecordingLevel::Info.should_record(RecordingLevel::Debug));
        assert!(RecordingLevel::Trace.should_record(RecordingLevel::Debug));
    }

    /// Validates partial TOML documents fall back to defaults.
    #[test]
    fn test_from_toml_partial() {
        let config = MetricsConfig::from_toml_str("recording_level = \"debug\"")
            .expect("partial config should parse");
        assert_eq!(config.recording_level, RecordingLevel::Debug);
        assert_eq!(config.namespace, "connect");
    }

    #[test]
    fn test_rejects_invalid_namespace() {
        let err = MetricsConfig::from_toml_str("namespace = \"9-lives\"")
            .expect_err("namespace starting with a digit must be rejected");
        assert!(matches!(err, CommonError::Validation { ref field, .. } if field == "namespace"));
    }

    #[test]
    fn test_rejects_unknown_level() {
        let err = MetricsConfig::from_toml_str("recording_level = \"verbose\"")
            .expect_err("unknown level must fail");
        assert!(matches!(err, CommonError::Serialization { .. }));
    }
}
