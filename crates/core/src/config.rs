//! Configuration of the error-handling metric group

use std::fs;
use std::path::Path;

use faultline_common::error::{CommonError, CommonResult};
use serde::{Deserialize, Serialize};

use crate::errors::names::{CONNECTOR_TAG, GROUP_NAME, TASK_TAG};

/// Group name and tag keys of the per-task error metrics
///
/// Every field has a default, so a partial TOML document is enough:
///
/// ```toml
/// group_name = "task-error-metrics"
/// connector_tag = "connector"
/// task_tag = "task"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorMetricsConfig {
    pub group_name: String,
    pub connector_tag: String,
    pub task_tag: String,
}

impl Default for ErrorMetricsConfig {
    fn default() -> Self {
        Self {
            group_name: GROUP_NAME.to_string(),
            connector_tag: CONNECTOR_TAG.to_string(),
            task_tag: TASK_TAG.to_string(),
        }
    }
}

impl ErrorMetricsConfig {
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

    pub fn validate(&self) -> CommonResult<()> {
        if self.group_name.trim().is_empty() {
            return Err(CommonError::config_field("group_name", "must not be empty"));
        }
        if self.connector_tag.trim().is_empty() {
            return Err(CommonError::config_field("connector_tag", "must not be empty"));
        }
        if self.task_tag.trim().is_empty() {
            return Err(CommonError::config_field("task_tag", "must not be empty"));
        }
        if self.connector_tag == self.task_tag {
            return Err(CommonError::validation_with_value(
                "task_tag",
                "must differ from connector_tag",
                self.task_tag.clone(),
            ));
        }
        Ok(())
    }
}
