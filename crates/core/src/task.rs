//! Task identity

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one task of a connector
///
/// Renders as `{connector}-{task}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectorTaskId {
    pub connector: String,
    pub task: u32,
}

impl ConnectorTaskId {
    pub fn new(connector: impl Into<String>, task: u32) -> Self {
        Self { connector: connector.into(), task }
    }

    pub fn connector(&self) -> &str {
        &self.connector
    }

    pub fn task(&self) -> u32 {
        self.task
    }
}

impl fmt::Display for ConnectorTaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.connector, self.task)
    }
}
