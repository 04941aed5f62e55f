//! Metric identities: concrete names, templates and group ids.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Fully qualified name of a registered metric
///
/// Two names are equal when their `name`, `group` and `tags` match; the
/// description is informational only.
#[derive(Debug, Clone)]
pub struct MetricName {
    name: String,
    group: String,
    description: String,
    tags: BTreeMap<String, String>,
}

impl MetricName {
    /// Create a metric name
    pub fn new(
        name: impl Into<String>,
        group: impl Into<String>,
        description: impl Into<String>,
        tags: BTreeMap<String, String>,
    ) -> Self {
        Self { name: name.into(), group: group.into(), description: description.into(), tags }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Tags in key order
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Look up a single tag value
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

impl PartialEq for MetricName {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.group == other.group && self.tags == other.tags
    }
}

impl Eq for MetricName {}

impl Hash for MetricName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.group.hash(state);
        self.tags.hash(state);
    }
}

impl PartialOrd for MetricName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MetricName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.group
            .cmp(&other.group)
            .then_with(|| self.tags.cmp(&other.tags))
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.name)?;
        if !self.tags.is_empty() {
            f.write_str("{")?;
            for (index, (key, value)) in self.tags.iter().enumerate() {
                if index > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{key}={value}")?;
            }
            f.write_str("}")?;
        }
        Ok(())
    }
}

/// A metric name with its tag values left open
///
/// Templates are resolved against a [`super::MetricGroup`], which supplies
/// the tag values. Resolution fails unless the group carries exactly the
/// template's tag keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricNameTemplate {
    name: String,
    group: String,
    description: String,
    tags: BTreeSet<String>,
}

impl MetricNameTemplate {
    pub fn new<I, S>(
        name: impl Into<String>,
        group: impl Into<String>,
        description: impl Into<String>,
        tags: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            group: group.into(),
            description: description.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }
}

/// Identity of a tagged metric group
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetricGroupId {
    group_name: String,
    tags: BTreeMap<String, String>,
}

impl MetricGroupId {
    pub(crate) fn new(group_name: impl Into<String>, tags: BTreeMap<String, String>) -> Self {
        Self { group_name: group_name.into(), tags }
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Whether `name` belongs to this group
    pub fn includes(&self, name: &MetricName) -> bool {
        name.group() == self.group_name && name.tags() == &self.tags
    }
}

impl fmt::Display for MetricGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.group_name)?;
        for (key, value) in &self.tags {
            write!(f, ";{key}={value}")?;
        }
        Ok(())
    }
}
