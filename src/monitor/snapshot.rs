//! Edit statistics read from a profile at one observation point.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Count for one tracked category.
///
/// A category the profile did not report is `Unknown` rather than zero, so
/// a category appearing for the first time counts as a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryCount {
    Known(u64),
    Unknown,
}

impl CategoryCount {
    /// Returns the count if the profile reported one.
    pub fn value(&self) -> Option<u64> {
        match self {
            CategoryCount::Known(n) => Some(*n),
            CategoryCount::Unknown => None,
        }
    }
}

impl From<Option<u64>> for CategoryCount {
    fn from(value: Option<u64>) -> Self {
        value.map_or(CategoryCount::Unknown, CategoryCount::Known)
    }
}

impl fmt::Display for CategoryCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryCount::Known(n) => write!(f, "{}", n),
            CategoryCount::Unknown => write!(f, "?"),
        }
    }
}

/// A point-in-time read of the edit counts from a user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSnapshot {
    /// Daily or cumulative edit count, depending on the configured count source.
    pub total_count: u64,
    /// One entry per tracked category, keyed by the profile's category key.
    pub categories: BTreeMap<String, CategoryCount>,
}

impl EditSnapshot {
    /// Create a snapshot with no tracked categories.
    pub fn new(total_count: u64) -> Self {
        Self {
            total_count,
            categories: BTreeMap::new(),
        }
    }

    /// Builder-style helper for setting a category count.
    pub fn with_category(mut self, key: &str, count: impl Into<CategoryCount>) -> Self {
        self.categories.insert(key.to_string(), count.into());
        self
    }

    /// Look up a tracked category.
    pub fn category(&self, key: &str) -> Option<CategoryCount> {
        self.categories.get(key).copied()
    }

    /// Returns true if any tracked field differs from `other`.
    ///
    /// Categories present in only one of the two snapshots count as a
    /// difference.
    pub fn differs_from(&self, other: &EditSnapshot) -> bool {
        self.total_count != other.total_count || self.categories != other.categories
    }
}

impl From<u64> for CategoryCount {
    fn from(value: u64) -> Self {
        CategoryCount::Known(value)
    }
}

/// The fixed set of categories a deployment tracks, with display labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedCategory {
    /// Key used in the profile's `editsByType` list.
    pub key: String,
    /// Label shown in the UI.
    pub label: String,
}

impl TrackedCategory {
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }

    /// The categories tracked when nothing is configured: closed update
    /// requests and closed map problems.
    pub fn defaults() -> Vec<TrackedCategory> {
        vec![
            TrackedCategory::new("mapUpdateRequest", "URs closed"),
            TrackedCategory::new("machineMapProblem", "MPs closed"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_snapshots_do_not_differ() {
        let a = EditSnapshot::new(10).with_category("mapUpdateRequest", 3u64);
        let b = a.clone();
        assert!(!a.differs_from(&b));
    }

    #[test]
    fn test_category_change_alone_is_a_difference() {
        let a = EditSnapshot::new(10).with_category("mapUpdateRequest", 3u64);
        let b = EditSnapshot::new(10).with_category("mapUpdateRequest", 4u64);
        assert!(a.differs_from(&b));
    }

    #[test]
    fn test_unknown_vs_known_is_a_difference() {
        let a = EditSnapshot::new(10).with_category("venue", CategoryCount::Unknown);
        let b = EditSnapshot::new(10).with_category("venue", 0u64);
        assert!(a.differs_from(&b));

        let c = EditSnapshot::new(10).with_category("venue", CategoryCount::Unknown);
        assert!(!a.differs_from(&c));
    }

    #[test]
    fn test_category_count_serializes_as_number_or_null() {
        let snapshot = EditSnapshot::new(7)
            .with_category("a", 2u64)
            .with_category("b", CategoryCount::Unknown);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"total_count":7,"categories":{"a":2,"b":null}}"#);
    }
}
